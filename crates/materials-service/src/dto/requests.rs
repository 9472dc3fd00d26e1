//! Request DTOs for API endpoints
//!
//! Bodies are camelCase JSON. Missing fields default to empty so that a
//! blank title or uuid surfaces as a domain error rather than a decode
//! failure.

use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Material Requests
// ============================================================================

/// Save draft request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveDraftMaterialRequest {
    #[validate(length(max = 255, message = "title must be at most 255 characters"))]
    pub title: String,

    pub content: Option<String>,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: String,

    #[validate(length(max = 2048, message = "cover image url must be at most 2048 characters"))]
    pub cover_image_url: String,

    #[validate(range(min = 0, message = "read time must not be negative"))]
    pub read_time_minutes: i32,
}

/// Edit material request; replaces every editable field
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct EditMaterialRequest {
    pub uuid: String,

    #[validate(length(max = 255, message = "title must be at most 255 characters"))]
    pub title: String,

    pub content: Option<String>,

    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: String,

    #[validate(length(max = 2048, message = "cover image url must be at most 2048 characters"))]
    pub cover_image_url: String,

    #[validate(range(min = 0, message = "read time must not be negative"))]
    pub read_time_minutes: i32,
}

/// Publish, archive and delete requests: `{"uuid": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MaterialUuidRequest {
    pub uuid: String,
}

impl MaterialUuidRequest {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self { uuid: uuid.into() }
    }
}

/// Get-material and toggle-like requests: `{"materialUuid": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialRefRequest {
    pub material_uuid: String,
}

impl MaterialRefRequest {
    pub fn new(material_uuid: impl Into<String>) -> Self {
        Self {
            material_uuid: material_uuid.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_draft_camel_case() {
        let req: SaveDraftMaterialRequest = serde_json::from_str(
            r#"{"title":"T","content":"C","description":"D","coverImageUrl":"u","readTimeMinutes":7}"#,
        )
        .unwrap();
        assert_eq!(req.title, "T");
        assert_eq!(req.content.as_deref(), Some("C"));
        assert_eq!(req.cover_image_url, "u");
        assert_eq!(req.read_time_minutes, 7);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_default() {
        let req: SaveDraftMaterialRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_empty());
        assert!(req.content.is_none());

        let req: MaterialRefRequest = serde_json::from_str("{}").unwrap();
        assert!(req.material_uuid.is_empty());
    }

    #[test]
    fn test_validation_limits() {
        let req = SaveDraftMaterialRequest {
            title: "x".repeat(256),
            read_time_minutes: -1,
            ..SaveDraftMaterialRequest::default()
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("read_time_minutes"));
    }

    #[test]
    fn test_edit_request() {
        let req: EditMaterialRequest =
            serde_json::from_str(r#"{"uuid":"abc","title":"New","readTimeMinutes":2}"#).unwrap();
        assert_eq!(req.uuid, "abc");
        assert_eq!(req.title, "New");
        assert_eq!(req.read_time_minutes, 2);
    }
}
