//! Conversions between wire messages and service DTOs

use chrono::{DateTime, SecondsFormat, Utc};
use materials_service::dto::{
    EditMaterialRequest, MaterialRefRequest, MaterialUuidRequest, MaterialView, Pagination,
    SaveDraftMaterialRequest, ToggleLikeResponse,
};

use super::proto;

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl From<MaterialView> for proto::Material {
    fn from(view: MaterialView) -> Self {
        Self {
            uuid: view.uuid,
            owner_uuid: view.owner_uuid,
            title: view.title,
            cover_image_url: view.cover_image_url,
            description: view.description,
            content: view.content,
            read_time_minutes: view.read_time_minutes,
            status: view.status,
            created_at: timestamp(view.created_at),
            edited_at: view.edited_at.map(timestamp),
            published_at: view.published_at.map(timestamp),
            archived_at: view.archived_at.map(timestamp),
            likes_count: view.likes_count,
        }
    }
}

impl From<proto::SaveDraftMaterialIn> for SaveDraftMaterialRequest {
    fn from(input: proto::SaveDraftMaterialIn) -> Self {
        Self {
            title: input.title,
            content: input.content,
            description: input.description,
            cover_image_url: input.cover_image_url,
            read_time_minutes: input.read_time_minutes,
        }
    }
}

impl From<proto::EditMaterialIn> for EditMaterialRequest {
    fn from(input: proto::EditMaterialIn) -> Self {
        Self {
            uuid: input.uuid,
            title: input.title,
            content: input.content,
            description: input.description,
            cover_image_url: input.cover_image_url,
            read_time_minutes: input.read_time_minutes,
        }
    }
}

impl From<proto::PublishMaterialIn> for MaterialUuidRequest {
    fn from(input: proto::PublishMaterialIn) -> Self {
        Self::new(input.uuid)
    }
}

impl From<proto::ArchivedMaterialIn> for MaterialUuidRequest {
    fn from(input: proto::ArchivedMaterialIn) -> Self {
        Self::new(input.uuid)
    }
}

impl From<proto::DeleteMaterialIn> for MaterialUuidRequest {
    fn from(input: proto::DeleteMaterialIn) -> Self {
        Self::new(input.uuid)
    }
}

impl From<proto::ToggleLikeIn> for MaterialRefRequest {
    fn from(input: proto::ToggleLikeIn) -> Self {
        Self::new(input.material_uuid)
    }
}

impl From<proto::GetMaterialIn> for MaterialRefRequest {
    fn from(input: proto::GetMaterialIn) -> Self {
        Self::new(input.material_uuid)
    }
}

/// Zero means "unset" on the wire, which normalises like any other
/// out-of-range value
impl From<proto::GetAllMaterialsIn> for Pagination {
    fn from(input: proto::GetAllMaterialsIn) -> Self {
        Pagination::new(Some(input.page), Some(input.limit))
    }
}

impl From<ToggleLikeResponse> for proto::ToggleLikeOut {
    fn from(response: ToggleLikeResponse) -> Self {
        Self {
            is_liked: response.is_liked,
            likes_count: response.likes_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_material_timestamps() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let view = MaterialView {
            uuid: "m".to_string(),
            owner_uuid: "o".to_string(),
            title: "T".to_string(),
            cover_image_url: String::new(),
            description: String::new(),
            content: None,
            read_time_minutes: 3,
            status: "draft".to_string(),
            created_at: created,
            edited_at: None,
            published_at: Some(created),
            archived_at: None,
            likes_count: 2,
        };

        let wire = proto::Material::from(view);
        assert_eq!(wire.created_at, "2024-03-01T12:00:00.000000Z");
        assert_eq!(wire.published_at.as_deref(), Some("2024-03-01T12:00:00.000000Z"));
        assert!(wire.edited_at.is_none());
        assert!(wire.content.is_none());
        assert_eq!(wire.likes_count, 2);
    }

    #[test]
    fn test_pagination_from_wire() {
        let pagination = Pagination::from(proto::GetAllMaterialsIn { page: 0, limit: 0 });
        assert_eq!(pagination, Pagination::default());

        let pagination = Pagination::from(proto::GetAllMaterialsIn { page: 3, limit: 20 });
        assert_eq!(pagination.offset(), 40);
    }
}
