//! Material identifier - server-assigned UUID v4

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::IdParseError;

/// Opaque 128-bit material identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialId(Uuid);

impl MaterialId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Parse from the textual (hyphenated or simple) form.
    /// Surrounding whitespace is ignored; an empty string is rejected separately
    /// so callers can report a missing id differently from a malformed one.
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| IdParseError::InvalidFormat(s.to_string()))
    }
}

impl Default for MaterialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MaterialId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for MaterialId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<MaterialId> for Uuid {
    fn from(id: MaterialId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_distinct() {
        assert_ne!(MaterialId::new(), MaterialId::new());
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = MaterialId::new();
        let parsed = MaterialId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let id = MaterialId::new();
        let parsed = MaterialId::parse(&format!("  {id} ")).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_parse_rejects_empty_and_garbage() {
        assert_eq!(MaterialId::parse("   "), Err(IdParseError::Empty));
        assert!(matches!(
            MaterialId::parse("not-a-uuid"),
            Err(IdParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let id = MaterialId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
