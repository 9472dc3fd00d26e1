//! Material lifecycle status

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a material.
///
/// Soft deletion is tracked by `deleted_at`, not by a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl MaterialStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published)
                | (Self::Draft, Self::Archived)
                | (Self::Published, Self::Archived)
        )
    }
}

impl fmt::Display for MaterialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(format!("unknown material status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        use MaterialStatus::{Archived, Draft, Published};

        assert!(Draft.can_transition_to(Published));
        assert!(Draft.can_transition_to(Archived));
        assert!(Published.can_transition_to(Archived));

        assert!(!Published.can_transition_to(Published));
        assert!(!Archived.can_transition_to(Published));
        assert!(!Archived.can_transition_to(Draft));
        assert!(!Published.can_transition_to(Draft));
    }

    #[test]
    fn test_string_roundtrip() {
        for status in [
            MaterialStatus::Draft,
            MaterialStatus::Published,
            MaterialStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<MaterialStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<MaterialStatus>().is_err());
    }
}
