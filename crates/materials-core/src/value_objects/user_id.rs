//! User identifier - opaque string issued by the identity service

use serde::{Deserialize, Serialize};
use std::fmt;

use super::IdParseError;

/// Caller / owner identity. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Accepts any non-blank string; surrounding whitespace is stripped.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, IdParseError> {
        let s = s.as_ref().trim();
        if s.is_empty() {
            return Err(IdParseError::Empty);
        }
        Ok(Self(s.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let id = UserId::parse("  abc-123 ").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert_eq!(UserId::parse(""), Err(IdParseError::Empty));
        assert_eq!(UserId::parse(" \t "), Err(IdParseError::Empty));
    }
}
