//! User projection - denormalised copy of the identity service's user record

use crate::value_objects::UserId;

/// Locally projected user profile, kept in sync from bus events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub nickname: String,
    pub avatar_link: String,
    pub name: String,
    pub surname: String,
}

impl UserProfile {
    /// Profile as first announced: only the nickname is known
    pub fn new(id: UserId, nickname: String) -> Self {
        Self {
            id,
            nickname,
            avatar_link: String::new(),
            name: String::new(),
            surname: String::new(),
        }
    }

    pub fn has_avatar(&self) -> bool {
        !self.avatar_link.is_empty()
    }
}
