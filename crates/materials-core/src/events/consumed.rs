//! Events consumed from other platform services

use serde::{Deserialize, Serialize};

/// A user registered with the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreatedEvent {
    pub user_uuid: String,
    pub user_nickname: String,
}

/// A user changed their nickname
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicknameUpdatedEvent {
    pub user_uuid: String,
    pub nickname: String,
}

/// A user's avatar was replaced; `link` is the new public URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarUpdatedEvent {
    pub uuid: String,
    pub link: String,
}
