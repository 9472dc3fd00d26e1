//! User projection entity <-> model mapper

use materials_core::entities::UserProfile;
use materials_core::error::DomainError;
use materials_core::value_objects::UserId;

use crate::models::UserModel;

impl TryFrom<UserModel> for UserProfile {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId::parse(&model.uuid)
                .map_err(|e| DomainError::DatabaseError(format!("bad user uuid: {e}")))?,
            nickname: model.nickname,
            avatar_link: model.avatar_link,
            name: model.name,
            surname: model.surname,
        })
    }
}
