use podium_core::AppError;
use tracing::instrument;

use super::model::{ProfileRequest, ProfileResponse, User};
use super::store::UserStore;

pub const USER_NOT_FOUND: &str = "User not found";

pub struct UserService;

impl UserService {
    pub async fn get_profile(
        users: &dyn UserStore,
        user_id: &str,
    ) -> Result<ProfileResponse, AppError> {
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))?;
        let profile = users.find_profile(user_id).await?;

        Ok(ProfileResponse { user, profile })
    }

    #[instrument(skip(users, dto))]
    pub async fn complete_onboarding(
        users: &dyn UserStore,
        user_id: &str,
        dto: &ProfileRequest,
    ) -> Result<User, AppError> {
        users
            .complete_onboarding(user_id, dto)
            .await?
            .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
    }

    pub async fn list_users(users: &dyn UserStore) -> Result<Vec<User>, AppError> {
        users.list_users().await
    }
}
