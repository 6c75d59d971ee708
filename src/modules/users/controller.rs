use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use podium_core::{ApiResponse, AppError};
use tracing::{info, instrument};

use crate::middleware::auth::{AuthUser, session_cookie};
use crate::middleware::role::RequireAdmin;
use crate::modules::auth::model::SessionRefreshResponse;
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{ProfileRequest, ProfileResponse, User};
use super::service::UserService;

#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<ProfileResponse>, AppError> {
    let profile = UserService::get_profile(state.users.as_ref(), auth_user.user_id()).await?;
    Ok(ApiResponse::ok(profile))
}

/// Store the profile, finish onboarding and hand back a token that reflects
/// it, so the gate stops sending the user to `/onboarding`.
#[instrument(skip(state, auth_user, jar, dto), fields(user_id = %auth_user.user_id()))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<ProfileRequest>,
) -> Result<(CookieJar, ApiResponse<SessionRefreshResponse>), AppError> {
    let user =
        UserService::complete_onboarding(state.users.as_ref(), auth_user.user_id(), &dto).await?;
    let token = AuthService::issue_token(&user, &state.auth_config)?;
    info!("Onboarding completed");

    let jar = jar.add(session_cookie(&state.auth_config, token.clone()));
    Ok((jar, ApiResponse::ok(SessionRefreshResponse { token, user })))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.0.user_id()))]
pub async fn list_users(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<ApiResponse<Vec<User>>, AppError> {
    let users = UserService::list_users(state.users.as_ref()).await?;
    Ok(ApiResponse::ok(users))
}
