use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use podium_core::{ApiResponse, AppError};
use tracing::{info, instrument};

use crate::middleware::auth::{AuthUser, session_cookie, session_removal_cookie};
use crate::modules::users::model::User;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, SessionRefreshResponse,
    SessionResponse,
};
use super::service::AuthService;

/// Create a USER account. Onboarding starts incomplete.
#[instrument(skip(state, dto))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<ApiResponse<User>, AppError> {
    let user = AuthService::register_user(state.users.as_ref(), dto, &state.auth_config).await?;
    info!(user_id = %user.id, "User registered");
    Ok(ApiResponse::created(user))
}

/// Verify credentials and start a session (cookie and body token).
#[instrument(skip(state, jar, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<LoginResponse>), AppError> {
    let response = AuthService::login_user(state.users.as_ref(), dto, &state.auth_config).await?;
    info!(user_id = %response.user.id, role = %response.user.role, "User logged in");

    let jar = jar.add(session_cookie(&state.auth_config, response.token.clone()));
    Ok((jar, ApiResponse::ok(response)))
}

#[instrument(skip(state, jar))]
pub async fn logout_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<MessageResponse>) {
    let jar = jar.add(session_removal_cookie(&state.auth_config));
    (
        jar,
        ApiResponse::ok(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}

/// The current session payload and its expiry.
#[instrument(skip(auth_user))]
pub async fn get_session(auth_user: AuthUser) -> ApiResponse<SessionResponse> {
    ApiResponse::ok(SessionResponse::from(&auth_user.0))
}

/// Re-issue the session token from the stored user.
#[instrument(skip(state, auth_user, jar))]
pub async fn update_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<SessionRefreshResponse>), AppError> {
    let (token, user) = AuthService::refresh_session(
        state.users.as_ref(),
        auth_user.user_id(),
        &state.auth_config,
    )
    .await?;

    let jar = jar.add(session_cookie(&state.auth_config, token.clone()));
    Ok((jar, ApiResponse::ok(SessionRefreshResponse { token, user })))
}
