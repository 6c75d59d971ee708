use std::sync::OnceLock;

use podium_auth::{Role, issue_session_token};
use podium_config::AuthConfig;
use podium_core::{AppError, hash_password_with_cost, verify_password};
use tracing::instrument;
use uuid::Uuid;

use crate::access::paths::is_safe_callback;
use crate::modules::users::model::{NewUser, User};
use crate::modules::users::store::UserStore;

use super::model::{LoginRequest, LoginResponse, RegisterRequest};

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const USER_NOT_FOUND: &str = "User not found";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(users, dto, config), fields(email = %dto.email))]
    pub async fn register_user(
        users: &dyn UserStore,
        dto: RegisterRequest,
        config: &AuthConfig,
    ) -> Result<User, AppError> {
        let password_hash = hash_password_with_cost(&dto.password, config.password_hash_cost)?;

        users
            .create_user(NewUser {
                name: dto.name.trim().to_string(),
                email: normalize_email(&dto.email),
                password_hash,
                role: Role::User,
                onboarding_completed: false,
            })
            .await
    }

    /// Verifies credentials and issues a session token. Unknown emails and
    /// wrong passwords produce the same error.
    #[instrument(skip(users, dto, config), fields(email = %dto.email))]
    pub async fn login_user(
        users: &dyn UserStore,
        dto: LoginRequest,
        config: &AuthConfig,
    ) -> Result<LoginResponse, AppError> {
        let credentials = users
            .find_credentials_by_email(&normalize_email(&dto.email))
            .await?;

        // Unknown emails still pay for one bcrypt verification.
        let (user, password_hash) = match credentials {
            Some(credentials) => (Some(credentials.user), credentials.password_hash),
            None => (None, dummy_password_hash(config.password_hash_cost)?),
        };
        let password_matches = verify_password(&dto.password, &password_hash)?;

        let user = match user {
            Some(user) if password_matches => user,
            _ => return Err(AppError::unauthorized(INVALID_CREDENTIALS)),
        };
        let token = Self::issue_token(&user, config)?;

        Ok(LoginResponse {
            token,
            user,
            redirect_to: redirect_after_login(dto.callback_url.as_deref()),
        })
    }

    /// Reloads the user so role and onboarding changes reach the token.
    #[instrument(skip(users, config))]
    pub async fn refresh_session(
        users: &dyn UserStore,
        user_id: &str,
        config: &AuthConfig,
    ) -> Result<(String, User), AppError> {
        let user = users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized(USER_NOT_FOUND))?;

        let token = Self::issue_token(&user, config)?;
        Ok((token, user))
    }

    pub fn issue_token(user: &User, config: &AuthConfig) -> Result<String, AppError> {
        issue_session_token(&user.identity(), config).map_err(AppError::internal)
    }
}

/// A real bcrypt hash at `cost` that no submitted password matches.
fn dummy_password_hash(cost: u32) -> Result<String, AppError> {
    static DUMMY: OnceLock<(u32, String)> = OnceLock::new();

    if let Some((cached_cost, hash)) = DUMMY.get() {
        if *cached_cost == cost {
            return Ok(hash.clone());
        }
    }

    let hash = hash_password_with_cost(&Uuid::new_v4().to_string(), cost)?;
    let _ = DUMMY.set((cost, hash.clone()));
    Ok(hash)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn redirect_after_login(callback_url: Option<&str>) -> String {
    match callback_url {
        Some(url) if is_safe_callback(url) => url.to_string(),
        _ => "/dashboard".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::users::store::InMemoryUserStore;
    use axum::http::StatusCode;
    use podium_auth::verify_session_token;

    fn test_config() -> AuthConfig {
        AuthConfig {
            password_hash_cost: 4,
            ..AuthConfig::default()
        }
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: " Ada Lovelace ".to_string(),
            email: email.to_string(),
            password: "analytical-engine".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            callback_url: None,
        }
    }

    #[test]
    fn test_dummy_hash_is_real_bcrypt_at_configured_cost() {
        let hash = dummy_password_hash(4).unwrap();

        assert!(hash.starts_with("$2b$04$"));
        assert!(!verify_password("analytical-engine", &hash).unwrap());
        assert_eq!(dummy_password_hash(4).unwrap(), hash);
    }

    #[test]
    fn test_redirect_after_login() {
        assert_eq!(redirect_after_login(None), "/dashboard");
        assert_eq!(
            redirect_after_login(Some("/dashboard/events/1")),
            "/dashboard/events/1"
        );
        assert_eq!(
            redirect_after_login(Some("https://evil.example")),
            "/dashboard"
        );
        assert_eq!(redirect_after_login(Some("//evil.example")), "/dashboard");
    }

    #[tokio::test]
    async fn test_register_creates_plain_user() {
        let store = InMemoryUserStore::new();
        let config = test_config();

        let user =
            AuthService::register_user(&store, register_request("Ada@Example.COM"), &config)
                .await
                .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.role, Role::User);
        assert!(!user.onboarding_completed);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_ignores_case() {
        let store = InMemoryUserStore::new();
        let config = test_config();

        AuthService::register_user(&store, register_request("ada@example.com"), &config)
            .await
            .unwrap();
        let err = AuthService::register_user(&store, register_request("ADA@example.com"), &config)
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let store = InMemoryUserStore::new();
        let config = test_config();
        let user = AuthService::register_user(&store, register_request("ada@example.com"), &config)
            .await
            .unwrap();

        let response = AuthService::login_user(
            &store,
            login_request("ada@example.com", "analytical-engine"),
            &config,
        )
        .await
        .unwrap();

        let claims = verify_session_token(&response.token, &config).unwrap();
        assert_eq!(claims.id, user.id.to_string());
        assert_eq!(claims.role, Role::User);
        assert_eq!(response.redirect_to, "/dashboard");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = InMemoryUserStore::new();
        let config = test_config();
        AuthService::register_user(&store, register_request("ada@example.com"), &config)
            .await
            .unwrap();

        let wrong_password =
            AuthService::login_user(&store, login_request("ada@example.com", "nope"), &config)
                .await
                .unwrap_err();
        let unknown_email = AuthService::login_user(
            &store,
            login_request("nobody@example.com", "analytical-engine"),
            &config,
        )
        .await
        .unwrap_err();

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            wrong_password.error.to_string(),
            unknown_email.error.to_string()
        );
    }

    #[tokio::test]
    async fn test_refresh_session_for_deleted_user_is_unauthorized() {
        let store = InMemoryUserStore::new();

        let err = AuthService::refresh_session(
            &store,
            "00000000-0000-0000-0000-000000000000",
            &test_config(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
