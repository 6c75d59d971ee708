use chrono::{DateTime, Utc};
use podium_auth::{Role, SessionClaims};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::modules::users::model::User;

#[derive(Deserialize, Validate, Debug)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub callback_url: Option<String>,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("callback_url", &self.callback_url)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub redirect_to: String,
}

/// A re-issued session: the new token plus the user it was built from.
#[derive(Serialize, Debug)]
pub struct SessionRefreshResponse {
    pub token: String,
    pub user: User,
}

#[derive(Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub role: Role,
    pub onboarding_completed: bool,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&SessionClaims> for SessionResponse {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            user: SessionUser {
                id: claims.id.clone(),
                role: claims.role,
                onboarding_completed: claims.onboarding_completed,
            },
            expires_at: i64::try_from(claims.exp)
                .ok()
                .and_then(|exp| DateTime::from_timestamp(exp, 0)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_login_request_reads_camel_case_callback() {
        let request: LoginRequest = serde_json::from_str(
            r#"{"email":"ada@example.com","password":"pw","callbackUrl":"/dashboard/events"}"#,
        )
        .unwrap();

        assert_eq!(request.callback_url.as_deref(), Some("/dashboard/events"));
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
            callback_url: None,
        };

        assert!(!format!("{:?}", request).contains("hunter22"));
    }

    #[test]
    fn test_session_response_from_claims() {
        let claims = SessionClaims {
            v: 1,
            id: "user-1".to_string(),
            role: Role::Admin,
            onboarding_completed: true,
            iat: 1_700_000_000,
            exp: 1_700_003_600,
        };

        let response = SessionResponse::from(&claims);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["user"]["id"], "user-1");
        assert_eq!(value["user"]["role"], "ADMIN");
        assert_eq!(value["user"]["onboardingCompleted"], true);
        assert_eq!(value["expiresAt"], "2023-11-14T23:13:20Z");
    }
}
