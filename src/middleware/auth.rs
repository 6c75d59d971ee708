use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use podium_auth::{Role, SessionClaims, SessionTokenError, verify_session_token};
use podium_config::AuthConfig;

use crate::access::decision::AUTHENTICATION_REQUIRED;
use crate::state::AppState;
use podium_core::AppError;

/// What the request carried in place of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRead {
    Absent,
    Valid(SessionClaims),
    Invalid(SessionTokenError),
}

impl SessionRead {
    pub fn into_claims(self) -> Option<SessionClaims> {
        match self {
            SessionRead::Valid(claims) => Some(claims),
            SessionRead::Absent | SessionRead::Invalid(_) => None,
        }
    }
}

/// The raw session token: `Authorization: Bearer <token>` first, then the
/// session cookie.
pub fn session_token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub fn read_session(headers: &HeaderMap, config: &AuthConfig) -> SessionRead {
    match session_token_from_headers(headers, &config.cookie_name) {
        None => SessionRead::Absent,
        Some(token) => match verify_session_token(&token, config) {
            Ok(claims) => SessionRead::Valid(claims),
            Err(err) => SessionRead::Invalid(err),
        },
    }
}

/// HttpOnly cookie carrying a freshly issued session token.
pub fn session_cookie(config: &AuthConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build()
}

/// An expired, empty session cookie. Added to a jar it clears the session
/// whether or not the request carried one.
pub fn session_removal_cookie(config: &AuthConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build();
    cookie.make_removal();
    cookie
}

/// Extractor that provides the authenticated user's session claims.
///
/// Behind the access gate the claims are already verified and attached to
/// the request; otherwise the token is read and verified here.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionClaims);

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.0.role == role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.0.has_any_role(roles)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return Ok(AuthUser(claims.clone()));
        }

        read_session(&parts.headers, &state.auth_config)
            .into_claims()
            .map(AuthUser)
            .ok_or_else(|| AppError::unauthorized(AUTHENTICATION_REQUIRED))
    }
}

/// The session when one is present and valid, for routes open to everyone.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<SessionClaims>() {
            return Ok(MaybeAuthUser(Some(AuthUser(claims.clone()))));
        }

        Ok(MaybeAuthUser(
            read_session(&parts.headers, &state.auth_config)
                .into_claims()
                .map(AuthUser),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use podium_auth::{SessionIdentity, issue_session_token};

    fn config() -> AuthConfig {
        AuthConfig {
            secret: "middleware-test-secret".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_bearer_takes_precedence_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("podium.session-token=from-cookie"),
        );

        assert_eq!(
            session_token_from_headers(&headers, "podium.session-token").as_deref(),
            Some("from-header")
        );
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; podium.session-token=abc.def.ghi"),
        );

        assert_eq!(
            session_token_from_headers(&headers, "podium.session-token").as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn test_non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(session_token_from_headers(&headers, "sid"), None);
    }

    #[test]
    fn test_read_session_states() {
        let config = config();
        assert_eq!(read_session(&HeaderMap::new(), &config), SessionRead::Absent);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer garbage"));
        assert_eq!(
            read_session(&headers, &config),
            SessionRead::Invalid(SessionTokenError::Malformed)
        );

        let token =
            issue_session_token(&SessionIdentity::new("user-1", Role::Admin, true), &config)
                .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        match read_session(&headers, &config) {
            SessionRead::Valid(claims) => assert_eq!(claims.id, "user-1"),
            other => panic!("expected a valid session, got {other:?}"),
        }
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = config();
        let cookie = session_cookie(&config, "tok".to_string());
        assert_eq!(cookie.name(), "podium.session-token");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_removal_cookie_expires_session() {
        let cookie = session_removal_cookie(&config());
        assert_eq!(cookie.name(), "podium.session-token");
        assert_eq!(cookie.value(), "");
        assert!(cookie.to_string().contains("Max-Age=0"));
    }
}
