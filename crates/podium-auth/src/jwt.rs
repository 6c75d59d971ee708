//! Issuing and verifying session tokens.
//!
//! Session tokens are HS256 JWTs carrying [`SessionClaims`]. Verification
//! checks the signature and expiry, then the payload version and subject.
//! Every failure maps to a [`SessionTokenError`] variant so callers can log
//! the failure kind without ever logging the token itself.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use podium_config::AuthConfig;

use crate::claims::{SESSION_PAYLOAD_VERSION, SessionClaims, SessionIdentity};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenError {
    #[error("session token has expired")]
    Expired,
    #[error("session token signature is invalid")]
    BadSignature,
    #[error("session token is malformed")]
    Malformed,
    #[error("session payload version {0} is not supported")]
    UnsupportedVersion(u8),
    #[error("session token has no subject")]
    MissingSubject,
    #[error("session lifetime does not fit a token expiry")]
    LifetimeOverflow,
    #[error("failed to sign session token: {0}")]
    Signing(String),
}

impl SessionTokenError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionTokenError::Expired => "expired",
            SessionTokenError::BadSignature => "bad_signature",
            SessionTokenError::Malformed => "malformed",
            SessionTokenError::UnsupportedVersion(_) => "unsupported_version",
            SessionTokenError::MissingSubject => "missing_subject",
            SessionTokenError::LifetimeOverflow => "lifetime_overflow",
            SessionTokenError::Signing(_) => "signing",
        }
    }
}

/// Issues a session token for `identity`, valid for `session_max_age` seconds.
pub fn issue_session_token(
    identity: &SessionIdentity,
    config: &AuthConfig,
) -> Result<String, SessionTokenError> {
    if identity.id.trim().is_empty() {
        return Err(SessionTokenError::MissingSubject);
    }

    let now = Utc::now().timestamp();
    let iat = usize::try_from(now).map_err(|_| SessionTokenError::LifetimeOverflow)?;
    let exp = now
        .checked_add(config.session_max_age)
        .filter(|exp| *exp > now)
        .and_then(|exp| usize::try_from(exp).ok())
        .ok_or(SessionTokenError::LifetimeOverflow)?;

    let claims = SessionClaims {
        v: SESSION_PAYLOAD_VERSION,
        id: identity.id.clone(),
        role: identity.role,
        onboarding_completed: identity.onboarding_completed,
        iat,
        exp,
    };

    encode_claims(&claims, config)
}

/// Signs arbitrary claims. [`issue_session_token`] is the normal entry point.
pub fn encode_claims(claims: &SessionClaims, config: &AuthConfig) -> Result<String, SessionTokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| SessionTokenError::Signing(e.to_string()))
}

/// Verifies a session token and returns its claims.
pub fn verify_session_token(
    token: &str,
    config: &AuthConfig,
) -> Result<SessionClaims, SessionTokenError> {
    let validation = Validation::new(Algorithm::HS256);

    let claims = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => SessionTokenError::Expired,
        ErrorKind::InvalidSignature => SessionTokenError::BadSignature,
        _ => SessionTokenError::Malformed,
    })?;

    if claims.v != SESSION_PAYLOAD_VERSION {
        return Err(SessionTokenError::UnsupportedVersion(claims.v));
    }

    if claims.id.trim().is_empty() {
        return Err(SessionTokenError::MissingSubject);
    }

    Ok(claims)
}
