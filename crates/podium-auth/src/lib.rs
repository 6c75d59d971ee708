//! # Podium Auth
//!
//! Session token types and JWT utilities for the Podium API.
//!
//! This crate is the token issuer and reader:
//!
//! - [`role`]: The fixed [`Role`] enumeration (`USER`, `ORGANIZER`, `ADMIN`)
//! - [`claims`]: The versioned session payload ([`SessionClaims`])
//! - [`jwt`]: Issuing and verifying signed session tokens
//!
//! Tokens are HS256 JWTs signed with the configured secret. Decoding is
//! strict: a token missing any required field, carrying an unknown role, or
//! written by a different payload version is rejected rather than partially
//! accepted.
//!
//! # Example
//!
//! ```ignore
//! use podium_auth::{Role, SessionIdentity, issue_session_token, verify_session_token};
//! use podium_config::AuthConfig;
//!
//! let config = AuthConfig::from_env();
//! let identity = SessionIdentity::new("user-1", Role::Organizer, false);
//!
//! let token = issue_session_token(&identity, &config)?;
//! let claims = verify_session_token(&token, &config)?;
//! assert_eq!(claims.role, Role::Organizer);
//! ```

pub mod claims;
pub mod jwt;
pub mod role;

// Re-export commonly used types at crate root
pub use claims::{SESSION_PAYLOAD_VERSION, SessionClaims, SessionIdentity};
pub use jwt::{SessionTokenError, issue_session_token, verify_session_token};
pub use role::{ParseRoleError, Role};
