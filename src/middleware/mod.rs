//! Middleware and extractors for request processing.
//!
//! # Modules
//!
//! - [`gate`]: The access gate applied to every request
//! - [`auth`]: Session token reading, session cookies and the [`auth::AuthUser`] extractor
//! - [`role`]: Role checks for handlers
//! - [`rate_limit`]: Per-client limits on the credential and public registration endpoints
//!
//! # Request Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` or the session cookie
//! 2. `access_gate` verifies it, classifies the path and decides
//! 3. On continue, verified claims ride along in the request extensions
//! 4. `AuthUser` hands them to handlers; role checks run there
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::check_any_role;
//!
//! async fn organizer_stats(auth_user: AuthUser) -> Result<impl IntoResponse, AppError> {
//!     check_any_role(&auth_user, &[Role::Organizer, Role::Admin])?;
//!     // ...
//! }
//! ```

pub mod auth;
pub mod gate;
pub mod rate_limit;
pub mod role;
