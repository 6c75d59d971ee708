//! Role checks for handlers.
//!
//! The access gate only guarantees that an API request carries a session.
//! Handlers that need a particular role check it with these helpers or the
//! [`RequireAdmin`] extractor, and answer 403 with the JSON error body.

use axum::{extract::FromRequestParts, http::request::Parts};
use podium_auth::Role;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use podium_core::AppError;

/// Helper function to check if a user has a specific role in controller logic
pub fn check_role(auth_user: &AuthUser, required_role: Role) -> Result<(), AppError> {
    if !auth_user.has_role(required_role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required role: {}",
            required_role
        )));
    }

    Ok(())
}

/// Helper function to check if a user has any of the specified roles
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<(), AppError> {
    if !auth_user.has_any_role(allowed_roles) {
        let allowed = allowed_roles
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {}",
            allowed
        )));
    }

    Ok(())
}

/// Extractor for administrator-only handlers.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        check_role(&auth_user, Role::Admin)?;
        Ok(RequireAdmin(auth_user))
    }
}
