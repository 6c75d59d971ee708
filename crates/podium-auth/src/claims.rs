//! The session payload embedded in every session token.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Version written into the `v` claim. Tokens with any other version are
/// rejected at decode time.
pub const SESSION_PAYLOAD_VERSION: u8 = 1;

/// Who a session belongs to. This is what the credential verifier hands to
/// the issuer after a successful login or an explicit session update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub id: String,
    pub role: Role,
    pub onboarding_completed: bool,
}

impl SessionIdentity {
    pub fn new(id: impl Into<String>, role: Role, onboarding_completed: bool) -> Self {
        Self {
            id: id.into(),
            role,
            onboarding_completed,
        }
    }
}

/// JWT claims for session tokens.
///
/// Every field is required. `id`, `role` and `onboardingCompleted` are the
/// subject, account role and onboarding state; `iat`/`exp` are Unix
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Payload version
    pub v: u8,
    pub id: String,
    pub role: Role,
    pub onboarding_completed: bool,
    pub iat: usize,
    pub exp: usize,
}

impl SessionClaims {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(self.id.clone(), self.role, self.onboarding_completed)
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}
