//! The access decision for a `(path, session)` pair.
//!
//! [`evaluate`] is a pure function: the same path, query and session always
//! produce the same [`Evaluation`]. The path is classified in its canonical
//! form (see [`canonical_path`]); the login callback keeps the raw path.
//! Rules are checked top to bottom and the first match wins:
//!
//! 1. public API prefix: continue
//! 2. protected API: 401 without a session, continue with one
//! 3. login/register with a session: redirect to the dashboard
//! 4. public page: continue
//! 5. no session: redirect to login, preserving the original target
//! 6. role-restricted prefix and role not allowed: redirect to forbidden
//! 7. onboarding incomplete, not on the onboarding page: redirect there
//! 8. onboarding complete, on the onboarding page: redirect to the dashboard
//! 9. continue

use axum::http::StatusCode;
use podium_auth::SessionClaims;
use serde::Serialize;

use super::paths::{canonical_path, login_redirect_location};
use super::policy::AccessPolicy;

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Body of a rejection, serialised as `{ "success": false, "message": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionBody {
    pub success: bool,
    pub message: String,
}

impl RejectionBody {
    pub fn authentication_required() -> Self {
        Self {
            success: false,
            message: AUTHENTICATION_REQUIRED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue,
    RedirectTo {
        location: String,
        /// Whether `location` carries a `callbackUrl` back to the original target.
        preserve_callback: bool,
    },
    RejectWithStatus {
        status: StatusCode,
        body: RejectionBody,
    },
}

impl Decision {
    fn redirect(location: &str) -> Self {
        Decision::RedirectTo {
            location: location.to_string(),
            preserve_callback: false,
        }
    }
}

/// Which rule produced the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PublicApi,
    ApiAuthenticated,
    ApiUnauthenticated,
    AlreadyAuthenticated,
    PublicPage,
    LoginRequired,
    RoleForbidden,
    OnboardingRequired,
    OnboardingAlreadyCompleted,
    Allowed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::PublicApi => "public_api",
            Outcome::ApiAuthenticated => "api_authenticated",
            Outcome::ApiUnauthenticated => "api_unauthenticated",
            Outcome::AlreadyAuthenticated => "already_authenticated",
            Outcome::PublicPage => "public_page",
            Outcome::LoginRequired => "login_required",
            Outcome::RoleForbidden => "role_forbidden",
            Outcome::OnboardingRequired => "onboarding_required",
            Outcome::OnboardingAlreadyCompleted => "onboarding_already_completed",
            Outcome::Allowed => "allowed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub outcome: Outcome,
}

impl Evaluation {
    fn new(decision: Decision, outcome: Outcome) -> Self {
        Self { decision, outcome }
    }
}

pub fn evaluate(
    policy: &AccessPolicy,
    path: &str,
    query: Option<&str>,
    session: Option<&SessionClaims>,
) -> Evaluation {
    let canonical = canonical_path(path);
    let normalized = canonical.as_str();

    if policy.is_public_api(normalized) {
        return Evaluation::new(Decision::Continue, Outcome::PublicApi);
    }

    if policy.is_protected_api(normalized) {
        return match session {
            Some(_) => Evaluation::new(Decision::Continue, Outcome::ApiAuthenticated),
            None => Evaluation::new(
                Decision::RejectWithStatus {
                    status: StatusCode::UNAUTHORIZED,
                    body: RejectionBody::authentication_required(),
                },
                Outcome::ApiUnauthenticated,
            ),
        };
    }

    if session.is_some() && policy.is_auth_page(normalized) {
        return Evaluation::new(
            Decision::redirect(policy.dashboard_path),
            Outcome::AlreadyAuthenticated,
        );
    }

    if policy.is_public_page(normalized) {
        return Evaluation::new(Decision::Continue, Outcome::PublicPage);
    }

    let Some(session) = session else {
        return Evaluation::new(
            Decision::RedirectTo {
                location: login_redirect_location(policy.login_path, path, query),
                preserve_callback: true,
            },
            Outcome::LoginRequired,
        );
    };

    if let Some(allowed) = policy.allowed_roles(normalized) {
        if !session.has_any_role(allowed) {
            return Evaluation::new(
                Decision::redirect(policy.forbidden_path),
                Outcome::RoleForbidden,
            );
        }
    }

    let on_onboarding = policy.is_onboarding(normalized);

    if !session.onboarding_completed && !on_onboarding {
        return Evaluation::new(
            Decision::redirect(policy.onboarding_path),
            Outcome::OnboardingRequired,
        );
    }

    if session.onboarding_completed && on_onboarding {
        return Evaluation::new(
            Decision::redirect(policy.dashboard_path),
            Outcome::OnboardingAlreadyCompleted,
        );
    }

    Evaluation::new(Decision::Continue, Outcome::Allowed)
}
