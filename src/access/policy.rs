//! The Podium path tables.
//!
//! The decision engine in [`super::decision`] knows nothing about concrete
//! URLs; everything it matches against lives here as data.

use podium_auth::Role;

use super::paths::{longest_prefix, matches_exact, matches_prefix};

/// A path prefix restricted to an allow-list of roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRestriction {
    pub prefix: &'static str,
    pub allowed: &'static [Role],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Open to everyone, token or not.
    pub public_api_prefix: &'static str,
    /// Everything under it except the auth exchange requires a token.
    pub api_prefix: &'static str,
    /// Login, logout, registration and session endpoints.
    pub auth_exchange_prefix: &'static str,
    /// Pages matched exactly.
    pub public_pages: &'static [&'static str],
    pub static_asset_prefixes: &'static [&'static str],
    /// Login and registration forms. Authenticated users are sent away.
    pub auth_pages: &'static [&'static str],
    pub role_restrictions: &'static [RoleRestriction],
    pub login_path: &'static str,
    pub dashboard_path: &'static str,
    pub forbidden_path: &'static str,
    pub onboarding_path: &'static str,
}

pub const PODIUM_ROLE_RESTRICTIONS: &[RoleRestriction] = &[
    RoleRestriction {
        prefix: "/dashboard",
        allowed: &[Role::Organizer, Role::Admin],
    },
    RoleRestriction {
        prefix: "/admin",
        allowed: &[Role::Admin],
    },
];

pub const PODIUM_POLICY: AccessPolicy = AccessPolicy {
    public_api_prefix: "/api/public/",
    api_prefix: "/api",
    auth_exchange_prefix: "/api/auth",
    public_pages: &["/", "/login", "/register"],
    static_asset_prefixes: &["/_next", "/static", "/images", "/favicon.ico"],
    auth_pages: &["/login", "/register"],
    role_restrictions: PODIUM_ROLE_RESTRICTIONS,
    login_path: "/login",
    dashboard_path: "/dashboard",
    forbidden_path: "/forbidden",
    onboarding_path: "/onboarding",
};

impl Default for AccessPolicy {
    fn default() -> Self {
        PODIUM_POLICY
    }
}

impl AccessPolicy {
    pub fn is_public_api(&self, path: &str) -> bool {
        matches_prefix(path, self.public_api_prefix)
    }

    pub fn is_auth_exchange(&self, path: &str) -> bool {
        matches_prefix(path, self.auth_exchange_prefix)
    }

    /// API paths that need a token: the API namespace minus the auth exchange.
    pub fn is_protected_api(&self, path: &str) -> bool {
        matches_prefix(path, self.api_prefix) && !self.is_auth_exchange(path)
    }

    pub fn is_auth_page(&self, path: &str) -> bool {
        self.auth_pages.iter().any(|page| matches_exact(path, page))
    }

    /// Literal public pages, the auth exchange and static assets.
    pub fn is_public_page(&self, path: &str) -> bool {
        self.public_pages.iter().any(|page| matches_exact(path, page))
            || self.is_auth_exchange(path)
            || self
                .static_asset_prefixes
                .iter()
                .any(|prefix| matches_prefix(path, prefix))
    }

    pub fn is_onboarding(&self, path: &str) -> bool {
        matches_exact(path, self.onboarding_path)
    }

    /// Allowed roles from the longest restricted prefix covering `path`.
    pub fn allowed_roles(&self, path: &str) -> Option<&'static [Role]> {
        longest_prefix(
            path,
            self.role_restrictions
                .iter()
                .map(|restriction| (restriction.prefix, &restriction.allowed)),
        )
        .copied()
    }
}
