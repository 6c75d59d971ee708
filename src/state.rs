use std::sync::Arc;

use podium_config::{AuthConfig, CorsConfig, RateLimitConfig};

use crate::access::AccessPolicy;
use crate::middleware::rate_limit::ClientRateLimiter;
use crate::modules::events::store::EventStore;
use crate::modules::users::store::UserStore;

/// Everything handlers and middleware share. Built once by the composition
/// root; every field is immutable for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    pub auth_config: AuthConfig,
    pub access_policy: AccessPolicy,
    pub cors_config: CorsConfig,
    /// Login and account registration.
    pub credential_limiter: ClientRateLimiter,
    /// Public participant registration.
    pub registration_limiter: ClientRateLimiter,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        auth_config: AuthConfig,
        cors_config: CorsConfig,
        rate_limit_config: &RateLimitConfig,
    ) -> Self {
        Self {
            users,
            events,
            auth_config,
            access_policy: AccessPolicy::default(),
            cors_config,
            credential_limiter: ClientRateLimiter::new(rate_limit_config),
            registration_limiter: ClientRateLimiter::new(rate_limit_config),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("access_policy", &self.access_policy)
            .field("cors_config", &self.cors_config)
            .field("credential_limiter", &self.credential_limiter)
            .finish_non_exhaustive()
    }
}
