//! Per-client rate limiting for the credential and registration endpoints.
//!
//! Each client gets a `governor` token bucket sized from [`RateLimitConfig`].
//! Clients are keyed on the socket peer; the first `X-Forwarded-For` hop is
//! only used when the deployment opts into trusting its proxy. A rejected
//! request receives 429 with a `Retry-After` header holding the time until
//! the client's next token, rounded up to whole seconds.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use podium_config::RateLimitConfig;
use podium_core::AppError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::state::AppState;

pub const TOO_MANY_REQUESTS: &str = "Too many requests. Please try again later.";

#[derive(Clone)]
pub struct ClientRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<String>>,
    clock: DefaultClock,
    trust_forwarded_for: bool,
}

impl std::fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRateLimiter")
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish_non_exhaustive()
    }
}

impl ClientRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let per_minute = NonZeroU32::new(config.auth_per_minute).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.auth_burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
            clock: DefaultClock::default(),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Takes one token for `key`, or reports how long until one is available.
    pub fn check(&self, key: &str) -> Result<(), Duration> {
        self.limiter
            .check_key(&key.to_string())
            .map_err(|not_until| not_until.wait_time_from(self.clock.now()))
    }

    /// Number of client buckets currently held.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Drops buckets that have refilled completely; they carry no state.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Prunes on a fixed interval for as long as the runtime lives.
    pub fn spawn_pruner(&self, every: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.prune();
                debug!(clients = limiter.tracked_clients(), "Pruned rate limit buckets");
            }
        })
    }

    /// The bucket key for `req`: the socket peer, or the first
    /// `X-Forwarded-For` hop when the proxy is trusted, else `unknown`.
    pub fn client_key(&self, req: &Request) -> String {
        if self.trust_forwarded_for {
            let forwarded = req
                .headers()
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|ip| !ip.is_empty());

            if let Some(ip) = forwarded {
                return ip.to_string();
            }
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Whole seconds to wait, rounded up and never zero.
pub fn retry_after_seconds(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

async fn enforce(limiter: &ClientRateLimiter, req: Request, next: Next) -> Response {
    let key = limiter.client_key(&req);

    match limiter.check(&key) {
        Ok(()) => next.run(req).await,
        Err(wait) => {
            let retry_after = retry_after_seconds(wait);
            warn!(
                path = %req.uri().path(),
                retry_after_secs = retry_after,
                "Rate limit exceeded"
            );

            (
                [(header::RETRY_AFTER, retry_after.to_string())],
                AppError::too_many_requests(TOO_MANY_REQUESTS),
            )
                .into_response()
        }
    }
}

pub async fn limit_credential_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    enforce(&state.credential_limiter, req, next).await
}

pub async fn limit_registration_requests(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    enforce(&state.registration_limiter, req, next).await
}
