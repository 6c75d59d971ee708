//! Rate limiting configuration for the credential endpoints.
//!
//! Registration and login are limited per client with a token bucket:
//!
//! - `RATE_LIMIT_AUTH_PER_MINUTE`: Tokens replenished per minute (default: 10)
//! - `RATE_LIMIT_AUTH_BURST`: Maximum tokens a client can accumulate (default: 5)
//! - `RATE_LIMIT_TRUST_PROXY`: Key clients on the first `X-Forwarded-For`
//!   hop instead of the socket peer (default: false)
//! - `RATE_LIMIT_PRUNE_SECS`: Interval between sweeps of idle client buckets
//!   (default: 60)
//!
//! A rejected client is told how long until its next token is available,
//! measured from the limiter's own clock.

/// Rate limit configuration for the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests replenished per minute for auth endpoints.
    pub auth_per_minute: u32,

    /// Burst size for auth endpoints.
    pub auth_burst_size: u32,

    /// Only enable behind a reverse proxy that overwrites `X-Forwarded-For`.
    pub trust_forwarded_for: bool,

    /// Seconds between sweeps of buckets that have fully refilled.
    pub prune_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_minute: 10,
            auth_burst_size: 5,
            trust_forwarded_for: false,
            prune_interval_secs: 60,
        }
    }
}

impl RateLimitConfig {
    /// Creates a new `RateLimitConfig` from environment variables.
    ///
    /// Falls back to default values if environment variables are not set,
    /// cannot be parsed, or are zero.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| *v > 0)
        };

        Self {
            auth_per_minute: positive("RATE_LIMIT_AUTH_PER_MINUTE")
                .unwrap_or(defaults.auth_per_minute),
            auth_burst_size: positive("RATE_LIMIT_AUTH_BURST").unwrap_or(defaults.auth_burst_size),
            trust_forwarded_for: lookup("RATE_LIMIT_TRUST_PROXY")
                .map(|v| crate::parse_flag(&v))
                .unwrap_or(defaults.trust_forwarded_for),
            prune_interval_secs: positive("RATE_LIMIT_PRUNE_SECS")
                .map(u64::from)
                .unwrap_or(defaults.prune_interval_secs),
        }
    }
}
