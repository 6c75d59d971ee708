//! # Podium Config
//!
//! Configuration types for the Podium API.
//!
//! Every struct is loaded once at process start from environment variables
//! and then held immutably in the application state:
//!
//! - [`auth`]: session token signing secret, lifetime, cookie settings
//! - [`server`]: bind address and the database URL
//! - [`logging`]: log verbosity and the optional JSON log directory
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: limits for the credential endpoints
//!
//! Each `from_env` constructor delegates to a `from_lookup` constructor that
//! takes the variable source as a closure, so tests never touch the process
//! environment.
//!
//! # Example
//!
//! ```ignore
//! use podium_config::{AuthConfig, RateLimitConfig};
//!
//! let auth_config = AuthConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod server;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use cors::CorsConfig;
pub use logging::LoggingConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Parses a boolean flag the way the deployment scripts write them.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
