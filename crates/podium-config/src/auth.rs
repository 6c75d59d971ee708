use std::env;

/// Signing secret used when `AUTH_SECRET` is not set. Only suitable for local
/// development; the server logs a warning at startup when it is in use.
pub const DEVELOPMENT_SECRET: &str = "podium-development-secret-change-in-production";

/// Longest accepted `SESSION_MAX_AGE` (ten years). Larger values fall back
/// to the default.
pub const MAX_SESSION_MAX_AGE: i64 = 315_360_000;

/// bcrypt's default work factor.
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 12;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub secret: String,
    /// Session token lifetime in seconds.
    pub session_max_age: i64,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub password_hash_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEVELOPMENT_SECRET.to_string(),
            session_max_age: 2_592_000, // 30 days
            cookie_name: "podium.session-token".to_string(),
            secure_cookie: false,
            password_hash_cost: DEFAULT_PASSWORD_HASH_COST,
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            secret: lookup("AUTH_SECRET")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.secret),
            session_max_age: lookup("SESSION_MAX_AGE")
                .and_then(|s| s.parse().ok())
                .filter(|secs: &i64| (1..=MAX_SESSION_MAX_AGE).contains(secs))
                .unwrap_or(defaults.session_max_age),
            cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.cookie_name),
            secure_cookie: lookup("SESSION_COOKIE_SECURE")
                .map(|v| crate::parse_flag(&v))
                .unwrap_or(defaults.secure_cookie),
            password_hash_cost: lookup("PASSWORD_HASH_COST")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.password_hash_cost),
        }
    }

    pub fn uses_development_secret(&self) -> bool {
        self.secret == DEVELOPMENT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AuthConfig::from_lookup(|_| None);
        assert_eq!(config, AuthConfig::default());
        assert!(config.uses_development_secret());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_SECRET", "s3cret"),
            ("SESSION_MAX_AGE", "600"),
            ("SESSION_COOKIE_NAME", "sid"),
            ("SESSION_COOKIE_SECURE", "true"),
            ("PASSWORD_HASH_COST", "4"),
        ]));

        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.session_max_age, 600);
        assert_eq!(config.cookie_name, "sid");
        assert!(config.secure_cookie);
        assert_eq!(config.password_hash_cost, 4);
        assert!(!config.uses_development_secret());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AuthConfig::from_lookup(lookup_from(&[
            ("AUTH_SECRET", ""),
            ("SESSION_MAX_AGE", "-5"),
            ("PASSWORD_HASH_COST", "lots"),
        ]));

        assert!(config.uses_development_secret());
        assert_eq!(config.session_max_age, 2_592_000);
        assert_eq!(config.password_hash_cost, DEFAULT_PASSWORD_HASH_COST);
    }

    #[test]
    fn test_session_max_age_is_capped() {
        let huge = i64::MAX.to_string();
        let config = AuthConfig::from_lookup(lookup_from(&[("SESSION_MAX_AGE", huge.as_str())]));
        assert_eq!(config.session_max_age, 2_592_000);

        let limit = MAX_SESSION_MAX_AGE.to_string();
        let config = AuthConfig::from_lookup(lookup_from(&[("SESSION_MAX_AGE", limit.as_str())]));
        assert_eq!(config.session_max_age, MAX_SESSION_MAX_AGE);
    }
}
