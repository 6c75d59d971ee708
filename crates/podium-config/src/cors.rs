use std::env;

pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Origins allowed to call the API with credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl CorsConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `ALLOWED_ORIGINS` is a comma-separated list; blank entries are dropped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("ALLOWED_ORIGINS") {
            Some(raw) => Self {
                allowed_origins: raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origin() {
        let config = CorsConfig::from_lookup(|_| None);
        assert_eq!(config.allowed_origins, vec![DEFAULT_ALLOWED_ORIGIN]);
    }

    #[test]
    fn test_comma_separated_origins() {
        let config = CorsConfig::from_lookup(|key| {
            (key == "ALLOWED_ORIGINS")
                .then(|| "https://podium.example, ,https://admin.podium.example".to_string())
        });

        assert_eq!(
            config.allowed_origins,
            vec!["https://podium.example", "https://admin.podium.example"]
        );
    }
}
