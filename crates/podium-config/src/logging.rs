use std::env;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Enables debug-level logging for the application crates.
    pub debug: bool,
    /// Directory for the daily-rolling JSON log file. Console only when unset.
    pub log_dir: Option<String>,
}

impl LoggingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            debug: lookup("DEBUG")
                .map(|v| crate::parse_flag(&v))
                .unwrap_or(false),
            log_dir: lookup("LOG_DIR").filter(|s| !s.trim().is_empty()),
        }
    }

    /// Default `EnvFilter` directives for the given crate.
    pub fn default_directives(&self, crate_name: &str) -> String {
        let level = if self.debug { "debug" } else { "info" };
        let deps = if self.debug { "debug" } else { "warn" };
        format!("{crate_name}={level},podium_auth={level},tower_http={deps},sqlx=warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_changes_directives() {
        let quiet = LoggingConfig::from_lookup(|_| None);
        assert!(!quiet.debug);
        assert!(quiet.default_directives("podium").starts_with("podium=info"));

        let verbose = LoggingConfig::from_lookup(|key| (key == "DEBUG").then(|| "1".to_string()));
        assert!(verbose.debug);
        assert!(verbose.default_directives("podium").starts_with("podium=debug"));
    }
}
