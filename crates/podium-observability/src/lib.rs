//! Podium Observability
//!
//! - [`logging::init_logging`]: installs the global `tracing` subscriber
//! - [`logging::logging_middleware`]: per-request HTTP log records
//!
//! # Examples
//!
//! ```no_run
//! use podium_config::LoggingConfig;
//! use podium_observability::init_logging;
//!
//! init_logging(&LoggingConfig::from_env(), "podium");
//! ```

pub mod logging;

pub use logging::{init_logging, logging_middleware};
