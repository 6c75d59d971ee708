use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use podium_config::LoggingConfig;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logs one record when a request arrives and one when it completes, at a
/// level chosen by the response status.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(req).await;
    let latency = start.elapsed();
    let status = response.status();

    match status.as_u16() {
        400..=499 => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                latency_ms = %latency.as_millis(),
                "Client error"
            );
        }
        500..=599 => {
            error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                latency_ms = %latency.as_millis(),
                "Server error"
            );
        }
        _ => {
            info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = %status.as_u16(),
                latency_ms = %latency.as_millis(),
                "Request completed"
            );
        }
    }

    response
}

/// Installs the global subscriber: a compact console layer, plus a
/// daily-rolling JSON file when `log_dir` is configured. `RUST_LOG` overrides
/// the default directives.
///
/// Calling it twice is harmless; the second installation is ignored.
pub fn init_logging(config: &LoggingConfig, crate_name: &str) {
    let directives = config.default_directives(crate_name);
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(config.debug)
        .with_line_number(config.debug)
        .with_filter(console_filter);

    let json_layer = config.log_dir.as_ref().and_then(|dir| {
        let json_appender = match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("podium")
            .filename_suffix("json")
            .build(dir)
        {
            Ok(appender) => appender,
            Err(e) => {
                eprintln!("⚠️  Failed to open log directory {}: {}. Logging to console only.", dir, e);
                return None;
            }
        };
        let json_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directives));

        Some(
            fmt::layer()
                .json()
                .with_writer(json_appender)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(json_filter),
        )
    });

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .with(json_layer)
        .try_init();

    if installed.is_ok() && config.debug {
        tracing::debug!("Debug logging enabled");
    }
}
