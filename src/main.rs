use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use podium::modules::events::store::PgEventStore;
use podium::modules::users::store::PgUserStore;
use podium::router::init_router;
use podium::state::AppState;
use podium_config::{AuthConfig, CorsConfig, LoggingConfig, RateLimitConfig, ServerConfig};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let logging_config = LoggingConfig::from_env();
    podium_observability::init_logging(&logging_config, env!("CARGO_CRATE_NAME"));

    let server_config = ServerConfig::from_env();
    let auth_config = AuthConfig::from_env();
    if auth_config.uses_development_secret() {
        warn!("AUTH_SECRET is not set; signing sessions with the development secret");
    }

    let database_url = server_config
        .database_url
        .clone()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let pool = podium_db::connect(&database_url, 10).await?;
    podium_db::run_migrations(&pool).await?;

    let rate_limit_config = RateLimitConfig::from_env();
    if rate_limit_config.trust_forwarded_for {
        info!("Rate limits key clients on X-Forwarded-For");
    }

    let state = AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgEventStore::new(pool)),
        auth_config,
        CorsConfig::from_env(),
        &rate_limit_config,
    );

    let prune_every = Duration::from_secs(rate_limit_config.prune_interval_secs);
    let _pruners = (
        state.credential_limiter.spawn_pruner(prune_every),
        state.registration_limiter.spawn_pruner(prune_every),
    );

    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(%address, "Server running");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
