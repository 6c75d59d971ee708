//! # Podium DB
//!
//! Database pool construction for the Podium API.
//!
//! The pool is built explicitly by the composition root (the server or CLI
//! `main`) and handed to the stores that need it. There is no process-wide
//! global handle.
//!
//! # Example
//!
//! ```ignore
//! use podium_db::{connect, run_migrations};
//!
//! let pool = connect(&database_url, 10).await?;
//! run_migrations(&pool).await?;
//! ```

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects a PostgreSQL pool with at most `max_connections` connections.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Applies the bundled migrations: users, profiles and the event tables.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}
