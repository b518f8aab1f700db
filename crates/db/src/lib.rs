//! Persistence layer: sqlx/Postgres models, repositories, and the
//! [`EntityStore`](store::EntityStore) abstraction consumed by the mutation
//! pipeline.
//!
//! The pool has an explicit lifecycle ([`create_pool`] / [`close_pool`]);
//! nothing in this crate holds process-wide state.

pub mod models;
pub mod repositories;
pub mod store;

use sqlx::postgres::PgPoolOptions;

/// Shared Postgres connection pool.
pub type DbPool = sqlx::PgPool;

/// Default maximum number of pooled connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Create a connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Apply all pending migrations from the crate's `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Close the pool, waiting for in-flight connections to finish.
pub async fn close_pool(pool: &DbPool) {
    pool.close().await;
    tracing::info!("Database connection pool closed");
}
