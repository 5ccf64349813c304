//! Database connection management

use sqlx::{
    PgPool, Postgres,
    migrate::{MigrateError, Migrator},
    pool::PoolConnection,
    postgres::PgPoolOptions,
};

use crate::{config::DatabaseConfig, unit_of_work::UnitOfWork};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Shared handle to the connection pool.
///
/// Repositories take `&mut PgConnection`; both [`Db::acquire`] and [`Db::begin`] hand one
/// out, so the same repository code runs with or without a transaction.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a unit of work backed by a fresh transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when no connection is available or `BEGIN` fails.
    pub async fn begin(&self) -> Result<UnitOfWork, sqlx::Error> {
        Ok(UnitOfWork::new(self.pool.begin().await?))
    }

    /// Check out a pooled connection for non-transactional work.
    ///
    /// # Errors
    ///
    /// Returns an error when no connection can be acquired from the pool.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, sqlx::Error> {
        self.pool.acquire().await
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns an error when a migration fails to apply or the applied history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}
