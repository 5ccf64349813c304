//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::DatabaseConfig,
    database::{self, Db},
    domain::orders::{OrdersService, PgOrdersService},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub orders: Arc<dyn OrdersService>,
}

impl AppContext {
    /// Build application context from database configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(config)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool)))
    }

    #[must_use]
    pub fn from_db(db: Db) -> Self {
        Self {
            orders: Arc::new(PgOrdersService::new(db)),
        }
    }
}
