//! Application configuration

use clap::Args;

pub use db::DatabaseConfig;
pub use logging::{LogFormat, LoggingConfig};

mod db;
mod logging;

/// Process configuration, resolved once at startup and handed to constructors by reference.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Load a `.env` file into the process environment if one is present.
pub fn load_dotenv() {
    // Missing `.env` is not an error; plain environment variables still apply.
    _ = dotenvy::dotenv();
}
