use ordering_app::{config::AppConfig, database};
use tracing::info;

pub(crate) async fn run(config: &AppConfig) -> Result<(), String> {
    let pool = database::connect(&config.database)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    info!("migrations applied");

    Ok(())
}
