use clap::{Args, Subcommand};
use ordering_app::{
    config::AppConfig,
    context::{AppContext, AppInitError},
};

mod export;
mod stats;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Count orders per status
    Stats(stats::StatsArgs),
    /// Write a page of orders as JSON or CSV to stdout
    Export(export::ExportArgs),
}

pub(crate) async fn run(command: OrdersCommand, config: &AppConfig) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::Stats(args) => stats::run(args, config).await,
        OrdersSubcommand::Export(args) => export::run(args, config).await,
    }
}

async fn connect(config: &AppConfig) -> Result<AppContext, String> {
    AppContext::connect(&config.database)
        .await
        .map_err(|error| match &error {
            AppInitError::Database(source) => format!("{error}: {source}"),
        })
}
