use clap::{Parser, Subcommand};
use ordering_app::config::AppConfig;

mod db;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "ordering-app", about = "Ordering CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Orders(orders::OrdersCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command, &self.config).await,
            Commands::Orders(command) => orders::run(command, &self.config).await,
        }
    }
}
