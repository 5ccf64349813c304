//! Ordering Application CLI

use std::process;

use clap::Parser;
use ordering_app::{config, logging};

mod cli;

#[tokio::main]
pub async fn main() {
    config::load_dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = logging::init(&cli.config.logging) {
        eprintln!("failed to initialise logging: {error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
