use anyhow::Result;
use clap::Parser;
use log::info;

use odata_client::cli::commands::{handle_filter_command, handle_run_command, handle_services_command};
use odata_client::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Log to file (truncate on each run)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("odata-client.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting odata-client");

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Services(args) => handle_services_command(args, config_path).await,
        Commands::Run(args) => handle_run_command(args, config_path).await,
        Commands::Filter(args) => handle_filter_command(args).await,
    }
}
