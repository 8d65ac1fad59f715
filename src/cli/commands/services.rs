use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::Path;

use super::load_config;
use crate::api::ClientManager;

#[derive(Args)]
pub struct ServicesCommands {
    /// Only list the services of this client
    #[arg(short, long)]
    pub client: Option<String>,
}

pub async fn handle_services_command(args: ServicesCommands, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let manager = ClientManager::from_config(&config)?;

    let clients: Vec<String> = match args.client {
        Some(client) => vec![client],
        None => manager.list_clients().into_iter().map(String::from).collect(),
    };

    if clients.is_empty() {
        println!("{}", "No clients configured.".yellow());
        return Ok(());
    }

    for client in clients {
        let services = manager.services(&client).await?;
        println!("{} ({} services)", client.bright_green().bold(), services.len());
        for service in services {
            println!(
                "  {:<20} {}",
                service.dependency.method.to_string().cyan(),
                service.id
            );
            println!("  {:<20} {}", "", service.dependency.endpoint.dimmed());
        }
    }
    Ok(())
}
