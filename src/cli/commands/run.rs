use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::load_config;
use crate::api::schema::{ComplexType, Record};
use crate::api::{CallContext, ClientManager, JsonBinding};

#[derive(Args)]
pub struct RunCommands {
    /// Service id, e.g. `crm.services.accounts.list`
    pub service: String,

    /// JSON file with the service input
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Transaction id forwarded to the transport
    #[arg(short, long)]
    pub transaction: Option<String>,

    /// Pretty print the output
    #[arg(short, long)]
    pub pretty: bool,
}

/// Read a JSON input against the service's input interface
pub fn read_input(content: &str, schema: &ComplexType) -> Result<Record> {
    let json: serde_json::Value = serde_json::from_str(content).context("Input is not valid JSON")?;
    Ok(JsonBinding::new().from_json(&json, schema)?)
}

pub fn format_output(output: Option<&Record>, schema: &ComplexType, pretty: bool) -> Result<String> {
    let Some(output) = output else {
        return Ok("null".to_string());
    };
    let json = JsonBinding::new().to_json(output, Some(schema))?;
    Ok(if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    })
}

pub async fn handle_run_command(args: RunCommands, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let manager = ClientManager::from_config(&config)?;
    let (client, service) = manager.find_service(&args.service).await?;

    let input = match &args.input {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))?;
            Some(read_input(&content, &service.input)?)
        }
        None => None,
    };

    let call = match args.transaction {
        Some(transaction) => CallContext::with_transaction(transaction),
        None => CallContext::new(),
    };

    println!("🚀 {} {}", service.function.method.to_string().cyan(), service.id.bold());
    let started = Instant::now();
    let output = client
        .run(&service.function, input.as_ref(), &call)
        .await
        .with_context(|| format!("Service '{}' failed", service.id))?;
    info!("Service {} completed in {:?}", service.id, started.elapsed());

    println!("{}", format_output(output.as_ref(), &service.function.output, args.pretty)?);
    Ok(())
}
