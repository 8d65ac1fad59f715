use super::commands::{FilterCommands, RunCommands, ServicesCommands};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "odata-client")]
#[command(about = "Run schema-described operations against OData v4 services")]
pub struct Cli {
    /// Use this configuration file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the services exposed by the configured clients
    Services(ServicesCommands),
    /// Execute a service with a JSON input
    Run(RunCommands),
    /// Compile a JSON list of filter clauses into a $filter expression
    Filter(FilterCommands),
}
