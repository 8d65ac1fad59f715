pub mod filter;
pub mod run;
pub mod services;

pub use filter::{FilterCommands, handle_filter_command};
pub use run::{RunCommands, handle_run_command};
pub use services::{ServicesCommands, handle_services_command};

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Config;

/// Configuration from `path`, or from the default location
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            Config::load_from(path)
        }
        None => Config::load(),
    }
    .context("Failed to load configuration")
}
