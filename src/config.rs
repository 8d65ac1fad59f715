use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::constants::DEFAULT_CHARSET;
use crate::api::logging::MonitoringConfig;
use crate::api::models::EndpointConfig;

/// One configured OData service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service root URL, may contain `{param}` path templates
    #[serde(default)]
    pub endpoint: Option<String>,
    /// JSON service definition
    pub definition: PathBuf,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default)]
    pub key_as_segment: bool,
    #[serde(default)]
    pub ignore_etag: bool,
    #[serde(default)]
    pub use_post_for_relations: bool,
    #[serde(default)]
    pub security_type: Option<String>,
    #[serde(default)]
    pub security_context: Option<String>,
    /// Entity sets whose functions are exposed as services
    #[serde(default)]
    pub entity_sets: Vec<String>,
    #[serde(default)]
    pub request_logging: bool,
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

impl ClientConfig {
    pub fn new(definition: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: None,
            definition: definition.into(),
            charset: default_charset(),
            key_as_segment: false,
            ignore_etag: false,
            use_post_for_relations: false,
            security_type: None,
            security_context: None,
            entity_sets: Vec::new(),
            request_logging: false,
        }
    }

    pub fn endpoint_config(&self) -> EndpointConfig {
        EndpointConfig {
            charset: self.charset.clone(),
            key_as_segment: self.key_as_segment,
            ignore_etag: self.ignore_etag,
            use_post_for_relations: self.use_post_for_relations,
            security_type: self.security_type.clone(),
            security_context: self.security_context.clone(),
        }
    }

    /// Logging settings of this client on top of the global ones
    pub fn monitoring(&self, global: &MonitoringConfig) -> MonitoringConfig {
        MonitoringConfig {
            request_logging: global.request_logging || self.request_logging,
            log_level: global.log_level,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub clients: HashMap<String, ClientConfig>,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("odata-client")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".odata-client")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config = Self::parse(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config with {} clients", config.clients.len());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        for (name, client) in &config.clients {
            if client.entity_sets.is_empty() {
                warn!("Client '{}' exposes no entity sets", name);
            }
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        debug!("Saving config to: {:?}", config_path);

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn get_client(&self, name: &str) -> Option<&ClientConfig> {
        self.clients.get(name)
    }
}
