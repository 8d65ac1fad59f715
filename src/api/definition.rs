//! Service definition resolution
//!
//! The engine never parses metadata itself; it asks a `DefinitionResolver`
//! for an already-built `ServiceDefinition`.

use crate::api::error::{ODataError, Result};
use crate::api::models::ServiceDefinition;
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait DefinitionResolver: Send + Sync {
    async fn resolve(&self) -> Result<ServiceDefinition>;
}

/// A definition known up front
pub struct StaticDefinition(ServiceDefinition);

impl StaticDefinition {
    pub fn new(definition: ServiceDefinition) -> Self {
        Self(definition)
    }
}

#[async_trait]
impl DefinitionResolver for StaticDefinition {
    async fn resolve(&self) -> Result<ServiceDefinition> {
        Ok(self.0.clone())
    }
}

/// Split `scheme://host/base/path` into its parts. The path is kept
/// verbatim so `{param}` templates survive.
pub fn split_endpoint(endpoint: &str) -> Result<(String, String, String)> {
    let (scheme, rest) = endpoint
        .split_once("://")
        .ok_or_else(|| ODataError::Metadata(format!("endpoint '{}' has no scheme", endpoint)))?;
    let (host, path) = match rest.find('/') {
        Some(i) => (&rest[..i], rest[i..].trim_end_matches('/')),
        None => (rest, ""),
    };
    if host.is_empty() {
        return Err(ODataError::Metadata(format!("endpoint '{}' has no host", endpoint)));
    }
    Ok((scheme.to_string(), host.to_string(), path.to_string()))
}

/// A definition stored as JSON on disk
pub struct JsonFileDefinition {
    path: PathBuf,
    endpoint: Option<String>,
}

impl JsonFileDefinition {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            endpoint: None,
        }
    }

    /// Serve the definition from `endpoint` instead of the root stored in the file
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

#[async_trait]
impl DefinitionResolver for JsonFileDefinition {
    async fn resolve(&self) -> Result<ServiceDefinition> {
        log::debug!("Loading service definition from {:?}", self.path);
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ODataError::Metadata(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let mut definition: ServiceDefinition = serde_json::from_str(&content).map_err(|e| {
            ODataError::Metadata(format!("failed to parse {}: {}", self.path.display(), e))
        })?;

        if let Some(endpoint) = &self.endpoint {
            let (scheme, host, base_path) = split_endpoint(endpoint)?;
            definition.scheme = scheme;
            definition.host = host;
            definition.base_path = base_path;
        }
        Ok(definition)
    }
}
