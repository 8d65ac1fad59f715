use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use super::auth::{AuthenticatorRegistry, BearerAuthenticator};
use super::client::ODataClient;
use super::definition::JsonFileDefinition;
use super::services::{ServiceDescriptor, list_services};
use crate::config::{ClientConfig, Config};

/// Security type handled by the bearer authenticator
pub const BEARER_SECURITY_TYPE: &str = "bearer";

/// Manages the OData clients declared in the configuration
pub struct ClientManager {
    clients: HashMap<String, Arc<ODataClient>>,
}

impl ClientManager {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut authenticators = AuthenticatorRegistry::new();
        authenticators.register(BEARER_SECURITY_TYPE, Arc::new(BearerAuthenticator::new()));

        let mut clients = HashMap::new();
        for (name, client_config) in &config.clients {
            let client = Self::build_client(name, client_config, config, &authenticators)
                .with_context(|| format!("Failed to set up client '{}'", name))?;
            clients.insert(name.clone(), Arc::new(client));
        }
        log::info!("Client manager ready with {} clients", clients.len());

        Ok(Self { clients })
    }

    fn build_client(
        name: &str,
        client_config: &ClientConfig,
        config: &Config,
        authenticators: &AuthenticatorRegistry,
    ) -> anyhow::Result<ODataClient> {
        let mut definition = JsonFileDefinition::new(&client_config.definition);
        if let Some(endpoint) = &client_config.endpoint {
            definition = definition.with_endpoint(endpoint);
        }

        let client = ODataClient::builder(name, Arc::new(definition))
            .endpoint(client_config.endpoint_config())
            .authenticators(authenticators.clone())
            .entity_sets(client_config.entity_sets.clone())
            .monitoring(client_config.monitoring(&config.monitoring))
            .build()?;
        Ok(client)
    }

    /// Add an already built client, replacing one with the same id
    pub fn add_client(&mut self, client: ODataClient) {
        self.clients.insert(client.id().to_string(), Arc::new(client));
    }

    pub fn get(&self, name: &str) -> anyhow::Result<Arc<ODataClient>> {
        self.clients
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Client '{}' not found", name))
    }

    pub fn list_clients(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Services exposed by one client
    pub async fn services(&self, name: &str) -> anyhow::Result<Vec<ServiceDescriptor>> {
        let client = self.get(name)?;
        let definition = client
            .definition()
            .await
            .with_context(|| format!("Failed to resolve the service definition of '{}'", name))?;
        Ok(list_services(client.id(), &definition, client.entity_sets()))
    }

    /// Find a service by its id `<clientId>.services.<context>.<name>`
    pub async fn find_service(&self, service_id: &str) -> anyhow::Result<(Arc<ODataClient>, ServiceDescriptor)> {
        let (client_id, _) = service_id
            .split_once(".services.")
            .ok_or_else(|| anyhow::anyhow!("'{}' is not a service id", service_id))?;

        let client = self.get(client_id)?;
        let service = self
            .services(client_id)
            .await?
            .into_iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| anyhow::anyhow!("Service '{}' not found", service_id))?;
        Ok((client, service))
    }
}
