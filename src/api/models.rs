use super::operations::Function;
use super::schema::ComplexType;
use serde::{Deserialize, Serialize};

/// Already-parsed description of an OData service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub scheme: String,
    pub host: String,
    pub base_path: String,
    #[serde(default)]
    pub navigation_properties: Vec<NavigationProperty>,
    #[serde(default)]
    pub functions: Vec<Function>,
    /// Globally registered complex types
    #[serde(default)]
    pub types: Vec<ComplexType>,
}

/// A relationship field declared on an entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationProperty {
    /// Id of the owning type
    pub qualified_name: String,
    /// Name of the navigation field on the owning type
    pub name: String,
    /// Entity set the relationship points into
    #[serde(default)]
    pub target_entity_set: Option<String>,
    #[serde(default)]
    pub collection: bool,
}

impl ServiceDefinition {
    pub fn uses_tls(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("https")
    }

    /// Absolute service root, e.g. `https://host/api/data/v9.2`
    pub fn service_root(&self) -> String {
        super::constants::service_root(&self.scheme, &self.host, &self.base_path)
    }

    /// Navigation properties declared on the type with the given id
    pub fn navigation_properties_of<'a>(
        &'a self,
        type_id: &'a str,
    ) -> impl Iterator<Item = &'a NavigationProperty> + 'a {
        self.navigation_properties
            .iter()
            .filter(move |p| p.qualified_name == type_id)
    }

    pub fn find_function(&self, context: &str, name: &str) -> Option<&Function> {
        self.functions
            .iter()
            .find(|f| f.context.as_deref() == Some(context) && f.name == name)
    }
}

/// Per-client endpoint behaviour, invariant for the client's lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointConfig {
    pub charset: String,
    /// Address keys as `/Set/123` instead of `/Set(123)`
    pub key_as_segment: bool,
    /// Never send `If-Match: *`
    pub ignore_etag: bool,
    /// Create references with POST instead of PUT
    pub use_post_for_relations: bool,
    pub security_type: Option<String>,
    pub security_context: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            charset: super::constants::DEFAULT_CHARSET.to_string(),
            key_as_segment: false,
            ignore_etag: false,
            use_post_for_relations: false,
            security_type: None,
            security_context: None,
        }
    }
}

impl EndpointConfig {
    /// Only UTF-8 bodies are produced
    pub fn validate(&self) -> Result<(), super::error::ODataError> {
        let charset = self.charset.replace('_', "-");
        if charset.eq_ignore_ascii_case("UTF-8") || charset.eq_ignore_ascii_case("UTF8") {
            Ok(())
        } else {
            Err(super::error::ODataError::schema(format!(
                "unsupported charset '{}'",
                self.charset
            )))
        }
    }

    /// `/key` or `(key)` depending on the key convention
    pub fn key_suffix(&self, key: &str) -> String {
        super::constants::key_suffix(key, self.key_as_segment)
    }
}

/// Lookup of globally registered types by id
pub trait TypeRegistry: Send + Sync {
    fn resolve_global_type(&self, type_id: &str) -> Option<ComplexType>;
}

impl TypeRegistry for ServiceDefinition {
    fn resolve_global_type(&self, type_id: &str) -> Option<ComplexType> {
        self.types
            .iter()
            .find(|t| t.id.as_deref() == Some(type_id))
            .cloned()
    }
}
