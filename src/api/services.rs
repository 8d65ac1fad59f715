//! Exposed service catalog
//!
//! Each function whose context is one of the client's configured entity sets
//! is exposed as a service `<clientId>.services.<context>.<name>`. The input
//! of a service extends the function input with structured filters and path
//! template values where they apply.

use super::constants::fields;
use super::models::ServiceDefinition;
use super::operations::{Function, Method};
use super::query::target::path_parameters;
use super::schema::{ComplexType, FieldDescriptor, ValueType};
use serde::Serialize;

/// REST endpoint a service depends on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDependency {
    /// `scheme://host/basePath`
    pub endpoint: String,
    pub artifact_id: String,
    pub method: Method,
    /// Id of the owning client
    pub group: String,
    #[serde(rename = "type")]
    pub dependency_type: String,
}

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
    pub id: String,
    pub function: Function,
    pub input: ComplexType,
    pub dependency: ExternalDependency,
}

pub fn service_id(client_id: &str, function: &Function) -> String {
    format!("{}.services.{}", client_id, function.qualified_name())
}

/// Shape of one structured filter clause
pub fn filter_clause_type() -> ComplexType {
    ComplexType::new("filter")
        .with_field(FieldDescriptor::string("key"))
        .with_field(FieldDescriptor::string("operator"))
        .with_field(FieldDescriptor::any("values").list().optional())
        .with_field(FieldDescriptor::new("or", ValueType::Boolean).optional())
        .with_field(FieldDescriptor::new("caseInsensitive", ValueType::Boolean).optional())
}

/// Function input extended with `filters` and `path` where applicable
pub fn input_interface(function: &Function, base_path: &str) -> ComplexType {
    let mut input = function.input.clone();
    input.name = "input".to_string();

    if input.get(fields::FILTER).is_some() && input.get(fields::FILTERS).is_none() {
        input.fields.push(
            FieldDescriptor::complex(fields::FILTERS, filter_clause_type())
                .list()
                .optional(),
        );
    }

    let parameters = path_parameters(base_path);
    if !parameters.is_empty() && input.get(fields::PATH).is_none() {
        let path = parameters
            .into_iter()
            .fold(ComplexType::new(fields::PATH), |path, name| {
                path.with_field(FieldDescriptor::string(name).optional())
            });
        input.fields.push(FieldDescriptor::complex(fields::PATH, path));
    }
    input
}

pub fn external_dependency(client_id: &str, definition: &ServiceDefinition, function: &Function) -> ExternalDependency {
    ExternalDependency {
        endpoint: definition.service_root(),
        artifact_id: service_id(client_id, function),
        method: function.method,
        group: client_id.to_string(),
        dependency_type: "REST".to_string(),
    }
}

/// Services exposed for the given entity sets
pub fn list_services(client_id: &str, definition: &ServiceDefinition, entity_sets: &[String]) -> Vec<ServiceDescriptor> {
    definition
        .functions
        .iter()
        .filter(|f| {
            f.context
                .as_ref()
                .is_some_and(|context| entity_sets.contains(context))
        })
        .map(|function| ServiceDescriptor {
            id: service_id(client_id, function),
            function: function.clone(),
            input: input_interface(function, &definition.base_path),
            dependency: external_dependency(client_id, definition, function),
        })
        .collect()
}
