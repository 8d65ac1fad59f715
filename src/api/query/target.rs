//! Target URL building
//!
//! Produces the path (plus query string) of a request relative to the host:
//! the definition's base path with path template parameters substituted,
//! parent-scoping segments, the function context and the entity key.

use super::options::QueryOptions;
use crate::api::constants::{annotations, fields};
use crate::api::error::{ODataError, Result};
use crate::api::models::{EndpointConfig, ServiceDefinition};
use crate::api::operations::{Function, Method};
use crate::api::schema::{ComplexType, FieldDescriptor, Record, Value};
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

static PATH_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\s*([^{}\s]+)\s*\}").expect("valid path parameter regex"));

/// Names of the `{name}` template parameters of an endpoint path
pub fn path_parameters(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in PATH_PARAMETER.captures_iter(path) {
        let name = capture[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Replace `{name}` tokens with the values of the input's `path` record.
/// Parameters without a value are left untouched.
pub fn substitute_path_parameters(path: &str, input: Option<&Record>) -> Result<String> {
    let Some(values) = input.and_then(|i| i.value(fields::PATH)).and_then(Value::as_record) else {
        return Ok(path.to_string());
    };

    let mut substituted = path.to_string();
    for name in path_parameters(path) {
        let Some(value) = values.value(&name).and_then(Value::scalar_string) else {
            continue;
        };
        let token = Regex::new(&format!(r"\{{\s*{}\s*\}}", regex::escape(&name)))
            .map_err(|e| ODataError::schema(format!("invalid path parameter '{}': {}", name, e)))?;
        substituted = token.replace_all(&substituted, NoExpand(&value)).into_owned();
    }
    Ok(substituted)
}

/// Entity set named by a `<set>@odata.parent.id` field or filter key
pub fn parent_entity_set(name: &str) -> Option<&str> {
    name.find(annotations::PARENT_ID)
        .filter(|index| *index > 0)
        .map(|index| &name[..index])
}

/// The complex field carrying the entity body
pub fn body_field(schema: &ComplexType) -> Option<&FieldDescriptor> {
    schema.complex_fields().last()
}

/// Type used to interpret parent ids: the input body, else the output body
fn entity_type(function: &Function) -> Option<&ComplexType> {
    body_field(&function.input)
        .or_else(|| body_field(&function.output))
        .and_then(|f| f.value_type.as_complex())
}

/// Resolved target of an association pseudo-verb
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationTarget {
    /// `<base>/<context><key>/<navigationProperty>`
    pub target: String,
    /// Entity set of the bound entities
    pub collection: String,
    pub navigation_property: String,
    /// Desired bound ids, marshalled
    pub bound_ids: Vec<String>,
}

pub struct TargetBuilder<'a> {
    definition: &'a ServiceDefinition,
    endpoint: &'a EndpointConfig,
}

impl<'a> TargetBuilder<'a> {
    pub fn new(definition: &'a ServiceDefinition, endpoint: &'a EndpointConfig) -> Self {
        Self {
            definition,
            endpoint,
        }
    }

    fn base_path(&self, input: Option<&Record>) -> Result<String> {
        substitute_path_parameters(&self.definition.base_path, input)
    }

    fn parent_segment(&self, entity_set: &str, key: &str) -> String {
        format!("/{}{}", entity_set, self.endpoint.key_suffix(key))
    }

    /// Marshal a parent id through its declared field, if any
    fn parent_key(&self, schema: Option<&ComplexType>, name: &str, value: &Value) -> Result<String> {
        match schema.and_then(|s| s.get(name)) {
            Some(field) => field.value_type.marshal(value),
            None => value
                .scalar_string()
                .ok_or_else(|| ODataError::schema(format!("parent id '{}' is not a scalar", name))),
        }
    }

    /// Path and query string for a regular verb
    pub fn entity_target(&self, function: &Function, input: Option<&Record>) -> Result<String> {
        let mut target = self.base_path(input)?;
        let schema = entity_type(function);

        // parent ids carried in any complex input field
        for field in function.input.complex_fields() {
            let Some(body) = input.and_then(|i| i.value(&field.name)).and_then(Value::as_record) else {
                continue;
            };
            let field_schema = field.value_type.as_complex().or(schema);
            for (name, value) in body.iter() {
                let Some(entity_set) = parent_entity_set(name) else {
                    continue;
                };
                for single in value.flatten() {
                    let key = self.parent_key(field_schema, name, single)?;
                    target.push_str(&self.parent_segment(entity_set, &key));
                }
            }
        }

        // parent ids passed as filters become segments instead of conditions
        let mut options = QueryOptions::from_input(input)?;
        for clause in std::mem::take(&mut options.filters) {
            let parent = clause.key.as_deref().and_then(|key| {
                parent_entity_set(key).map(|set| (key.to_string(), set.to_string()))
            });
            let Some((key, entity_set)) = parent else {
                options.filters.push(clause);
                continue;
            };
            for value in &clause.values {
                let value = Value::from(value);
                if value.is_null() {
                    continue;
                }
                let id = self.parent_key(schema, &key, &value)?;
                target.push_str(&self.parent_segment(&entity_set, &id));
            }
        }

        target.push('/');
        target.push_str(function.require_context()?);

        for field in function.input.fields.iter().filter(|f| f.primary_key) {
            let value = input.and_then(|i| i.value(&field.name)).ok_or_else(|| {
                ODataError::schema(format!("missing value for primary key '{}'", field.name))
            })?;
            let key = field.value_type.marshal(value)?;
            if self.endpoint.key_as_segment {
                target.push('/');
                target.push_str(&key);
            } else if field.value_type.is_quoted() {
                target.push_str(&format!("('{}')", key.replace('\'', "''")));
            } else {
                target.push_str(&format!("({})", key));
            }
        }

        if function.method == Method::Get {
            options = options.expand_from(&function.output);
        }
        target.push_str(&options.to_query_string()?);
        Ok(target)
    }

    /// Target of an association pseudo-verb, with the desired bound ids
    pub fn association_target(
        &self,
        function: &Function,
        input: Option<&Record>,
    ) -> Result<AssociationTarget> {
        let bound_ids_field = function.input.get(fields::BOUND_IDS).ok_or_else(|| {
            ODataError::schema(format!("function '{}' has no boundIds input", function.name))
        })?;
        let entity_id_field = function.input.get(fields::ENTITY_ID).ok_or_else(|| {
            ODataError::schema(format!("function '{}' has no entityId input", function.name))
        })?;
        let collection = bound_ids_field.collection_name.clone().ok_or_else(|| {
            ODataError::schema("boundIds must declare the collection name of the bound entities")
        })?;
        let navigation_property = bound_ids_field.alias.clone().ok_or_else(|| {
            ODataError::schema("boundIds must declare the navigation property as alias")
        })?;

        let entity_id = input
            .and_then(|i| i.value(fields::ENTITY_ID))
            .ok_or_else(|| ODataError::schema("missing value for entityId"))?;
        let entity_id = entity_id_field.value_type.marshal(entity_id)?;

        let bound_ids = input
            .and_then(|i| i.value(fields::BOUND_IDS))
            .map(|v| {
                v.flatten()
                    .into_iter()
                    .map(|id| bound_ids_field.value_type.marshal(id))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        let target = format!(
            "{}/{}{}/{}",
            self.base_path(input)?,
            function.require_context()?,
            self.endpoint.key_suffix(&entity_id),
            navigation_property
        );

        Ok(AssociationTarget {
            target,
            collection,
            navigation_property,
            bound_ids,
        })
    }
}
