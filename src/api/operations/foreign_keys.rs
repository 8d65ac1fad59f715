//! Foreign-key binding rewriter
//!
//! A field `owner@odata.bind` paired with a complex sibling `owner` binds an
//! existing entity. Fields flagged `foreign_name = "owner"` carry the key of
//! that entity; the rewriter turns them into an entity reference such as
//! `/Owners(42)` on the bind field and clears them, so only the reference is
//! sent.

use crate::api::constants::annotations;
use crate::api::error::Result;
use crate::api::models::{ServiceDefinition, TypeRegistry};
use crate::api::schema::{ComplexType, FieldDescriptor, Record, Value};
use log::debug;

pub struct ForeignKeyRewriter<'a> {
    definition: &'a ServiceDefinition,
    registry: Option<&'a dyn TypeRegistry>,
}

impl<'a> ForeignKeyRewriter<'a> {
    pub fn new(definition: &'a ServiceDefinition) -> Self {
        Self {
            definition,
            registry: None,
        }
    }

    /// Registry consulted before the definition's own types
    pub fn with_registry(mut self, registry: Option<&'a dyn TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    fn resolve_global_type(&self, type_id: &str) -> Option<ComplexType> {
        self.registry
            .and_then(|r| r.resolve_global_type(type_id))
            .or_else(|| self.definition.resolve_global_type(type_id))
    }

    /// Collection of the entity bound through `sibling`
    fn collection_name(&self, schema: &ComplexType, sibling: &FieldDescriptor) -> Option<String> {
        if let Some(name) = &sibling.collection_name {
            return Some(name.clone());
        }
        let complex = sibling.value_type.as_complex();
        if let Some(name) = complex.and_then(|c| c.collection_name.clone()) {
            return Some(name);
        }
        // one collection per type, annotated on the global type
        if let Some(global) = complex
            .and_then(|c| c.id.as_deref())
            .and_then(|id| self.resolve_global_type(id))
        {
            if global.collection_name.is_some() {
                return global.collection_name;
            }
        }
        schema.id.as_deref().and_then(|type_id| {
            self.definition
                .navigation_properties_of(type_id)
                .find(|p| p.name == sibling.name)
                .and_then(|p| p.target_entity_set.clone())
        })
    }

    /// Rewrite every bind field of `record` (and of nested records) in place
    pub fn rewrite(&self, record: &mut Record, schema: &ComplexType) -> Result<()> {
        for field in &schema.fields {
            if let Some(base) = field.name.strip_suffix(annotations::BIND) {
                self.rewrite_bind(record, schema, &field.name, base)?;
            } else if let Some(nested) = field.value_type.as_complex() {
                match record.get_mut(&field.name) {
                    Some(Value::Record(child)) => self.rewrite(child, nested)?,
                    Some(Value::List(children)) => {
                        for child in children.iter_mut().filter_map(Value::as_record_mut) {
                            self.rewrite(child, nested)?;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn rewrite_bind(
        &self,
        record: &mut Record,
        schema: &ComplexType,
        bind_name: &str,
        base: &str,
    ) -> Result<()> {
        let Some(sibling) = schema.get(base).filter(|f| f.value_type.is_complex()) else {
            return Ok(());
        };
        let Some(collection) = self.collection_name(schema, sibling) else {
            debug!("No collection name for bind field '{}', leaving it untouched", bind_name);
            return Ok(());
        };

        let linked: Vec<&FieldDescriptor> = schema
            .fields
            .iter()
            .filter(|f| f.foreign_name.as_deref() == Some(base))
            .collect();

        match linked.as_slice() {
            [] => {}
            [single] => {
                let reference = match record.get(&single.name) {
                    Some(Value::List(values)) => {
                        let references = values
                            .iter()
                            .filter(|v| !v.is_null())
                            .map(|v| {
                                key_literal(single, v)
                                    .map(|key| Value::from(format!("/{}({})", collection, key)))
                            })
                            .collect::<Result<Vec<Value>>>()?;
                        Some(Value::List(references))
                    }
                    Some(value) if !value.is_null() => {
                        Some(Value::from(format!("/{}({})", collection, key_literal(single, value)?)))
                    }
                    _ => None,
                };
                if let Some(reference) = reference {
                    record.set(bind_name, reference);
                    record.set(single.name.as_str(), Value::Null);
                }
            }
            composite => {
                let mut parts = Vec::new();
                for field in composite {
                    let Some(remote) = field.composite_remote_field()? else {
                        continue;
                    };
                    let Some(value) = record.value(&field.name) else {
                        continue;
                    };
                    parts.push(format!("{}={}", remote, key_literal(field, value)?));
                    record.set(field.name.as_str(), Value::Null);
                }
                if !parts.is_empty() {
                    record.set(bind_name, format!("/{}({})", collection, parts.join(",")));
                }
            }
        }
        Ok(())
    }
}

/// Key value as it appears inside parentheses: quoted for string keys
fn key_literal(field: &FieldDescriptor, value: &Value) -> Result<String> {
    let text = field.value_type.marshal(value)?;
    if field.value_type.is_quoted() {
        Ok(format!("'{}'", text.replace('\'', "''")))
    } else {
        Ok(text)
    }
}
