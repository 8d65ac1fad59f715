//! Response decoding
//!
//! A response is either a "created, no body" signal carrying the new entity
//! id in a header, a collection wrapper bound against the whole output, or a
//! single entity wrapped under the output's complex field.

use super::operation::{Function, Method};
use super::request::HttpResponse;
use crate::api::binding::Binding;
use crate::api::constants::headers;
use crate::api::error::Result;
use crate::api::schema::{Record, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static CREATED_ENTITY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^http.*/[^/]+\(([^)]+)\)$").expect("valid entity id regex"));

/// Id of the entity a URL like `https://host/api/Accounts(9f1...)` points at.
/// Anything else is returned as is.
pub fn created_entity_id(location: &str) -> String {
    CREATED_ENTITY_ID
        .captures(location)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| location.to_string())
}

pub struct ResponseDecoder<'a> {
    binding: &'a dyn Binding,
}

impl<'a> ResponseDecoder<'a> {
    pub fn new(binding: &'a dyn Binding) -> Self {
        Self { binding }
    }

    pub fn decode(&self, function: &Function, response: &HttpResponse) -> Result<Option<Record>> {
        if response.status == 204 && function.method == Method::Post {
            let location = response
                .header(headers::ODATA_ENTITY_ID)
                .or_else(|| response.header(headers::LOCATION));
            let Some(location) = location else {
                return Ok(None);
            };
            let Some(field) = function.output.fields.first() else {
                return Ok(None);
            };
            let mut output = function.output.new_instance();
            output.set(field.name.as_str(), Value::from(created_entity_id(location)));
            return Ok(Some(output));
        }

        let Some(body) = response.content() else {
            return Ok(None);
        };

        let mut list_binding = false;
        let mut single = None;
        for field in function.output.complex_fields() {
            if field.is_list() {
                list_binding = true;
            } else {
                single = Some(field);
            }
        }

        if list_binding {
            // the collection wrapper is the output itself
            return self.binding.unmarshal(body, &function.output).map(Some);
        }

        match single.and_then(|f| f.value_type.as_complex().map(|c| (f, c))) {
            Some((field, complex)) => {
                let entity = self.binding.unmarshal(body, complex)?;
                let mut output = function.output.new_instance();
                output.set(field.name.as_str(), entity);
                Ok(Some(output))
            }
            None => Ok(None),
        }
    }
}
