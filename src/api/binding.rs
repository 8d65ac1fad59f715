//! Record marshalling
//!
//! A `Binding` converts records to request bodies and response bodies back to
//! records, driven by the declared schema. `JsonBinding` is the only format
//! OData services speak here.

use crate::api::constants::headers;
use crate::api::error::{ODataError, Result};
use crate::api::schema::{ComplexType, FieldDescriptor, Record, Value, ValueType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value as Json};

pub trait Binding: Send + Sync {
    fn content_type(&self) -> &str;

    fn marshal(&self, record: &Record, schema: &ComplexType) -> Result<Vec<u8>>;

    fn unmarshal(&self, bytes: &[u8], schema: &ComplexType) -> Result<Record>;
}

/// JSON binding: nulls are left out when marshalling (partial updates never
/// force absent fields) and unknown members are ignored when unmarshalling
#[derive(Debug, Clone, Default)]
pub struct JsonBinding;

impl JsonBinding {
    pub fn new() -> Self {
        Self
    }

    pub fn to_json(&self, record: &Record, schema: Option<&ComplexType>) -> Result<Json> {
        let mut object = Map::new();
        for (name, value) in record.iter() {
            if value.is_null() {
                continue;
            }
            let field = schema.and_then(|s| s.get(name));
            object.insert(name.to_string(), value_to_json(value, field)?);
        }
        Ok(Json::Object(object))
    }

    pub fn from_json(&self, json: &Json, schema: &ComplexType) -> Result<Record> {
        let object = json.as_object().ok_or_else(|| {
            ODataError::Decode(format!("expected a JSON object for '{}'", schema.name))
        })?;

        let mut record = Record::new();
        for field in &schema.fields {
            let Some(member) = object.get(&field.name) else {
                continue;
            };
            if member.is_null() {
                continue;
            }
            let value = match member {
                Json::Array(items) => Value::List(
                    items
                        .iter()
                        .filter(|item| !item.is_null() || field.value_type == ValueType::Any)
                        .map(|item| self.json_to_value(item, field))
                        .collect::<Result<Vec<_>>>()?,
                ),
                single if field.is_list() => Value::List(vec![self.json_to_value(single, field)?]),
                single => self.json_to_value(single, field)?,
            };
            record.set(field.name.as_str(), value);
        }
        Ok(record)
    }

    fn json_to_value(&self, json: &Json, field: &FieldDescriptor) -> Result<Value> {
        let mismatch = || {
            ODataError::Decode(format!(
                "value {} does not match the type of field '{}'",
                json, field.name
            ))
        };

        match &field.value_type {
            ValueType::Complex(complex) => Ok(Value::Record(self.from_json(json, complex)?)),
            ValueType::String => match json {
                Json::String(s) => Ok(Value::String(s.clone())),
                Json::Number(n) => Ok(Value::String(n.to_string())),
                Json::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(mismatch()),
            },
            ValueType::Integer => match json {
                Json::Number(n) => n.as_i64().map(Value::Integer).ok_or_else(mismatch),
                Json::String(s) => s.parse().map(Value::Integer).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            ValueType::Decimal => match json {
                Json::Number(n) => n.as_f64().map(Value::Decimal).ok_or_else(mismatch),
                Json::String(s) => s.parse().map(Value::Decimal).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            ValueType::Boolean => match json {
                Json::Bool(b) => Ok(Value::Boolean(*b)),
                Json::String(s) => s.parse().map(Value::Boolean).map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            ValueType::DateTime | ValueType::Date => json
                .as_str()
                .and_then(parse_date_time)
                .map(Value::DateTime)
                .ok_or_else(mismatch),
            ValueType::Guid => json
                .as_str()
                .and_then(|s| uuid::Uuid::parse_str(s).ok())
                .map(Value::Uuid)
                .ok_or_else(mismatch),
            ValueType::Any => match json {
                Json::Null => Ok(Value::Null),
                Json::Bool(b) => Ok(Value::Boolean(*b)),
                Json::Number(n) => n
                    .as_i64()
                    .map(Value::Integer)
                    .or_else(|| n.as_f64().map(Value::Decimal))
                    .ok_or_else(mismatch),
                Json::String(s) => Ok(Value::String(s.clone())),
                Json::Array(_) | Json::Object(_) => Err(mismatch()),
            },
        }
    }
}

/// RFC 3339, zone-less date-time (taken as UTC) or a plain date
fn parse_date_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(date.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

fn value_to_json(value: &Value, field: Option<&FieldDescriptor>) -> Result<Json> {
    let nested = field.and_then(|f| f.value_type.as_complex());
    Ok(match value {
        Value::Null => Json::Null,
        Value::String(s) => Json::String(s.clone()),
        Value::Integer(i) => Json::Number((*i).into()),
        Value::Decimal(d) => Json::Number(
            Number::from_f64(*d)
                .ok_or_else(|| ODataError::schema(format!("{} can not be sent as JSON", d)))?,
        ),
        Value::Boolean(b) => Json::Bool(*b),
        Value::DateTime(date) => match field.map(|f| &f.value_type) {
            Some(ValueType::Date) => Json::String(date.format("%Y-%m-%d").to_string()),
            _ => Json::String(date.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
        },
        Value::Uuid(id) => Json::String(id.to_string()),
        Value::Record(record) => JsonBinding.to_json(record, nested)?,
        Value::List(values) => Json::Array(
            values
                .iter()
                .filter(|v| !v.is_null() || field.is_some_and(|f| f.value_type == ValueType::Any))
                .map(|v| value_to_json(v, field))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

impl Binding for JsonBinding {
    fn content_type(&self) -> &str {
        headers::CONTENT_TYPE_JSON
    }

    fn marshal(&self, record: &Record, schema: &ComplexType) -> Result<Vec<u8>> {
        let json = self.to_json(record, Some(schema))?;
        Ok(serde_json::to_vec(&json)?)
    }

    fn unmarshal(&self, bytes: &[u8], schema: &ComplexType) -> Result<Record> {
        let json: Json = serde_json::from_slice(bytes)?;
        self.from_json(&json, schema)
    }
}
