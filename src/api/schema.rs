//! Schema-described records
//!
//! A `Record` is an ordered tree of named values. Its shape is described by a
//! `ComplexType` whose `FieldDescriptor`s carry the annotations that drive URL
//! construction (primary keys, foreign-key links, collection names, expansions).

use super::error::{ODataError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared type of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Decimal,
    Boolean,
    DateTime,
    Date,
    Guid,
    /// Untyped scalar, kept as it arrives (nulls included)
    Any,
    Complex(Box<ComplexType>),
}

impl ValueType {
    pub fn is_complex(&self) -> bool {
        matches!(self, ValueType::Complex(_))
    }

    pub fn as_complex(&self) -> Option<&ComplexType> {
        match self {
            ValueType::Complex(complex) => Some(complex),
            _ => None,
        }
    }

    /// Keys of string type are quoted in URLs, everything else is not
    pub fn is_quoted(&self) -> bool {
        matches!(self, ValueType::String)
    }

    /// Canonical string form of a scalar value of this type
    pub fn marshal(&self, value: &Value) -> Result<String> {
        if self.is_complex() {
            return Err(ODataError::schema("complex values can not be marshalled to a string"));
        }
        match (self, value) {
            (_, Value::Null) => Err(ODataError::schema("can not marshal a null value")),
            (_, Value::Record(_)) | (_, Value::List(_)) => Err(ODataError::schema(
                "only scalar values can be marshalled to a string",
            )),
            (ValueType::Date, Value::DateTime(date)) => Ok(date.format("%Y-%m-%d").to_string()),
            (_, scalar) => scalar
                .scalar_string()
                .ok_or_else(|| ODataError::schema("value has no string form")),
        }
    }
}

/// A single field of a complex type, with its annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub primary_key: bool,
    /// Name of the complex sibling this field binds
    #[serde(default)]
    pub foreign_name: Option<String>,
    /// Composite-key mapping in the form `entitySet:remoteField`
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    /// Navigation property name (used on `boundIds`)
    #[serde(default)]
    pub alias: Option<String>,
    /// Navigation property to expand when this field is part of a GET output
    #[serde(default)]
    pub expand: Option<String>,
    /// `None` means exactly one, `Some(0)` is unbounded
    #[serde(default)]
    pub max_occurs: Option<u32>,
    #[serde(default)]
    pub min_occurs: Option<u32>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            primary_key: false,
            foreign_name: None,
            foreign_key: None,
            collection_name: None,
            alias: None,
            expand: None,
            max_occurs: None,
            min_occurs: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::String)
    }

    pub fn any(name: impl Into<String>) -> Self {
        Self::new(name, ValueType::Any)
    }

    pub fn complex(name: impl Into<String>, complex: ComplexType) -> Self {
        Self::new(name, ValueType::Complex(Box::new(complex)))
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn foreign_name(mut self, name: impl Into<String>) -> Self {
        self.foreign_name = Some(name.into());
        self
    }

    pub fn foreign_key(mut self, mapping: impl Into<String>) -> Self {
        self.foreign_key = Some(mapping.into());
        self
    }

    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn expand(mut self, navigation_property: impl Into<String>) -> Self {
        self.expand = Some(navigation_property.into());
        self
    }

    pub fn list(mut self) -> Self {
        self.max_occurs = Some(0);
        self
    }

    pub fn optional(mut self) -> Self {
        self.min_occurs = Some(0);
        self
    }

    pub fn is_list(&self) -> bool {
        self.max_occurs.is_some_and(|max| max != 1)
    }

    /// Remote field name from the composite-key mapping
    pub fn composite_remote_field(&self) -> Result<Option<&str>> {
        match &self.foreign_key {
            None => Ok(None),
            Some(mapping) => mapping
                .split_once(':')
                .map(|(_, remote)| Some(remote))
                .ok_or_else(|| {
                    ODataError::schema(format!(
                        "foreign key mapping '{}' of field '{}' is not of the form entitySet:field",
                        mapping, self.name
                    ))
                }),
        }
    }
}

/// A named structure of fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexType {
    pub name: String,
    /// Global type id, used to look the type up in a registry
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl ComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_collection_name(mut self, name: impl Into<String>) -> Self {
        self.collection_name = Some(name.into());
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn complex_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.value_type.is_complex())
    }

    pub fn new_instance(&self) -> Record {
        Record::new()
    }
}

/// Value of a record field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Uuid(Uuid),
    Record(Record),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    /// Plain textual form of a scalar, `None` for null, records and lists
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Decimal(d) => Some(d.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::DateTime(date) => Some(format_date_time(date)),
            Value::Uuid(id) => Some(id.to_string()),
            Value::Null | Value::Record(_) | Value::List(_) => None,
        }
    }

    /// A single value or every element of a list, skipping nulls
    pub fn flatten(&self) -> Vec<&Value> {
        match self {
            Value::List(values) => values.iter().filter(|v| !v.is_null()).collect(),
            Value::Null => Vec::new(),
            single => vec![single],
        }
    }
}

/// Canonical date-time text without zone designator
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Ordered mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style set
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Raw access, including explicit nulls
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Non-null value of a field
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| !v.is_null())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Resolve a slash-separated path through nested records
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('/');
        let mut current = self.value(segments.next()?)?;
        for segment in segments {
            current = current.as_record()?.value(segment)?;
        }
        Some(current)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(existing) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
