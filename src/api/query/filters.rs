//! OData `$filter` compilation
//!
//! Turns a flat, ordered list of generic filter clauses into a single OData
//! boolean expression. Each clause joins the running expression with ` and`
//! or ` or` according to its own `or` flag; runs of OR-joined clauses are
//! grouped in parentheses.
//!
//! Clauses whose operator is not one of the comparison operators are tri-state
//! flags: a `null` first value drops the clause, a `false` first value negates it.

use crate::api::error::{ODataError, Result};
use crate::api::schema::{Record, Value, format_date_time};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Operators that compare a field against values
pub const COMPARISON_OPERATORS: &[&str] = &[
    "=", "<>", "!=", ">", "<", ">=", "<=", "like", "ilike", "not like", "not ilike",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Guid(Uuid),
    Null,
}

/// One generic filter clause
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub key: Option<String>,
    pub operator: String,
    pub values: Vec<FilterValue>,
    /// Join the running expression with `or` instead of `and`
    pub or: bool,
    pub case_insensitive: bool,
}

fn is_comparison(operator: &str) -> bool {
    COMPARISON_OPERATORS.contains(&operator)
}

impl FilterClause {
    pub fn new(key: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            operator: operator.into(),
            values: Vec::new(),
            or: false,
            case_insensitive: false,
        }
    }

    pub fn value(mut self, value: impl Into<FilterValue>) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn values<V: Into<FilterValue>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn or(mut self) -> Self {
        self.or = true;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    // Comparison shorthands
    pub fn eq(key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(key, "=").value(value)
    }

    pub fn ne(key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(key, "<>").value(value)
    }

    pub fn like(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, "like").value(FilterValue::String(value.into()))
    }

    pub fn is_null(key: impl Into<String>) -> Self {
        Self::new(key, "is null")
    }

    fn first_value(&self) -> Option<&FilterValue> {
        if is_comparison(&self.operator) {
            None
        } else {
            self.values.first()
        }
    }

    /// Tri-state flag that was not set
    pub fn is_skipped(&self) -> bool {
        matches!(self.first_value(), Some(FilterValue::Null))
    }

    /// Tri-state flag explicitly set to false
    pub fn is_inverted(&self) -> bool {
        matches!(self.first_value(), Some(FilterValue::Boolean(false)))
    }

    /// Read a clause from a `filters` entry of an input record
    pub fn from_record(record: &Record) -> Result<Self> {
        let key = record
            .value("key")
            .map(|v| {
                v.scalar_string()
                    .ok_or_else(|| ODataError::filter("filter key must be a scalar"))
            })
            .transpose()?;
        let operator = record
            .value("operator")
            .and_then(|v| v.scalar_string())
            .unwrap_or_else(|| "=".to_string());
        let values = match record.get("values") {
            None => Vec::new(),
            Some(Value::List(values)) => values
                .iter()
                .map(FilterValue::try_from)
                .collect::<Result<Vec<_>>>()?,
            Some(single) => vec![FilterValue::try_from(single)?],
        };
        Ok(Self {
            key,
            operator,
            values,
            or: record.value("or").and_then(Value::as_bool).unwrap_or(false),
            case_insensitive: record
                .value("caseInsensitive")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    pub fn to_record(&self) -> Record {
        let values: Vec<Value> = self.values.iter().map(Value::from).collect();
        Record::new()
            .with("key", self.key.clone())
            .with("operator", self.operator.as_str())
            .with("values", values)
            .with("or", self.or)
            .with("caseInsensitive", self.case_insensitive)
    }
}

/// Read every clause of a `filters` list value
pub fn clauses_from_value(value: &Value) -> Result<Vec<FilterClause>> {
    value
        .flatten()
        .into_iter()
        .map(|entry| {
            entry
                .as_record()
                .ok_or_else(|| ODataError::filter("filters must be records"))
                .and_then(FilterClause::from_record)
        })
        .collect()
}

/// Map a generic operator onto its OData token; unknown operators pass through
pub fn map_operator(operator: &str) -> &str {
    match operator {
        "=" => "eq",
        "!=" | "<>" => "ne",
        ">" => "gt",
        ">=" => "ge",
        "<" => "lt",
        "<=" => "le",
        "&&" => "and",
        "||" => "or",
        // like becomes contains(field, value), only the separator remains
        "like" => ",",
        "is null" => "eq null",
        "is not null" => "ne null",
        other => other,
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Compile clauses into an OData boolean expression (possibly empty)
pub fn build_filter(clauses: &[FilterClause]) -> Result<String> {
    let mut filter = String::new();
    let mut open_or = false;

    for (index, clause) in clauses.iter().enumerate() {
        let Some(key) = clause.key.as_deref() else {
            continue;
        };
        if clause.is_skipped() {
            continue;
        }
        if is_comparison(&clause.operator) && clause.values.is_empty() {
            return Err(ODataError::filter(format!(
                "operator '{}' on '{}' requires at least one value",
                clause.operator, key
            )));
        }

        if !filter.is_empty() {
            filter.push_str(if clause.or { " or" } else { " and" });
        }

        // grouping looks ahead at the raw next clause, skipped or not
        let next = clauses.get(index + 1);
        if !open_or && next.is_some_and(|n| n.or) {
            filter.push_str(" (");
            open_or = true;
        }

        let mut inverse = clause.is_inverted();
        let mut operator = clause.operator.as_str();

        if clause.values.len() >= 2 {
            if operator == "=" {
                operator = "in";
            } else if operator == "<>" || operator == "!=" {
                operator = "in";
                inverse = true;
            }
        }

        let lowered = operator.to_lowercase();
        if lowered == "not like" || lowered == "not ilike" {
            operator = "like";
            inverse = true;
        }

        let lowered = operator.to_lowercase();
        if inverse && lowered == "is null" {
            operator = "is not null";
            inverse = false;
        } else if inverse && lowered == "is not null" {
            operator = "is null";
            inverse = false;
        } else if inverse {
            filter.push_str(" not(");
        }

        let like = operator == "like";
        if like {
            filter.push_str("contains(");
        }
        if clause.case_insensitive {
            filter.push_str(&format!(" tolower({})", key));
        } else {
            filter.push_str(&format!(" {}", key));
        }
        filter.push(' ');
        filter.push_str(map_operator(operator));

        if !clause.values.is_empty() && (is_comparison(operator) || operator == "in") {
            if let [value] = clause.values.as_slice() {
                if like {
                    // wildcards are implicit in contains()
                    let text = value.raw_text().replace('%', "");
                    if clause.case_insensitive {
                        filter.push_str(&format!(" tolower({})", quote(&text)));
                    } else {
                        filter.push_str(&format!(" {}", quote(&text)));
                    }
                } else if clause.case_insensitive {
                    filter.push_str(&format!(" tolower({})", quote(&value.raw_text())));
                } else {
                    filter.push_str(&format!(" {}", value.to_odata_string()));
                }
            } else {
                let rendered: Vec<String> = clause
                    .values
                    .iter()
                    .map(|value| {
                        if clause.case_insensitive {
                            format!("tolower({})", quote(&value.raw_text()))
                        } else {
                            value.to_odata_string()
                        }
                    })
                    .collect();
                filter.push_str(&format!(" ({})", rendered.join(",")));
            }
        }

        if like {
            filter.push(')');
        }
        if inverse {
            filter.push(')');
        }
        if open_or && next.is_some_and(|n| !n.or) {
            filter.push(')');
            open_or = false;
        }
    }

    if open_or {
        filter.push(')');
    }
    Ok(filter)
}

impl FilterValue {
    /// Literal form inside an expression: strings quoted, dates with a `Z`
    pub fn to_odata_string(&self) -> String {
        match self {
            FilterValue::String(s) => quote(s),
            // timezone is mandatory
            FilterValue::DateTime(date) => format!("{}Z", format_date_time(date)),
            other => other.raw_text(),
        }
    }

    /// Unquoted textual form
    pub fn raw_text(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
            FilterValue::DateTime(date) => format_date_time(date),
            FilterValue::Guid(id) => id.to_string(),
            FilterValue::Null => "null".to_string(),
        }
    }
}

impl TryFrom<&Value> for FilterValue {
    type Error = ODataError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(FilterValue::Null),
            Value::String(s) => Ok(FilterValue::String(s.clone())),
            Value::Integer(i) => Ok(FilterValue::Integer(*i)),
            Value::Decimal(d) => Ok(FilterValue::Number(*d)),
            Value::Boolean(b) => Ok(FilterValue::Boolean(*b)),
            Value::DateTime(date) => Ok(FilterValue::DateTime(*date)),
            Value::Uuid(id) => Ok(FilterValue::Guid(*id)),
            Value::Record(_) | Value::List(_) => {
                Err(ODataError::filter("filter values must be scalars"))
            }
        }
    }
}

impl From<&FilterValue> for Value {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::String(s) => Value::String(s.clone()),
            FilterValue::Number(n) => Value::Decimal(*n),
            FilterValue::Integer(i) => Value::Integer(*i),
            FilterValue::Boolean(b) => Value::Boolean(*b),
            FilterValue::DateTime(date) => Value::DateTime(*date),
            FilterValue::Guid(id) => Value::Uuid(*id),
            FilterValue::Null => Value::Null,
        }
    }
}

// Convenient From implementations for FilterValue
impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(value as i64)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::DateTime(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Guid(value)
    }
}
