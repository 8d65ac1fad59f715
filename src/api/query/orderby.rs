//! OData `$orderby` building
//!
//! Ordering arrives as a list of free-form items (`"name desc"`); each item
//! is URL-encoded on its own and the encoded items are joined with `,`.

use crate::api::schema::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    Asc(String),
    Desc(String),
    /// Verbatim item, e.g. a path expression
    Raw(String),
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self::Asc(field.into())
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::Desc(field.into())
    }

    pub fn to_odata_string(&self) -> String {
        match self {
            OrderBy::Asc(field) => format!("{} asc", field),
            OrderBy::Desc(field) => format!("{} desc", field),
            OrderBy::Raw(item) => item.clone(),
        }
    }
}

impl From<&str> for OrderBy {
    fn from(item: &str) -> Self {
        OrderBy::Raw(item.to_string())
    }
}

/// Ordered list of orderby items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderByClause {
    clauses: Vec<OrderBy>,
}

impl OrderByClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, order: impl Into<OrderBy>) -> Self {
        self.clauses.push(order.into());
        self
    }

    /// Items of an `orderBy` input value: a list of strings or a single one
    pub fn from_value(value: &Value) -> Self {
        let clauses = value
            .flatten()
            .into_iter()
            .filter_map(Value::scalar_string)
            .filter(|item| !item.is_empty())
            .map(OrderBy::Raw)
            .collect();
        Self { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Value of the `$orderby` query option, already encoded
    pub fn to_query_value(&self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            let encoded: Vec<String> = self
                .clauses
                .iter()
                .map(|o| urlencoding::encode(&o.to_odata_string()).into_owned())
                .collect();
            Some(encoded.join(","))
        }
    }
}
