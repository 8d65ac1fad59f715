//! Query option serialization
//!
//! Logical options are read from the well-known fields of an input record and
//! rendered in a fixed order: `$top`, `$skip`, `$count`, `$search`,
//! `$orderby`, `$filter`, `$expand`.

use super::filters::{FilterClause, build_filter, clauses_from_value};
use super::orderby::OrderByClause;
use crate::api::constants::{fields, options};
use crate::api::error::{ODataError, Result};
use crate::api::schema::{ComplexType, Record, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub total_count: Option<bool>,
    pub search: Option<String>,
    pub order_by: OrderByClause,
    /// Explicit filter expression, wins over `filters`
    pub filter: Option<String>,
    pub filters: Vec<FilterClause>,
    /// Navigation properties to expand (GET only)
    pub expand: Vec<String>,
}

fn integer_option(input: &Record, name: &str) -> Result<Option<i64>> {
    input
        .value(name)
        .map(|value| {
            value
                .as_i64()
                .ok_or_else(|| ODataError::schema(format!("'{}' must be an integer", name)))
        })
        .transpose()
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the logical options of an input record
    pub fn from_input(input: Option<&Record>) -> Result<Self> {
        let Some(input) = input else {
            return Ok(Self::default());
        };

        let total_count = input
            .value(fields::TOTAL_COUNT)
            .map(|value| {
                value.as_bool().ok_or_else(|| {
                    ODataError::schema(format!("'{}' must be a boolean", fields::TOTAL_COUNT))
                })
            })
            .transpose()?;

        Ok(Self {
            limit: integer_option(input, fields::LIMIT)?,
            offset: integer_option(input, fields::OFFSET)?,
            total_count,
            search: input.value(fields::SEARCH).and_then(Value::scalar_string),
            order_by: input
                .value(fields::ORDER_BY)
                .map(OrderByClause::from_value)
                .unwrap_or_default(),
            filter: input.value(fields::FILTER).and_then(Value::scalar_string),
            filters: input
                .value(fields::FILTERS)
                .map(clauses_from_value)
                .transpose()?
                .unwrap_or_default(),
            expand: Vec::new(),
        })
    }

    /// Collect the expand targets declared on output fields
    pub fn expand_from(mut self, output: &ComplexType) -> Self {
        self.expand = output
            .fields
            .iter()
            .filter_map(|f| f.expand.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// The `$filter` expression that applies, if any
    pub fn filter_expression(&self) -> Result<Option<String>> {
        let filter = match &self.filter {
            Some(filter) => filter.clone(),
            None if !self.filters.is_empty() => build_filter(&self.filters)?,
            None => return Ok(None),
        };
        if filter.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(filter))
        }
    }

    /// `?a=b&c=d`, or an empty string when no option applies
    pub fn to_query_string(&self) -> Result<String> {
        let mut params = Vec::new();

        if let Some(limit) = self.limit {
            params.push(format!("{}={}", options::TOP, limit));
        }
        if let Some(offset) = self.offset {
            params.push(format!("{}={}", options::SKIP, offset));
        }
        if let Some(total_count) = self.total_count {
            params.push(format!("{}={}", options::COUNT, total_count));
        }
        if let Some(search) = &self.search {
            params.push(format!("{}={}", options::SEARCH, urlencoding::encode(search)));
        }
        if let Some(order_by) = self.order_by.to_query_value() {
            params.push(format!("{}={}", options::ORDERBY, order_by));
        }
        if let Some(filter) = self.filter_expression()? {
            params.push(format!("{}={}", options::FILTER, urlencoding::encode(&filter)));
        }
        if !self.expand.is_empty() {
            params.push(format!(
                "{}={}",
                options::EXPAND,
                urlencoding::encode(&self.expand.join(","))
            ));
        }

        if params.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("?{}", params.join("&")))
        }
    }
}
