//! InputBuilder for fluent input record construction
//!
//! Builds the input record of a function call: query options, filter
//! clauses, path template values, keys and the entity body.

use super::filters::FilterClause;
use super::orderby::OrderBy;
use crate::api::client::{CallContext, ODataClient};
use crate::api::constants::fields;
use crate::api::error::Result;
use crate::api::operations::Function;
use crate::api::schema::{Record, Value};

#[derive(Debug, Clone, Default)]
pub struct InputBuilder {
    record: Record,
    filters: Vec<Value>,
    order_by: Vec<Value>,
    path: Record,
}

impl InputBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set any top-level field, e.g. a primary key
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.record.set(name, value);
        self
    }

    /// Set the entity body under the name of the input's complex field
    pub fn body(self, name: &str, body: Record) -> Self {
        self.field(name, body)
    }

    /// Add filter condition
    pub fn filter(mut self, clause: FilterClause) -> Self {
        self.filters.push(Value::from(clause.to_record()));
        self
    }

    /// Explicit `$filter` expression, overrides the clauses
    pub fn raw_filter(self, expression: impl Into<String>) -> Self {
        self.field(fields::FILTER, expression.into())
    }

    /// Add ordering
    pub fn orderby(mut self, order: OrderBy) -> Self {
        self.order_by.push(Value::from(order.to_odata_string()));
        self
    }

    /// Limit number of results
    pub fn top(self, top: i64) -> Self {
        self.field(fields::LIMIT, top)
    }

    pub fn skip(self, skip: i64) -> Self {
        self.field(fields::OFFSET, skip)
    }

    /// Include count in response
    pub fn count(self) -> Self {
        self.field(fields::TOTAL_COUNT, true)
    }

    pub fn search(self, search: impl Into<String>) -> Self {
        self.field(fields::SEARCH, search.into())
    }

    /// Value for a `{name}` endpoint path parameter
    pub fn path_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path.set(name, value.into());
        self
    }

    pub fn transaction(self, transaction_id: impl Into<String>) -> Self {
        self.field(fields::TRANSACTION_ID, transaction_id.into())
    }

    /// Build the final input record (reusable)
    pub fn build(self) -> Record {
        let mut record = self.record;
        if !self.filters.is_empty() {
            record.set(fields::FILTERS, self.filters);
        }
        if !self.order_by.is_empty() {
            record.set(fields::ORDER_BY, self.order_by);
        }
        if !self.path.is_empty() {
            record.set(fields::PATH, self.path);
        }
        record
    }

    /// Build and execute immediately
    pub async fn execute(
        self,
        client: &ODataClient,
        function: &Function,
        context: &CallContext,
    ) -> Result<Option<Record>> {
        let input = self.build();
        client.run(function, Some(&input), context).await
    }
}

// Convenience methods for common patterns
impl InputBuilder {
    /// Select all active records (statecode = 0)
    pub fn active_only(self) -> Self {
        self.filter(FilterClause::eq("statecode", 0))
    }

    /// Order by creation date (newest first)
    pub fn newest_first(self) -> Self {
        self.orderby(OrderBy::desc("createdon"))
    }
}
