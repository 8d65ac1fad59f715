//! OData query construction
//!
//! Filter compilation, query options and request targets, plus a fluent
//! builder for the input records that carry them.

pub mod builder;
pub mod filters;
pub mod options;
pub mod orderby;
pub mod target;

pub use builder::InputBuilder;
pub use filters::{FilterClause, FilterValue, build_filter};
pub use options::QueryOptions;
pub use orderby::{OrderBy, OrderByClause};
pub use target::{AssociationTarget, TargetBuilder, path_parameters};
