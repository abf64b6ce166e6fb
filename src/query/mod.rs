//! Query description for gridquery
//!
//! A query is a [`QueryOptions`] value: page index and size, an ordered list
//! of sort keys, filter criteria (AND) and a free-text search string. Options
//! are built by the caller, either directly or from URL parameters via
//! [`parse_params`], and are never mutated by the pipeline.
//!
//! # Invariants
//!
//! - page size > 0, checked before any data is touched
//! - the first sort spec is the primary key, later specs break ties

mod errors;
mod options;
mod parser;

pub use errors::{BoxError, QueryError, QueryErrorBody, QueryResult};
pub use options::{
    FilterCriterion, FilterOperator, FilterValue, QueryOptions, SortDirection, SortSpec,
    DEFAULT_PAGE_SIZE,
};
pub use parser::{parse_params, ParseLimits, MAX_PAGE_SIZE};
