//! gridquery - paging, sorting, filtering and free-text search over record
//! sets, evaluated in memory or forwarded to a remote source
//!
//! ```ignore
//! use gridquery::field::{FieldKind, FieldRegistry, FieldValue};
//! use gridquery::pipeline::{LocalSource, QueryPipeline};
//! use gridquery::query::{QueryOptions, SortSpec};
//!
//! let registry = FieldRegistry::new()
//!     .field("name", FieldKind::Text, |f: &Fruit| FieldValue::from(&f.name));
//! let pipeline = QueryPipeline::local(LocalSource::new(fruits, registry, ["name"]));
//!
//! let page = pipeline.execute_local(&QueryOptions::new(0, 2).sort_by(SortSpec::asc("name")))?;
//! ```

pub mod cli;
pub mod config;
pub mod executor;
pub mod field;
pub mod observability;
pub mod pipeline;
pub mod query;
pub mod remote;
pub mod server;
