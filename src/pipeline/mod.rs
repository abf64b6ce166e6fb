//! Query pipeline for gridquery
//!
//! Wires a data source (in-memory or remote) to the executor, metrics and
//! logging. [`QuerySession`] layers last-write-wins ordering and debounce on
//! top for consumers that fire queries faster than results arrive.
//!
//! # Invariants
//!
//! - A remote page is passed through untouched
//! - A stale or cancelled query never delivers a page

mod pipeline;
mod session;
mod source;

pub use pipeline::QueryPipeline;
pub use session::{QueryOutcome, QuerySession};
pub use source::{DataSource, LocalSource};
