//! Query Executor subsystem for gridquery
//!
//! Runs a [`QueryOptions`](crate::query::QueryOptions) against an in-memory
//! record slice and produces a [`ResultPage`].
//!
//! # Execution Flow (strict order)
//!
//! 1. Free-text search
//! 2. Filter criteria (AND)
//! 3. Count survivors
//! 4. Stable sort
//! 5. Paginate
//!
//! # Invariants
//!
//! - Deterministic: the same source and options give the same page
//! - All compile errors surface before the first record is read
//! - The source is never mutated

mod executor;
mod filters;
mod pager;
mod result;
mod sorter;

pub use executor::QueryExecutor;
pub use filters::{PredicateFilter, SearchFilter};
pub use pager::{page_links, PageLink};
pub use result::ResultPage;
pub use sorter::ResultSorter;
