//! HTTP surface for gridquery
//!
//! - `GET /query?...` URL parameters, see [`parse_params`](crate::query::parse_params)
//! - `POST /query` JSON `QueryOptions`
//! - `GET /health`
//! - `GET /metrics` counter snapshot
//!
//! Errors are `{code, error}` bodies: 400 for rejected queries, 502 for data
//! source failures, 499 for cancellation.

mod errors;
mod routes;
mod server;

pub use errors::ApiError;
pub use routes::{query_routes, AppState, HealthResponse};
pub use server::QueryServer;
