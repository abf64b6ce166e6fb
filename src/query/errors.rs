//! Query error types
//!
//! Error codes:
//! - GRID_QUERY_INVALID (REJECT)
//! - GRID_UNSUPPORTED_COMPARISON (REJECT)
//! - GRID_DATA_SOURCE (ERROR)
//! - GRID_QUERY_CANCELLED (INFO)
//!
//! Every query either yields a page or exactly one of these errors.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed cause carried by data source failures
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced while building or running a query
#[derive(Debug, Error)]
pub enum QueryError {
    /// Malformed options: bad paging, unknown field, mismatched value shape
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Ordering operation on a field kind with no total order
    #[error("Unsupported comparison on field '{field}': {reason}")]
    UnsupportedComparison { field: String, reason: String },

    /// The data source (usually a remote adapter) failed
    #[error("Data source error: {message}")]
    DataSource {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The caller cancelled the query before a page was produced
    #[error("Query cancelled")]
    Cancelled,
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    /// Create an invalid query error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidQuery(reason.into())
    }

    /// Create an unsupported comparison error
    pub fn unsupported(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedComparison {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a data source error wrapping its cause
    pub fn data_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::DataSource {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a data source error without an underlying cause
    pub fn data_source_message(message: impl Into<String>) -> Self {
        Self::DataSource {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "GRID_QUERY_INVALID",
            Self::UnsupportedComparison { .. } => "GRID_UNSUPPORTED_COMPARISON",
            Self::DataSource { .. } => "GRID_DATA_SOURCE",
            Self::Cancelled => "GRID_QUERY_CANCELLED",
        }
    }

    /// Returns true if the query itself was rejected (as opposed to failing while running)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery(_) | Self::UnsupportedComparison { .. }
        )
    }

    /// Converts the error into its wire form. Rejections carry only their
    /// reason so they survive a round trip unchanged.
    pub fn to_body(&self) -> QueryErrorBody {
        let (error, field) = match self {
            Self::InvalidQuery(reason) => (reason.clone(), None),
            Self::UnsupportedComparison { field, reason } => (reason.clone(), Some(field.clone())),
            _ => (self.to_string(), None),
        };
        QueryErrorBody {
            code: self.code().to_string(),
            error,
            field,
        }
    }
}

/// JSON error body exchanged between the query server and the HTTP adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryErrorBody {
    pub code: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl QueryErrorBody {
    /// Rebuilds a typed error from a remote error body.
    ///
    /// Rejections keep their kind so a remote source reports bad queries the
    /// same way a local one does. Anything else is a data source failure.
    pub fn into_error(self) -> QueryError {
        match self.code.as_str() {
            "GRID_QUERY_INVALID" => QueryError::InvalidQuery(self.error),
            "GRID_UNSUPPORTED_COMPARISON" => QueryError::UnsupportedComparison {
                field: self.field.unwrap_or_default(),
                reason: self.error,
            },
            _ => QueryError::data_source_message(format!("{}: {}", self.code, self.error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_codes() {
        assert_eq!(QueryError::invalid("x").code(), "GRID_QUERY_INVALID");
        assert_eq!(
            QueryError::unsupported("tags", "no order").code(),
            "GRID_UNSUPPORTED_COMPARISON"
        );
        assert_eq!(
            QueryError::data_source_message("down").code(),
            "GRID_DATA_SOURCE"
        );
        assert_eq!(QueryError::Cancelled.code(), "GRID_QUERY_CANCELLED");
    }

    #[test]
    fn test_data_source_keeps_cause() {
        let cause = io::Error::new(io::ErrorKind::TimedOut, "timed out");
        let err = QueryError::data_source("fetch failed", cause);

        let source = err.source().expect("cause must be preserved");
        assert!(source.to_string().contains("timed out"));
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_rejections() {
        assert!(QueryError::invalid("page size").is_rejection());
        assert!(QueryError::unsupported("tags", "list").is_rejection());
        assert!(!QueryError::Cancelled.is_rejection());
    }

    #[test]
    fn test_body_restores_rejection_kind() {
        let body = QueryError::unsupported("tags", "list has no order").to_body();
        assert_eq!(body.field.as_deref(), Some("tags"));

        match body.into_error() {
            QueryError::UnsupportedComparison { field, reason } => {
                assert_eq!(field, "tags");
                assert_eq!(reason, "list has no order");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let body = QueryError::invalid("unknown field 'x'").to_body();
        assert_eq!(body.error, "unknown field 'x'");
        assert!(matches!(
            body.into_error(),
            QueryError::InvalidQuery(reason) if reason == "unknown field 'x'"
        ));

        let body = QueryError::data_source_message("upstream down").to_body();
        assert!(matches!(body.into_error(), QueryError::DataSource { .. }));
    }
}
