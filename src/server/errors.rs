//! HTTP error mapping
//!
//! Query errors leave the server as `{code, error}` JSON bodies that
//! `HttpRemoteAdapter` turns back into typed errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::query::QueryError;

/// Non-standard status used by proxies for a client-closed request
const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Query error as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub QueryError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            QueryError::InvalidQuery(_) | QueryError::UnsupportedComparison { .. } => {
                StatusCode::BAD_REQUEST
            }
            QueryError::DataSource { .. } => StatusCode::BAD_GATEWAY,
            QueryError::Cancelled => {
                StatusCode::from_u16(CLIENT_CLOSED_REQUEST).unwrap_or(StatusCode::BAD_REQUEST)
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.0.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError(QueryError::invalid("bad")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(QueryError::unsupported("tags", "list")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(QueryError::data_source_message("down")).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(ApiError(QueryError::Cancelled).status_code().as_u16(), 499);
    }

    #[test]
    fn test_response_status() {
        let response = ApiError(QueryError::invalid("bad")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
