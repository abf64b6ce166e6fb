//! Query endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::executor::ResultPage;
use crate::observability::{log_event_with_fields, Event, MetricsSnapshot};
use crate::pipeline::QueryPipeline;
use crate::query::{parse_params, ParseLimits, QueryError, QueryOptions};
use crate::remote::CancelSignal;

use super::errors::ApiError;

/// State shared by the query handlers
#[derive(Debug)]
pub struct AppState {
    pub pipeline: QueryPipeline<Value>,
    pub limits: ParseLimits,
    /// Applied to GET queries that do not pass `ignore_case`
    pub ignore_case: bool,
}

impl AppState {
    pub fn new(pipeline: QueryPipeline<Value>, limits: ParseLimits) -> Self {
        Self {
            pipeline,
            limits,
            ignore_case: false,
        }
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Records and logs a query rejected before reaching the pipeline
    fn reject(&self, err: QueryError) -> ApiError {
        self.pipeline.metrics().increment_rejected();
        log_event_with_fields(
            Event::QueryRejected,
            &[("source", "http"), ("code", err.code()), ("reason", &err.to_string())],
        );
        ApiError(err)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
}

/// Create the query routes
pub fn query_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", get(query_get_handler).post(query_post_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// GET /query?page=..&size=..&sort=..&search=..&field=op.value
async fn query_get_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ResultPage<Value>>, ApiError> {
    let mut options = parse_params(&params, &state.limits).map_err(|e| state.reject(e))?;
    if !params.iter().any(|(key, _)| key == "ignore_case") {
        options.ignore_case = state.ignore_case;
    }

    run(&state, &options).await
}

/// POST /query with a JSON `QueryOptions` body
async fn query_post_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryOptions>, JsonRejection>,
) -> Result<Json<ResultPage<Value>>, ApiError> {
    let Json(options) =
        payload.map_err(|rejection| state.reject(QueryError::invalid(rejection.body_text())))?;
    state.limits.check(&options).map_err(|e| state.reject(e))?;

    run(&state, &options).await
}

async fn run(state: &AppState, options: &QueryOptions) -> Result<Json<ResultPage<Value>>, ApiError> {
    let page = state.pipeline.query(options, &CancelSignal::never()).await?;
    Ok(Json(page))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        remote: state.pipeline.is_remote(),
        records: state.pipeline.record_count(),
    };

    (StatusCode::OK, Json(response))
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.pipeline.metrics().snapshot())
}
