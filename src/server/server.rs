//! # HTTP Server
//!
//! Serves a local pipeline over JSON so other processes (or another
//! gridquery via `HttpRemoteAdapter`) can query it.

use std::io;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::PipelineConfig;
use crate::observability::{log_event_with_fields, Event};
use crate::pipeline::{LocalSource, QueryPipeline};

use super::routes::{query_routes, AppState};

/// HTTP server for one query pipeline
pub struct QueryServer {
    addr: String,
    router: Router,
}

impl QueryServer {
    /// Server over in-memory JSON records described by `config`
    pub fn new(config: &PipelineConfig, records: Vec<Value>) -> Self {
        let source = LocalSource::new(records, config.registry(), config.searchable_fields());
        let state = AppState::new(QueryPipeline::local(source), config.parse_limits())
            .with_ignore_case(config.ignore_case);

        Self::with_state(config.socket_addr(), state, &config.cors_origins)
    }

    /// Server over an existing state, for remote or pre-built pipelines
    pub fn with_state(addr: impl Into<String>, state: AppState, cors_origins: &[String]) -> Self {
        Self {
            addr: addr.into(),
            router: build_router(state, cors_origins),
        }
    }

    pub fn socket_addr(&self) -> &str {
        &self.addr
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Binds the configured address and serves until the process ends
    pub async fn start(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.addr.as_str()).await?;
        self.serve_on(listener).await
    }

    /// Serves on an already bound listener
    pub async fn serve_on(self, listener: TcpListener) -> io::Result<()> {
        let local = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", &local)]);

        axum::serve(listener, self.router).await
    }
}

fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let router = query_routes(Arc::new(state));

    if cors_origins.is_empty() {
        return router;
    }

    let origins: Vec<HeaderValue> = cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    router.layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDecl, FieldKind};

    fn config() -> PipelineConfig {
        PipelineConfig::with_fields(vec![FieldDecl::new("name", FieldKind::Text).searchable()])
    }

    #[test]
    fn test_server_creation() {
        let server = QueryServer::new(&config(), vec![]);
        assert_eq!(server.socket_addr(), "127.0.0.1:8480");
    }

    #[test]
    fn test_router_builds_with_cors() {
        let mut config = config();
        config.cors_origins = vec!["http://localhost:5173".to_string()];

        let _router = QueryServer::new(&config, vec![]).router();
    }
}
