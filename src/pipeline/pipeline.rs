//! Query pipeline
//!
//! One entry point for local and remote sources. Callers get a
//! `ResultPage` either way.

use std::sync::Arc;

use crate::executor::{QueryExecutor, ResultPage};
use crate::observability::{log_event_with_fields, Event, QueryMetrics};
use crate::query::{QueryError, QueryOptions, QueryResult};
use crate::remote::{CancelSignal, RemoteAdapter};

use super::source::{DataSource, LocalSource};

/// Runs queries against a configured data source
#[derive(Debug)]
pub struct QueryPipeline<T> {
    source: DataSource<T>,
    metrics: Arc<QueryMetrics>,
}

impl<T> QueryPipeline<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Pipeline over an in-memory source
    pub fn local(source: LocalSource<T>) -> Self {
        Self {
            source: DataSource::Local(source),
            metrics: Arc::new(QueryMetrics::new()),
        }
    }

    /// Pipeline that forwards queries to a remote adapter
    pub fn remote(adapter: Arc<dyn RemoteAdapter<T>>) -> Self {
        Self {
            source: DataSource::Remote(adapter),
            metrics: Arc::new(QueryMetrics::new()),
        }
    }

    /// Shares a metrics registry with other components
    pub fn with_metrics(mut self, metrics: Arc<QueryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<QueryMetrics> {
        &self.metrics
    }

    pub fn is_remote(&self) -> bool {
        self.source.is_remote()
    }

    /// Records held locally, `None` for a remote source
    pub fn record_count(&self) -> Option<usize> {
        match &self.source {
            DataSource::Local(local) => Some(local.records().len()),
            DataSource::Remote(_) => None,
        }
    }

    /// Runs a query synchronously against a local source
    pub fn execute_local(&self, options: &QueryOptions) -> QueryResult<ResultPage<T>> {
        // Misuse on a remote pipeline, not a query outcome; left out of metrics
        let DataSource::Local(local) = &self.source else {
            return Err(QueryError::data_source_message(
                "synchronous execution needs a local source",
            ));
        };

        let result = run_local(local, options);
        self.observe(&result, "local");
        result
    }

    /// Runs a query against the configured source.
    ///
    /// Options are validated before any data is touched. For a remote source
    /// the fetch races `cancel`; a cancelled fetch returns
    /// `QueryError::Cancelled` and never a page.
    pub async fn query(
        &self,
        options: &QueryOptions,
        cancel: &CancelSignal,
    ) -> QueryResult<ResultPage<T>> {
        match &self.source {
            DataSource::Local(local) => {
                let result = if cancel.is_cancelled() {
                    Err(QueryError::Cancelled)
                } else {
                    run_local(local, options)
                };
                self.observe(&result, "local");
                result
            }
            DataSource::Remote(adapter) => {
                let target = adapter.describe();
                let result = self.fetch_remote(adapter.as_ref(), options, cancel).await;
                self.observe(&result, &target);
                result
            }
        }
    }

    async fn fetch_remote(
        &self,
        adapter: &dyn RemoteAdapter<T>,
        options: &QueryOptions,
        cancel: &CancelSignal,
    ) -> QueryResult<ResultPage<T>> {
        options.validate()?;
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }

        self.metrics.increment_remote_fetches();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueryError::Cancelled),
            result = adapter.fetch_page(options) => result,
        }
    }

    fn observe(&self, result: &QueryResult<ResultPage<T>>, source: &str) {
        match result {
            Ok(page) => {
                self.metrics.increment_executed();
                log_event_with_fields(
                    Event::QueryExecuted,
                    &[
                        ("source", source),
                        ("items", &page.len().to_string()),
                        ("total_count", &page.total_count.to_string()),
                        ("page_index", &page.page_index.to_string()),
                    ],
                );
            }
            Err(QueryError::Cancelled) => {
                self.metrics.increment_cancelled();
                log_event_with_fields(Event::QueryCancelled, &[("source", source)]);
            }
            Err(err) if err.is_rejection() => {
                self.metrics.increment_rejected();
                log_event_with_fields(
                    Event::QueryRejected,
                    &[("source", source), ("code", err.code()), ("reason", &err.to_string())],
                );
            }
            Err(err) => {
                self.metrics.increment_remote_failures();
                log_event_with_fields(
                    Event::RemoteFetchFailed,
                    &[("source", source), ("code", err.code()), ("error", &err.to_string())],
                );
            }
        }
    }
}

fn run_local<T: Clone>(local: &LocalSource<T>, options: &QueryOptions) -> QueryResult<ResultPage<T>> {
    QueryExecutor::new(local.registry()).execute(local.records(), options, local.searchable())
}
