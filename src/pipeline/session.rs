//! Query sessions
//!
//! A session issues queries for one consumer (a grid, an autocomplete box)
//! and applies last-write-wins: every query gets a sequence number and only
//! the newest may deliver a page. Older results, including errors, are
//! dropped and reported as superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::executor::ResultPage;
use crate::observability::{log_event_with_fields, Event};
use crate::query::{QueryError, QueryOptions, QueryResult};
use crate::remote::CancelSignal;

use super::pipeline::QueryPipeline;

/// What a session query delivered
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    /// The newest query's page
    Current(ResultPage<T>),
    /// A newer query was issued first; the result was discarded
    Superseded { sequence: u64 },
    /// The caller cancelled the query
    Cancelled,
}

impl<T> QueryOutcome<T> {
    pub fn is_current(&self) -> bool {
        matches!(self, QueryOutcome::Current(_))
    }

    pub fn into_page(self) -> Option<ResultPage<T>> {
        match self {
            QueryOutcome::Current(page) => Some(page),
            _ => None,
        }
    }
}

/// Sequences queries against a shared pipeline
#[derive(Debug)]
pub struct QuerySession<T> {
    pipeline: Arc<QueryPipeline<T>>,
    sequence: AtomicU64,
}

impl<T> QuerySession<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(pipeline: Arc<QueryPipeline<T>>) -> Self {
        Self {
            pipeline,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn pipeline(&self) -> &Arc<QueryPipeline<T>> {
        &self.pipeline
    }

    /// Claims the next sequence number, making every earlier one stale
    pub fn issue(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Newest issued sequence number, 0 before the first query
    pub fn latest(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        self.latest() == sequence
    }

    /// Runs a query now
    pub async fn run(
        &self,
        options: &QueryOptions,
        cancel: &CancelSignal,
    ) -> QueryResult<QueryOutcome<T>> {
        let sequence = self.issue();
        let result = self.pipeline.query(options, cancel).await;
        self.settle(sequence, result)
    }

    /// Waits `delay`, then runs the query unless a newer one was issued or
    /// the caller cancelled in the meantime. No fetch happens in either case.
    pub async fn run_debounced(
        &self,
        options: &QueryOptions,
        delay: Duration,
        cancel: &CancelSignal,
    ) -> QueryResult<QueryOutcome<T>> {
        let sequence = self.issue();

        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(delay) => false,
        };

        if cancelled {
            self.pipeline.metrics().increment_cancelled();
            log_event_with_fields(Event::QueryCancelled, &[("stage", "debounce")]);
            return Ok(QueryOutcome::Cancelled);
        }
        if !self.is_current(sequence) {
            return Ok(self.superseded(sequence));
        }

        let result = self.pipeline.query(options, cancel).await;
        self.settle(sequence, result)
    }

    fn settle(
        &self,
        sequence: u64,
        result: QueryResult<ResultPage<T>>,
    ) -> QueryResult<QueryOutcome<T>> {
        match result {
            Err(QueryError::Cancelled) => Ok(QueryOutcome::Cancelled),
            _ if !self.is_current(sequence) => Ok(self.superseded(sequence)),
            Ok(page) => Ok(QueryOutcome::Current(page)),
            Err(err) => Err(err),
        }
    }

    fn superseded(&self, sequence: u64) -> QueryOutcome<T> {
        self.pipeline.metrics().increment_superseded();
        log_event_with_fields(
            Event::QuerySuperseded,
            &[
                ("sequence", &sequence.to_string()),
                ("latest", &self.latest().to_string()),
            ],
        );
        QueryOutcome::Superseded { sequence }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FieldRegistry, FieldValue};
    use crate::pipeline::LocalSource;
    use crate::remote::cancellation;

    fn session() -> QuerySession<i64> {
        let registry =
            FieldRegistry::new().field("n", FieldKind::Int, |n: &i64| FieldValue::from(*n));
        let pipeline = QueryPipeline::local(LocalSource::new(vec![1, 2, 3], registry, ["n"]));
        QuerySession::new(Arc::new(pipeline))
    }

    #[test]
    fn test_sequence_numbers() {
        let session = session();
        assert_eq!(session.latest(), 0);

        let first = session.issue();
        let second = session.issue();
        assert!(second > first);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[tokio::test]
    async fn test_run_is_current() {
        let session = session();
        let outcome = session
            .run(&QueryOptions::default(), &CancelSignal::never())
            .await
            .unwrap();

        assert_eq!(outcome.into_page().unwrap().total_count, 3);
    }

    #[tokio::test]
    async fn test_debounce_skips_when_newer_issued() {
        let session = Arc::new(session());

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                session
                    .run_debounced(
                        &QueryOptions::default(),
                        Duration::from_millis(50),
                        &CancelSignal::never(),
                    )
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        session.issue();

        let outcome = slow.await.unwrap().unwrap();
        assert!(matches!(outcome, QueryOutcome::Superseded { sequence: 1 }));
        assert_eq!(session.pipeline().metrics().snapshot().queries_executed, 0);
    }

    #[tokio::test]
    async fn test_debounce_cancel() {
        let session = session();
        let (handle, signal) = cancellation();
        handle.cancel();

        let outcome = session
            .run_debounced(&QueryOptions::default(), Duration::from_secs(5), &signal)
            .await
            .unwrap();

        assert_eq!(outcome, QueryOutcome::Cancelled);
        assert_eq!(session.pipeline().metrics().snapshot().queries_cancelled, 1);
    }

    #[tokio::test]
    async fn test_stale_error_is_superseded() {
        let session = session();
        let stale = session.issue();
        session.issue();

        let outcome = session
            .settle(stale, Err(QueryError::invalid("bad")))
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Superseded { sequence: stale });
    }
}
