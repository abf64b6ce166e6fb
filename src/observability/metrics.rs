//! Query metrics
//!
//! - Counters only, monotonic
//! - Reset only when the pipeline is created
//! - Thread-safe without locks

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one pipeline.
///
/// Relaxed ordering throughout; snapshots are not a consistent cut.
#[derive(Debug, Default)]
pub struct QueryMetrics {
    queries_executed: AtomicU64,
    queries_rejected: AtomicU64,
    remote_fetches: AtomicU64,
    remote_failures: AtomicU64,
    queries_superseded: AtomicU64,
    queries_cancelled: AtomicU64,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_remote_fetches(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_remote_failures(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_superseded(&self) {
        self.queries_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cancelled(&self) {
        self.queries_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            queries_superseded: self.queries_superseded.load(Ordering::Relaxed),
            queries_cancelled: self.queries_cancelled.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub remote_fetches: u64,
    pub remote_failures: u64,
    pub queries_superseded: u64,
    pub queries_cancelled: u64,
}
