//! Observability subsystem for gridquery
//!
//! - Structured logging (JSON lines on stderr)
//! - Per-pipeline counters
//! - Typed lifecycle events
//!
//! Observability is read-only: it never changes a query's outcome.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, QueryMetrics};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // no panic regardless of the minimum severity
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::QueryRejected, &[("reason", "unknown field")]);
    }
}
