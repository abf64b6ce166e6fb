//! Observable events
//!
//! Events are explicit and typed; each carries a fixed severity.

use std::fmt;

use super::logger::Severity;

/// Observable events in gridquery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// HTTP server bound and accepting
    ServerListening,
    /// A query produced a page
    QueryExecuted,
    /// Options, filters or sort keys were rejected
    QueryRejected,
    /// A remote adapter failed
    RemoteFetchFailed,
    /// A result arrived after a newer query was issued and was dropped
    QuerySuperseded,
    /// The caller cancelled an in-flight query
    QueryCancelled,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ServerListening => "SERVER_LISTENING",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::RemoteFetchFailed => "REMOTE_FETCH_FAILED",
            Event::QuerySuperseded => "QUERY_SUPERSEDED",
            Event::QueryCancelled => "QUERY_CANCELLED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryExecuted | Event::QuerySuperseded => Severity::Trace,
            Event::ConfigLoaded | Event::ServerListening | Event::QueryCancelled => Severity::Info,
            Event::QueryRejected => Severity::Warn,
            Event::RemoteFetchFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
