//! Remote adapter seam
//!
//! A remote source runs search, filtering, sorting and pagination itself.
//! The pipeline only validates the options, forwards them and passes the
//! page through.

use async_trait::async_trait;

use crate::executor::ResultPage;
use crate::query::{QueryOptions, QueryResult};

/// A data source that evaluates queries out of process
#[async_trait]
pub trait RemoteAdapter<T>: Send + Sync {
    /// Fetches one page for `options`.
    ///
    /// Failures are reported as `QueryError::DataSource` wrapping the cause,
    /// except rejections the remote side reports for the query itself.
    async fn fetch_page(&self, options: &QueryOptions) -> QueryResult<ResultPage<T>>;

    /// Short description used in logs
    fn describe(&self) -> String {
        "remote".to_string()
    }
}
