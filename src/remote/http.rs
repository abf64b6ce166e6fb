//! HTTP remote adapter
//!
//! POSTs `QueryOptions` as JSON to `{base}/query` and decodes a `ResultPage`.
//! Error bodies from a gridquery server are mapped back to typed errors.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::executor::ResultPage;
use crate::query::{QueryError, QueryErrorBody, QueryOptions, QueryResult};

use super::adapter::RemoteAdapter;

/// Remote adapter backed by a JSON query endpoint
pub struct HttpRemoteAdapter<T> {
    client: reqwest::Client,
    endpoint: String,
    _records: PhantomData<fn() -> T>,
}

impl<T> HttpRemoteAdapter<T> {
    /// Creates an adapter for the server at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> QueryResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueryError::data_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: format!("{}/query", base_url.trim_end_matches('/')),
            _records: PhantomData,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl<T> RemoteAdapter<T> for HttpRemoteAdapter<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, options: &QueryOptions) -> QueryResult<ResultPage<T>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(options)
            .send()
            .await
            .map_err(|e| QueryError::data_source(format!("request to {} failed", self.endpoint), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(|e| {
                QueryError::data_source(format!("failed to read error body from {}", self.endpoint), e)
            })?;

            return Err(match serde_json::from_slice::<QueryErrorBody>(&body) {
                Ok(remote) => remote.into_error(),
                Err(_) => QueryError::data_source_message(format!(
                    "{} returned HTTP {}",
                    self.endpoint, status
                )),
            });
        }

        response
            .json::<ResultPage<T>>()
            .await
            .map_err(|e| QueryError::data_source(format!("invalid result page from {}", self.endpoint), e))
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
