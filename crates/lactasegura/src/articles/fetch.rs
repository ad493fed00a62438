//! Remote article fetching and connectivity probing.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Article;

/// Source of remote article lists.
///
/// The production implementation is [`HttpFetcher`]; tests substitute stubs.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Fetch the article list from the given URL.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-200 response, or a
    /// payload that is not a JSON array of articles.
    async fn fetch(&self, url: &str) -> Result<Vec<Article>>;
}

/// HTTP article fetcher with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<Article>> {
        debug!("fetching articles from {url}");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let payload: serde_json::Value = response.json().await?;

        if !payload.is_array() {
            return Err(Error::fetch_payload("expected a JSON array of articles"));
        }
        serde_json::from_value(payload).map_err(|err| Error::fetch_payload(err.to_string()))
    }
}

/// Probe network reachability with a short-timeout TCP connect.
///
/// Classifies the host as online or offline; never errors.
pub async fn probe_connectivity(host: &str, port: u16, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect((host, port))).await,
        Ok(Ok(_))
    )
}
