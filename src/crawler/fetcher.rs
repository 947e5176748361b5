//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester:
//! - Building an HTTP client with the configured user agent and timeouts
//! - GET requests for the index and detail pages
//! - Error classification (non-success status vs. unreachable source)
//!
//! Requests are never retried; a failure is reported to the caller as is.

use crate::config::{FetchConfig, UserAgentConfig};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Source of raw documents keyed by URL
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the body of `url`
    ///
    /// # Errors
    ///
    /// * `HarvestError::Transport` - the source answered with a non-success status
    /// * `HarvestError::Http` - the source could not be reached or the body
    ///   could not be read
    async fn fetch(&self, url: &str) -> Result<String, HarvestError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `fetch` - Client timeouts
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use dex_harvest::config::{FetchConfig, UserAgentConfig};
/// use dex_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches documents over HTTP(S) with a shared client
///
/// The client carries the session settings (user agent, timeouts); there is
/// no process-wide session.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        fetch: &FetchConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, fetch)?))
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, HarvestError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            // Classify error for the log; all of them abort the batch
            if e.is_timeout() {
                tracing::debug!("Request timeout for {}", url);
            } else if e.is_connect() {
                tracing::debug!("Connection refused for {}", url);
            }
            HarvestError::Http {
                url: url.to_string(),
                source: e,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::Transport {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.text().await.map_err(|e| HarvestError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}
