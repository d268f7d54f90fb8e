//! Page fetching
//!
//! The engine only ever sees successfully fetched pages. This module defines
//! the [`Fetcher`] seam the crawl driver fetches through, and an HTTP
//! implementation of it:
//! - Building HTTP clients from the rule set's fetch policy
//! - GET requests following redirects (the final URL is reported)
//! - Error classification (network, status, content type)
//!
//! Fetch errors are never retried here; retry policy belongs to the caller.

use crate::config::FetchPolicy;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Unexpected content type '{content_type}' for {url}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Fetch failed for {url}: {message}")]
    Other { url: String, message: String },
}

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// Final URL after redirects; links on the page resolve against it
    pub url: Url,

    /// Raw markup
    pub body: String,
}

/// Capability to fetch one URL
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<PageContent, FetchError>> + Send;
}

/// Builds an HTTP client honoring the fetch policy's user agent
///
/// # Example
///
/// ```no_run
/// use quarry::config::FetchPolicy;
/// use quarry::crawler::build_http_client;
///
/// let client = build_http_client(&FetchPolicy::default()).unwrap();
/// ```
pub fn build_http_client(policy: &FetchPolicy) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(policy.user_agent.as_str())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(FetchError::Client)
}

/// [`Fetcher`] over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(policy: &FetchPolicy) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(policy)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    /// Fetches a URL with error classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx, HTML or no content type | `Ok(PageContent)` |
    /// | 2xx, other content type | `ContentMismatch` |
    /// | non-2xx status | `Status` |
    /// | connect / timeout / body error | `Http` |
    async fn fetch(&self, url: &Url) -> Result<PageContent, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !is_markup(&content_type) {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(PageContent {
            url: final_url,
            body,
        })
    }
}

/// Content types the extractor can parse; a missing header is accepted
fn is_markup(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
        || content_type.contains("text/xml")
        || content_type.contains("application/xml")
}
