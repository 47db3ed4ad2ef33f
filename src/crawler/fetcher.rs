//! HTTP fetcher implementation
//!
//! This module handles all network access of the crawler:
//! - The `Fetcher` trait that the page state machine talks to
//! - A reqwest-backed implementation with a proper user agent string
//! - HEAD probing (with a GET fallback) used to check for a robots.txt
//! - Error classification into network errors, timeouts and HTTP statuses

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors of the main page fetch
///
/// Any of these is terminal for the page that was being fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Raw content of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,

    /// Content-Type header value, if any
    pub content_type: Option<String>,

    /// Response body bytes
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// Charset announced in the Content-Type header
    pub fn charset(&self) -> Option<&str> {
        self.content_type.as_deref().and_then(|ct| {
            ct.split(';')
                .map(str::trim)
                .find_map(|param| param.strip_prefix("charset="))
                .map(|cs| cs.trim_matches('"'))
        })
    }
}

/// Source of page content
///
/// The crawl engine only ever talks to this trait, so tests and alternative
/// transports can be plugged into a session.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads the resource at `url`
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Checks that the resource at `url` exists
    async fn probe(&self, url: &str) -> bool {
        self.fetch(url).await.is_ok()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `timeout` - Fixed request timeout
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.fetch_timeout())?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            final_url,
            content_type,
            body: body.to_vec(),
        })
    }

    /// Sends HEAD first; servers that refuse HEAD are checked with GET
    async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response)
                if matches!(
                    response.status(),
                    StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
                ) =>
            {
                tracing::debug!("HEAD not supported for {}, probing with GET", url);
                self.fetch(url).await.is_ok()
            }
            Ok(_) => false,
            Err(e) => {
                tracing::debug!("HEAD probe failed for {}: {}", url, e);
                false
            }
        }
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
