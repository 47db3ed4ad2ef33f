//! In-memory `Fetcher` for unit tests

use crate::crawler::{FetchError, FetchedPage, Fetcher};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

/// Serves fixed bodies and records every request it sees
///
/// Unknown URLs answer with a 404 status error.
#[derive(Debug, Default)]
pub(crate) struct StaticFetcher {
    pages: HashMap<String, String>,
    failures: HashSet<String>,
    panics: HashSet<String>,
    delay: Option<Duration>,
    events: Mutex<Vec<String>>,
    fetches: Mutex<HashMap<String, usize>>,
    probes: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Makes `url` fail with a network error
    pub(crate) fn with_failure(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    /// Makes the task fetching `url` panic
    pub(crate) fn with_panic(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub(crate) fn probe_count(&self, url: &str) -> usize {
        self.probes.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// `start:<url>` and `done:<url>` markers in the order they happened
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        *self.fetches.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        self.record(format!("start:{}", url));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.panics.contains(url) {
            panic!("fetcher exploded on {}", url);
        }

        let result = if self.failures.contains(url) {
            Err(FetchError::Network {
                url: url.to_string(),
                message: "Connection refused".to_string(),
            })
        } else {
            match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    final_url: url.to_string(),
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    body: body.as_bytes().to_vec(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        };

        self.record(format!("done:{}", url));
        result
    }

    async fn probe(&self, url: &str) -> bool {
        *self.probes.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        self.pages.contains_key(url)
    }
}
