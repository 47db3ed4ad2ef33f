//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` seam and its reqwest implementation
//! - HTML decoding, parsing and link extraction
//! - The per-page fetch/parse state machine and the page registry
//! - Layer-synchronous frontier scheduling over a bounded task pool

mod fetcher;
mod page;
mod parser;
mod registry;
mod scheduler;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, HttpFetcher};
pub use page::Page;
pub use parser::{body_text, decode_body, parse_html, ParsedPage};
pub use registry::PageRegistry;
pub use scheduler::{visit_one, CrawlReport, CrawlScheduler};
pub use session::{canonical_root, CrawlSession};

use crate::config::{validate, Config};
use crate::SiteGraphError;
use std::sync::Arc;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client from the user agent settings
/// 3. Open a fresh session rooted at `root_url`
/// 4. Process the root page
/// 5. Expand the frontier layer by layer until it is empty
///
/// # Arguments
///
/// * `root_url` - Absolute http(s) URL the crawl starts from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished; the report holds the root page
/// * `Err(SiteGraphError)` - The configuration, root URL or HTTP client was unusable
pub async fn crawl(root_url: &str, config: &Config) -> Result<CrawlReport, SiteGraphError> {
    validate(config)?;
    let fetcher = HttpFetcher::new(&config.crawler, &config.user_agent)?;
    let session = CrawlSession::new(root_url, config.crawler.clone(), Arc::new(fetcher))?;

    let scheduler = CrawlScheduler::start(Arc::new(session)).await;
    Ok(scheduler.run().await)
}
