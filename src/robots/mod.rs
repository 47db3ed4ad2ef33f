//! Robots.txt handling module
//!
//! This module provides functionality for fetching, validating and caching
//! robots.txt files. Resolution is best effort: any failure leaves a page
//! without a policy, which means every path is allowed.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{RobotsPolicy, WILDCARD_AGENT};

use crate::crawler::{body_text, Fetcher};
use std::time::Duration;
use thiserror::Error;

/// Reasons a site ends up without a robots policy
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RobotsError {
    #[error("robots.txt unavailable at {url}")]
    Unavailable { url: String },

    #[error("content at {url} is not a robots.txt file")]
    NotRobotsContent { url: String },
}

/// Fetches and validates robots.txt for the site rooted at `site_root`
///
/// # Resolution Steps
///
/// 1. Probe `site_root + "robots.txt"` for existence
/// 2. Fetch it within `timeout`
/// 3. Accept it only if it contains a `User-agent:` line
///
/// # Arguments
///
/// * `site_root` - `scheme://host[:port]/` of the site
/// * `fetcher` - Transport used for the probe and the download
/// * `timeout` - Fixed timeout for each network step
pub async fn resolve_policy(
    site_root: &str,
    fetcher: &dyn Fetcher,
    timeout: Duration,
) -> Result<RobotsPolicy, RobotsError> {
    let robots_url = format!("{}robots.txt", site_root);
    let unavailable = || RobotsError::Unavailable {
        url: robots_url.clone(),
    };

    let exists = tokio::time::timeout(timeout, fetcher.probe(&robots_url))
        .await
        .unwrap_or(false);
    if !exists {
        return Err(unavailable());
    }

    let fetched = tokio::time::timeout(timeout, fetcher.fetch(&robots_url))
        .await
        .map_err(|_| unavailable())?
        .map_err(|_| unavailable())?;

    let content = body_text(&fetched);
    if !RobotsPolicy::is_robots_content(&content) {
        return Err(RobotsError::NotRobotsContent { url: robots_url });
    }

    Ok(RobotsPolicy::new(site_root, content))
}
