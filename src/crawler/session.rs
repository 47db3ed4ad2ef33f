//! Crawl session context
//!
//! Everything a crawl shares between its concurrent tasks lives here instead
//! of in process-wide globals: the page registry, the robots cache, the
//! domain boundary and the transport. Two sessions never see each other's
//! pages.

use crate::config::CrawlerConfig;
use crate::crawler::{FetchError, FetchedPage, Fetcher, PageRegistry};
use crate::robots::{RobotsCache, RobotsPolicy};
use crate::url::{resolve_link, site_root, DomainScope, LinkRejection};
use crate::SiteGraphError;
use std::sync::Arc;
use url::Url;

/// Parses and canonicalizes a crawl root
///
/// The root must be an absolute http(s) URL with a host. `https://Example.com`
/// becomes `https://example.com/`; a fragment is dropped.
pub fn canonical_root(root_url: &str) -> Result<Url, SiteGraphError> {
    let invalid = |reason: String| SiteGraphError::InvalidRoot {
        url: root_url.to_string(),
        reason,
    };

    let mut root = Url::parse(root_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(root.scheme(), "http" | "https") {
        return Err(invalid("only http and https roots can be crawled".to_string()));
    }
    if root.host_str().is_none() {
        return Err(invalid("root has no host".to_string()));
    }
    root.set_fragment(None);
    Ok(root)
}

/// Shared state of one crawl
pub struct CrawlSession {
    root: Url,
    scope: DomainScope,
    config: CrawlerConfig,
    registry: PageRegistry,
    robots: RobotsCache,
    fetcher: Arc<dyn Fetcher>,
}

impl CrawlSession {
    /// Creates a session rooted at `root_url`
    ///
    /// The root is stored in the form returned by [`canonical_root`].
    pub fn new(
        root_url: &str,
        config: CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, SiteGraphError> {
        let root = canonical_root(root_url)?;
        let scope = DomainScope::new(&root).ok_or_else(|| SiteGraphError::InvalidRoot {
            url: root_url.to_string(),
            reason: "root has no host".to_string(),
        })?;

        Ok(Self {
            root,
            scope,
            config,
            registry: PageRegistry::new(),
            robots: RobotsCache::new(),
            fetcher,
        })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Canonical link of the root page
    pub fn root_link(&self) -> &str {
        self.root.as_str()
    }

    pub fn scope(&self) -> &DomainScope {
        &self.scope
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    /// Downloads `url`, giving up after the configured fetch timeout
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        match tokio::time::timeout(self.config.fetch_timeout(), self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    /// Robots policy of the site `link` belongs to, resolved once per site
    pub async fn robots_for(&self, link: &str) -> Option<Arc<RobotsPolicy>> {
        let url = Url::parse(link).ok()?;
        let root = site_root(&url)?;
        self.robots
            .policy_for(&root, self.fetcher.as_ref(), self.config.fetch_timeout())
            .await
    }

    /// Turns a raw href found on `base` into a crawlable link
    ///
    /// The href is resolved against `base` with its fragment removed, then
    /// checked against the same-host boundary and, when robots are respected,
    /// against `policy`.
    pub fn admit_link(
        &self,
        href: &str,
        base: &Url,
        policy: Option<&RobotsPolicy>,
    ) -> Result<Url, LinkRejection> {
        let url = resolve_link(href, base)?;

        if !self.scope.contains_str(url.as_str()) {
            return Err(LinkRejection::OutOfScope);
        }

        if self.config.respect_robots {
            if let Some(policy) = policy {
                if !policy.can_fetch(url.as_str()) {
                    return Err(LinkRejection::RobotsDenied);
                }
            }
        }

        Ok(url)
    }
}
