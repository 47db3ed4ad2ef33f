//! Robots.txt policy implementation
//!
//! This module wraps robots.txt content for one site and answers fetch
//! permission questions for the wildcard agent using the robotstxt crate.

use chrono::{DateTime, Utc};
use robotstxt::DefaultMatcher;

/// Agent name rules are evaluated for
pub const WILDCARD_AGENT: &str = "*";

/// Fetch-permission rules of one site
///
/// `base_url` is the site root the rules were fetched for. A page only ever
/// carries a policy whose `base_url` is a string prefix of its own link.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    base_url: String,
    content: String,
    fetched_at: DateTime<Utc>,
}

impl RobotsPolicy {
    /// Creates a policy from raw robots.txt content
    pub fn new(base_url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            content: content.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Checks whether `content` looks like a robots.txt file at all
    ///
    /// Sites that redirect unknown paths to an HTML error page would otherwise
    /// be read as "no rules".
    pub fn is_robots_content(content: &str) -> bool {
        content.to_ascii_lowercase().contains("user-agent:")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Whether this policy may be attached to the page at `link`
    pub fn applies_to(&self, link: &str) -> bool {
        link.starts_with(&self.base_url)
    }

    /// Checks if the wildcard agent may fetch `link`
    pub fn can_fetch(&self, link: &str) -> bool {
        if self.content.is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, WILDCARD_AGENT, link)
    }
}
