//! URL handling module for Sitegraph
//!
//! This module provides link resolution and the same-host crawl boundary.
//! Links that fail either check are dropped silently: a rejection is not an
//! error condition, only a reason worth tracing.

mod domain;
mod resolve;

pub use domain::{extract_domain, site_root, DomainScope};
pub use resolve::resolve_link;

use thiserror::Error;

/// Why a discovered href did not become a child page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum LinkRejection {
    /// Bare `#` marker or a same-page anchor
    #[error("fragment")]
    Fragment,

    /// Could not be resolved to an absolute http(s) URL
    #[error("invalid link")]
    Invalid,

    /// Resolved URL lives on a different host than the crawl root
    #[error("domain scope violation")]
    OutOfScope,

    /// The attached robots policy denies the path
    #[error("disallowed by robots.txt")]
    RobotsDenied,
}
