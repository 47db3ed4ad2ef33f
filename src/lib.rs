//! Sitegraph: a same-site crawler and link-graph ranker
//!
//! This crate crawls a web site from a root URL, respecting robots.txt and a
//! same-host boundary, builds a directed link graph of the visited pages and
//! runs a single-pass rank propagation over it.

pub mod config;
pub mod crawler;
pub mod graph;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitegraph operations
#[derive(Debug, Error)]
pub enum SiteGraphError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid root URL {url}: {reason}")]
    InvalidRoot { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitegraph operations
pub type Result<T> = std::result::Result<T, SiteGraphError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlReport, CrawlScheduler, CrawlSession, Page, PageRegistry};
pub use graph::{GraphAnalyzer, GraphBuilder, RankEngine, RankTable, WebGraph};
pub use state::PageState;
