use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitegraph
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Width of the worker pool that processes one layer of children
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Fixed timeout applied to every page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Whether robots.txt rules are resolved and honoured
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            fetch_timeout_secs: default_fetch_timeout(),
            respect_robots: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default = "default_contact_url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default = "default_contact_email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the HTTP user agent: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
        }
    }
}

/// Ranking and analysis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    /// Damping factor of the rank recurrence
    #[serde(default = "default_damping")]
    pub damping: f64,

    /// Number of entries shown in the degree sample and top-ranked listing
    #[serde(rename = "sample-size", default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            sample_size: default_sample_size(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database holding saved graphs
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Optional path of the markdown report
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            summary_path: None,
        }
    }
}

fn default_workers() -> u32 {
    4
}

fn default_fetch_timeout() -> u64 {
    8
}

fn default_true() -> bool {
    true
}

fn default_damping() -> f64 {
    0.85
}

fn default_sample_size() -> usize {
    10
}

fn default_database_path() -> String {
    "./sitegraph.db".to_string()
}

fn default_crawler_name() -> String {
    "sitegraph".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://example.com/sitegraph".to_string()
}

fn default_contact_email() -> String {
    "crawler@example.com".to_string()
}
