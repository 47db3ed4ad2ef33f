//! Output module for run summaries and reports
//!
//! This module handles:
//! - Collecting the results of a crawl or load into a `RunSummary`
//! - Printing the summary to stdout
//! - Writing a markdown report

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::print_summary;

use crate::graph::{GraphAnalysis, RankTable};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Where the graph of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphSource {
    /// Crawled fresh in this invocation
    Crawl,
    /// Loaded from a previously saved run
    Loaded,
}

/// Wall-clock time spent in each phase
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    /// Crawling, or loading the saved graph
    pub graph: Duration,
    pub rank: Duration,
    pub analyze: Duration,
}

/// Everything reported at the end of a run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub root_url: String,
    pub run_id: Option<i64>,
    pub source: GraphSource,
    pub config_hash: String,
    pub timings: PhaseTimings,
    pub analysis: GraphAnalysis,

    /// Highest ranked pages, best first
    pub top_ranks: Vec<(String, f64)>,

    /// Number of pages that received a rank
    pub ranked_pages: usize,
}

impl RunSummary {
    /// Builds a summary, keeping the `top` highest ranks
    pub fn new(
        root_url: impl Into<String>,
        source: GraphSource,
        analysis: GraphAnalysis,
        ranks: &RankTable,
        top: usize,
    ) -> Self {
        Self {
            root_url: root_url.into(),
            run_id: None,
            source,
            config_hash: String::new(),
            timings: PhaseTimings::default(),
            analysis,
            top_ranks: ranks
                .top(top)
                .into_iter()
                .map(|(url, rank)| (url.to_string(), rank))
                .collect(),
            ranked_pages: ranks.len(),
        }
    }

    /// Share of graph nodes whose page errored, in percent
    pub fn error_rate(&self) -> f64 {
        if self.analysis.node_count == 0 {
            0.0
        } else {
            self.analysis.errored_nodes as f64 / self.analysis.node_count as f64 * 100.0
        }
    }
}
