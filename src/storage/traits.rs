//! Storage traits and error types
//!
//! This module defines the trait interface for graph persistence backends and
//! associated error types.

use crate::graph::{RankTable, WebGraph};
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Stored graph of run {run_id} is inconsistent: {reason}")]
    InvalidGraph { run_id: i64, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for graph persistence backends
///
/// A run groups one crawled graph with the rank table computed from it.
pub trait GraphStorage {
    // ===== Run Management =====

    /// Creates a new run for `root_url`
    ///
    /// # Arguments
    ///
    /// * `root_url` - Canonical root of the crawl
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, root_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent completed run for `root_url`
    fn get_latest_run(&self, root_url: &str) -> StorageResult<Option<RunRecord>>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    /// Marks a run as failed with a finish timestamp
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Graph =====

    /// Replaces the stored graph of a run
    fn save_graph(&mut self, run_id: i64, graph: &WebGraph) -> StorageResult<()>;

    /// Loads the graph of a run with its original node and edge order
    fn load_graph(&self, run_id: i64) -> StorageResult<WebGraph>;

    /// Counts the nodes stored for a run
    fn count_nodes(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts the edges stored for a run
    fn count_edges(&self, run_id: i64) -> StorageResult<u64>;

    // ===== Ranks =====

    /// Replaces the stored rank table of a run
    fn save_ranks(&mut self, run_id: i64, ranks: &RankTable) -> StorageResult<()>;

    /// Loads the rank table of a run in ranking order
    fn load_ranks(&self, run_id: i64) -> StorageResult<RankTable>;
}
