//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the GraphStorage trait.

use crate::graph::{RankTable, WebGraph};
use crate::state::PageState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{GraphStorage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::SiteGraphError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, root_url, started_at, finished_at, config_hash, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SiteGraphError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SiteGraphError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, SiteGraphError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn ensure_run(&self, run_id: i64) -> StorageResult<()> {
        self.get_run(run_id).map(|_| ())
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        root_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
    })
}

impl GraphStorage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, root_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (root_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![root_url, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self, root_url: &str) -> StorageResult<Option<RunRecord>> {
        let sql = format!(
            "SELECT {} FROM runs WHERE root_url = ?1 AND status = ?2 ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        );
        let run = self
            .conn
            .query_row(
                &sql,
                params![root_url, RunStatus::Completed.to_db_string()],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64) -> StorageResult<()> {
        self.finish_run(run_id, RunStatus::Completed)
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        self.finish_run(run_id, RunStatus::Failed)
    }

    // ===== Graph =====

    fn save_graph(&mut self, run_id: i64, graph: &WebGraph) -> StorageResult<()> {
        self.ensure_run(run_id)?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM edges WHERE run_id = ?1", params![run_id])?;
        tx.execute("DELETE FROM nodes WHERE run_id = ?1", params![run_id])?;

        {
            let mut insert_node = tx.prepare(
                "INSERT INTO nodes (run_id, position, url, state, title) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, node) in graph.nodes().enumerate() {
                insert_node.execute(params![
                    run_id,
                    position as i64,
                    node.url,
                    node.state.to_db_string(),
                    node.title
                ])?;
            }

            let mut insert_edge = tx.prepare(
                "INSERT INTO edges (run_id, position, from_url, to_url) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (from, to)) in graph.edges().enumerate() {
                insert_edge.execute(params![run_id, position as i64, from, to])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            "Saved graph for run {}: {} nodes, {} edges",
            run_id,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(())
    }

    fn load_graph(&self, run_id: i64) -> StorageResult<WebGraph> {
        self.ensure_run(run_id)?;
        let mut graph = WebGraph::new();

        let mut nodes = self.conn.prepare(
            "SELECT url, state, title FROM nodes WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = nodes.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?;
        for row in rows {
            let (url, state, title) = row?;
            let state = PageState::from_db_string(&state).unwrap_or_default();
            graph.add_node(&url, state, title);
        }

        let mut edges = self.conn.prepare(
            "SELECT from_url, to_url FROM edges WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = edges.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (from, to) = row?;
            if !graph.contains(&from) || !graph.contains(&to) {
                return Err(StorageError::InvalidGraph {
                    run_id,
                    reason: format!("edge {} -> {} references an unknown node", from, to),
                });
            }
            graph.add_edge(&from, &to);
        }

        Ok(graph)
    }

    fn count_nodes(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_edges(&self, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM edges WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Ranks =====

    fn save_ranks(&mut self, run_id: i64, ranks: &RankTable) -> StorageResult<()> {
        self.ensure_run(run_id)?;

        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM ranks WHERE run_id = ?1", params![run_id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO ranks (run_id, position, url, rank) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, (url, rank)) in ranks.iter().enumerate() {
                insert.execute(params![run_id, position as i64, url, rank])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_ranks(&self, run_id: i64) -> StorageResult<RankTable> {
        self.ensure_run(run_id)?;

        let mut stmt = self
            .conn
            .prepare("SELECT url, rank FROM ranks WHERE run_id = ?1 ORDER BY position")?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut table = RankTable::new();
        for row in rows {
            let (url, rank) = row?;
            table.insert(&url, rank);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RankEngine;

    fn sample_graph() -> WebGraph {
        let mut graph = WebGraph::new();
        graph.add_node("https://example.com/", PageState::Processed, Some("Home".to_string()));
        graph.add_node("https://example.com/b", PageState::Processed, None);
        graph.add_node("https://example.com/a", PageState::Errored, None);
        graph.add_edge("https://example.com/", "https://example.com/b");
        graph.add_edge("https://example.com/", "https://example.com/a");
        graph.add_edge("https://example.com/b", "https://example.com/");
        graph
    }

    #[test]
    fn test_create_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("https://example.com/", "test_hash").unwrap();
        assert!(run_id > 0);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.root_url, "https://example.com/");
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());
    }

    #[test]
    fn test_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(storage.get_run(42), Err(StorageError::RunNotFound(42))));
        assert!(matches!(storage.load_graph(42), Err(StorageError::RunNotFound(42))));
    }

    #[test]
    fn test_graph_roundtrip_preserves_order_and_state() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("https://example.com/", "h").unwrap();
        let graph = sample_graph();

        storage.save_graph(run_id, &graph).unwrap();
        let loaded = storage.load_graph(run_id).unwrap();

        assert!(loaded.nodes().eq(graph.nodes()));
        assert_eq!(loaded.edges().collect::<Vec<_>>(), graph.edges().collect::<Vec<_>>());
        assert_eq!(storage.count_nodes(run_id).unwrap(), 3);
        assert_eq!(storage.count_edges(run_id).unwrap(), 3);
    }

    #[test]
    fn test_save_graph_replaces_previous() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("https://example.com/", "h").unwrap();

        storage.save_graph(run_id, &sample_graph()).unwrap();
        storage.save_graph(run_id, &sample_graph()).unwrap();

        assert_eq!(storage.count_nodes(run_id).unwrap(), 3);
    }

    #[test]
    fn test_ranks_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("https://example.com/", "h").unwrap();
        let graph = sample_graph();
        let ranks = RankEngine::default().rank(&graph, "https://example.com/");

        storage.save_ranks(run_id, &ranks).unwrap();
        let loaded = storage.load_ranks(run_id).unwrap();

        assert_eq!(loaded, ranks);
    }

    #[test]
    fn test_latest_run_is_latest_completed_for_root() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first = storage.create_run("https://example.com/", "h").unwrap();
        storage.complete_run(first).unwrap();
        let failed = storage.create_run("https://example.com/", "h").unwrap();
        storage.fail_run(failed).unwrap();
        let other = storage.create_run("https://other.org/", "h").unwrap();
        storage.complete_run(other).unwrap();
        storage.create_run("https://example.com/", "h").unwrap();

        let latest = storage.get_latest_run("https://example.com/").unwrap().unwrap();
        assert_eq!(latest.id, first);
        assert_eq!(latest.status, RunStatus::Completed);
        assert!(latest.finished_at.is_some());

        assert!(storage.get_latest_run("https://nowhere.net/").unwrap().is_none());
    }
}
