//! Single-pass rank propagation
//!
//! This is not iterative PageRank. Each node reachable from the root is
//! scored exactly once, on first visit:
//!
//! ```text
//! rank(n) = (1 - d) / N + d * (seed(n) / out_degree(n))   if n has out-edges
//! rank(n) = (1 - d) / N                                   otherwise
//! ```
//!
//! where `seed(n)` is the node's own tentative value (1.0 until it has been
//! ranked), not the rank of the parent it was reached from.

use crate::graph::WebGraph;
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_DAMPING: f64 = 0.85;

const SEED_RANK: f64 = 1.0;

/// Ranks in the order nodes were scored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankTable {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl RankTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a score; a URL that is already ranked keeps its first score
    pub fn insert(&mut self, url: &str, rank: f64) -> bool {
        if self.index.contains_key(url) {
            return false;
        }
        self.index.insert(url.to_string(), self.entries.len());
        self.entries.push((url.to_string(), rank));
        true
    }

    pub fn get(&self, url: &str) -> Option<f64> {
        self.index.get(url).map(|&idx| self.entries[idx].1)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.entries.iter().map(|(url, rank)| (url.as_str(), *rank))
    }

    /// The `n` highest scores, ties broken by URL
    pub fn top(&self, n: usize) -> Vec<(&str, f64)> {
        let mut sorted: Vec<(&str, f64)> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted.truncate(n);
        sorted
    }
}

/// Computes a `RankTable` for a graph
#[derive(Debug, Clone, Copy)]
pub struct RankEngine {
    damping: f64,
}

impl Default for RankEngine {
    fn default() -> Self {
        Self::new(DEFAULT_DAMPING)
    }
}

impl RankEngine {
    pub fn new(damping: f64) -> Self {
        Self { damping }
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Scores every node reachable from `root`
    ///
    /// Returns an empty table when `root` is not in the graph.
    pub fn rank(&self, graph: &WebGraph, root: &str) -> RankTable {
        let mut table = RankTable::new();
        if !graph.contains(root) {
            tracing::warn!("Root {} is not part of the graph, nothing to rank", root);
            return table;
        }

        let n = graph.node_count() as f64;
        let base = (1.0 - self.damping) / n;
        let mut work: VecDeque<&str> = VecDeque::from([root]);

        // Neighbours are queued even when already ranked; the check on pop
        // filters the duplicates.
        while let Some(current) = work.pop_front() {
            if table.contains(current) {
                continue;
            }

            let outs = graph.successors(current);
            let rank = if outs.is_empty() {
                base
            } else {
                base + self.damping * (SEED_RANK / outs.len() as f64)
            };

            table.insert(current, rank);
            work.extend(outs);
        }

        table
    }
}
