//! Link graph of a finished crawl
//!
//! This module turns the shared Page structure into a plain directed graph
//! and provides the consumers that run on top of it:
//! - `GraphBuilder` walks the Page structure once into a `WebGraph`
//! - `RankEngine` computes the single-pass rank table
//! - `GraphAnalyzer` reports counts and a degree sample

mod analyze;
mod builder;
mod rank;

pub use analyze::{GraphAnalysis, GraphAnalyzer};
pub use builder::GraphBuilder;
pub use rank::{RankEngine, RankTable, DEFAULT_DAMPING};

use crate::state::PageState;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::HashMap;

/// One URL node and the state its Page ended the crawl in
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub url: String,
    pub state: PageState,
    pub title: Option<String>,
}

/// Simple directed graph over URL strings
///
/// Nodes keep insertion order. Parallel edges collapse into one; self-loops
/// are kept.
#[derive(Debug, Clone, Default)]
pub struct WebGraph {
    graph: DiGraph<GraphNode, ()>,
    index: HashMap<String, NodeIndex>,
}

impl WebGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, returning its index
    ///
    /// Adding a URL that is already present leaves the existing node as is.
    pub fn add_node(&mut self, url: &str, state: PageState, title: Option<String>) -> NodeIndex {
        if let Some(&idx) = self.index.get(url) {
            return idx;
        }

        let idx = self.graph.add_node(GraphNode {
            url: url.to_string(),
            state,
            title,
        });
        self.index.insert(url.to_string(), idx);
        idx
    }

    /// Adds the edge `from -> to` between two existing nodes
    ///
    /// Returns `false` if either node is unknown or the edge already exists.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&f), Some(&t)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };

        let before = self.graph.edge_count();
        self.graph.update_edge(f, t, ());
        self.graph.edge_count() != before
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn node(&self, url: &str) -> Option<&GraphNode> {
        self.index.get(url).map(|&idx| &self.graph[idx])
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.graph.raw_edges().iter().map(move |e| {
            (
                self.graph[e.source()].url.as_str(),
                self.graph[e.target()].url.as_str(),
            )
        })
    }

    /// Out-neighbours of `url` in edge insertion order
    pub fn successors(&self, url: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(url) else {
            return Vec::new();
        };

        // petgraph walks adjacency lists newest first
        let mut outs: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Outgoing)
            .map(|n| self.graph[n].url.as_str())
            .collect();
        outs.reverse();
        outs
    }

    pub fn out_degree(&self, url: &str) -> usize {
        self.degree_towards(url, Outgoing)
    }

    pub fn in_degree(&self, url: &str) -> usize {
        self.degree_towards(url, Incoming)
    }

    /// Total degree (in + out); a self-loop counts twice
    pub fn degree(&self, url: &str) -> usize {
        self.in_degree(url) + self.out_degree(url)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    fn degree_towards(&self, url: &str, direction: petgraph::Direction) -> usize {
        self.index
            .get(url)
            .map(|&idx| self.graph.neighbors_directed(idx, direction).count())
            .unwrap_or(0)
    }
}
