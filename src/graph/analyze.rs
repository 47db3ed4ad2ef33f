use crate::graph::WebGraph;
use crate::state::PageState;

/// Descriptive statistics of a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphAnalysis {
    pub node_count: usize,
    pub edge_count: usize,

    /// Nodes whose page failed to fetch
    pub errored_nodes: usize,

    /// Nodes without out-edges
    pub dangling_nodes: usize,

    /// First nodes in insertion order with their total degree
    pub degree_sample: Vec<(String, usize)>,
}

pub struct GraphAnalyzer;

impl GraphAnalyzer {
    /// Computes counts and a degree sample of at most `sample` nodes
    pub fn analyze(graph: &WebGraph, sample: usize) -> GraphAnalysis {
        GraphAnalysis {
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            errored_nodes: graph
                .nodes()
                .filter(|n| n.state == PageState::Errored)
                .count(),
            dangling_nodes: graph
                .nodes()
                .filter(|n| graph.out_degree(&n.url) == 0)
                .count(),
            degree_sample: graph
                .nodes()
                .take(sample)
                .map(|n| (n.url.clone(), graph.degree(&n.url)))
                .collect(),
        }
    }
}
