//! Page structure to graph conversion
//!
//! The crawl leaves behind a web of shared `Page` references in which one
//! page can be the child of many parents. The builder walks it with a work
//! list and a colour map so that every page is expanded at most once.

use crate::crawler::Page;
use crate::graph::WebGraph;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    Queued,
    Done,
}

/// Converts a finished crawl into a `WebGraph`
#[derive(Debug, Default)]
pub struct GraphBuilder {
    colours: HashMap<String, Colour>,
    expanded: Vec<String>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph reachable from `root`
    ///
    /// Every recorded child gets an edge, even if it errored or was never
    /// processed, so discovered but unreachable links stay visible. Expansion
    /// only continues into children that are unvisited and processed.
    pub fn build(&mut self, root: &Arc<Page>) -> WebGraph {
        let mut graph = WebGraph::new();
        let mut work = VecDeque::new();

        self.colours.clear();
        self.expanded.clear();

        add_page(&mut graph, root);
        self.colours.insert(root.link().to_string(), Colour::Queued);
        work.push_back(Arc::clone(root));

        while let Some(page) = work.pop_front() {
            for child in page.children() {
                add_page(&mut graph, &child);
                graph.add_edge(page.link(), child.link());

                let unvisited = !self.colours.contains_key(child.link());
                if unvisited && !child.is_errored() && child.is_processed() {
                    self.colours.insert(child.link().to_string(), Colour::Queued);
                    work.push_back(child);
                }
            }

            self.colours.insert(page.link().to_string(), Colour::Done);
            self.expanded.push(page.link().to_string());
        }

        tracing::debug!(
            "Built graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Links in the order they were expanded by the last `build`
    pub fn expanded(&self) -> &[String] {
        &self.expanded
    }
}

fn add_page(graph: &mut WebGraph, page: &Page) {
    graph.add_node(page.link(), page.state(), page.title());
}
