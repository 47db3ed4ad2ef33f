//! Layer-synchronous breadth-first crawl scheduler
//!
//! The frontier is a FIFO of pages whose children still need visiting. For
//! each dequeued parent, every child is handed to a bounded pool of tasks and
//! the scheduler waits for the whole batch before it touches the frontier
//! again. Children that were fetched for the first time become the next
//! frontier entries; children that errored or whose task failed are pruned
//! from the parent.

use crate::crawler::{CrawlSession, Page};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Outcome of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// The root page; its reachable children form the crawl graph
    pub root: Arc<Page>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Links in the order their children were expanded
    pub expanded: Vec<String>,

    /// Pages known to the registry when the crawl ended
    pub pages_discovered: usize,

    pub pages_processed: usize,
    pub pages_errored: usize,

    /// Child edges removed because the child errored or its task failed
    pub pruned: usize,

    /// Child tasks that panicked or were cancelled
    pub faults: usize,
}

/// Drives the frontier of one crawl session
pub struct CrawlScheduler {
    session: Arc<CrawlSession>,
    root: Arc<Page>,
    frontier: VecDeque<Arc<Page>>,
    pool: Arc<Semaphore>,
    started_at: DateTime<Utc>,
    expanded: Vec<String>,
    pruned: usize,
    faults: usize,
}

impl CrawlScheduler {
    /// Processes the root page and seeds the frontier with it
    ///
    /// The root stays in the frontier even if its fetch failed, in which case
    /// it simply has no children to expand.
    pub async fn start(session: Arc<CrawlSession>) -> Self {
        let started_at = Utc::now();
        let root = session.registry().get_or_create(session.root_link(), None);

        if !visit_one(&root, &session).await && root.is_errored() {
            tracing::warn!("Root page {} could not be fetched", root.link());
        }

        let workers = session.config().workers.max(1) as usize;
        let mut frontier = VecDeque::new();
        frontier.push_back(Arc::clone(&root));

        Self {
            session,
            root,
            frontier,
            pool: Arc::new(Semaphore::new(workers)),
            started_at,
            expanded: Vec::new(),
            pruned: 0,
            faults: 0,
        }
    }

    pub fn root(&self) -> &Arc<Page> {
        &self.root
    }

    /// Runs until the frontier is empty
    pub async fn run(mut self) -> CrawlReport {
        tracing::info!("Starting crawl of {}", self.root.link());

        while let Some(parent) = self.frontier.pop_front() {
            self.expanded.push(parent.link().to_string());

            let fresh = self.traverse(&parent).await;
            self.frontier.extend(fresh);

            tracing::info!(
                "Progress: {} pages expanded, {} in frontier, {} pages known",
                self.expanded.len(),
                self.frontier.len(),
                self.session.registry().len()
            );
        }

        self.finish()
    }

    /// Visits every child of `parent` and waits for all of them
    ///
    /// Returns the children this batch processed for the first time, in
    /// completion order.
    async fn traverse(&mut self, parent: &Arc<Page>) -> Vec<Arc<Page>> {
        let children = parent.children();
        if children.is_empty() {
            return Vec::new();
        }

        let mut batch = FuturesUnordered::new();
        for child in children {
            let session = Arc::clone(&self.session);
            let pool = Arc::clone(&self.pool);
            let page = Arc::clone(&child);

            let handle = tokio::spawn(async move {
                let Ok(_permit) = pool.acquire_owned().await else {
                    return false;
                };
                visit_one(&page, &session).await
            });

            batch.push(async move { (child, handle.await) });
        }

        let mut fresh = Vec::new();
        while let Some((child, outcome)) = batch.next().await {
            match outcome {
                Ok(true) => fresh.push(child),
                Ok(false) if child.is_errored() => {
                    tracing::debug!("Pruning errored {} from {}", child.link(), parent.link());
                    if parent.remove_child(&child) {
                        self.pruned += 1;
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Task for {} failed: {}", child.link(), e);
                    self.faults += 1;
                    if parent.remove_child(&child) {
                        self.pruned += 1;
                    }
                }
            }
        }

        fresh
    }

    fn finish(self) -> CrawlReport {
        let pages = self.session.registry().pages();
        let pages_processed = pages.iter().filter(|p| p.is_processed()).count();
        let pages_errored = pages.iter().filter(|p| p.is_errored()).count();
        let finished_at = Utc::now();

        tracing::info!(
            "Crawl completed: {} pages processed, {} errored, {} pruned in {}ms",
            pages_processed,
            pages_errored,
            self.pruned,
            (finished_at - self.started_at).num_milliseconds()
        );

        CrawlReport {
            root: self.root,
            started_at: self.started_at,
            finished_at,
            expanded: self.expanded,
            pages_discovered: pages.len(),
            pages_processed,
            pages_errored,
            pruned: self.pruned,
            faults: self.faults,
        }
    }
}

/// Processes `page` unless it is already processed
///
/// Returns whether this call did the work.
pub async fn visit_one(page: &Page, session: &CrawlSession) -> bool {
    if page.is_processed() {
        return false;
    }
    page.process(session).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use crate::crawler::testing::StaticFetcher;
    use crate::crawler::Fetcher;
    use std::time::Duration;

    fn position(events: &[String], event: &str) -> usize {
        events.iter().position(|e| e == event).unwrap()
    }

    async fn crawl_with(fetcher: Arc<StaticFetcher>) -> CrawlReport {
        let session = CrawlSession::new(
            "https://example.com/",
            CrawlerConfig::default(),
            fetcher as Arc<dyn Fetcher>,
        )
        .unwrap();
        CrawlScheduler::start(Arc::new(session)).await.run().await
    }

    #[tokio::test]
    async fn test_layer_barrier_and_single_fetch() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page("https://example.com/", r#"<a href="/a">a</a><a href="/b">b</a>"#)
                .with_page("https://example.com/a", r#"<a href="/c">c</a>"#)
                .with_page("https://example.com/b", r#"<a href="/c">c</a>"#)
                .with_page("https://example.com/c", "<p>leaf</p>")
                .with_delay(Duration::from_millis(5)),
        );

        let report = crawl_with(Arc::clone(&fetcher)).await;

        assert_eq!(fetcher.fetch_count("https://example.com/c"), 1);
        let events = fetcher.events();
        let c_start = position(&events, "start:https://example.com/c");
        assert!(c_start > position(&events, "done:https://example.com/a"));
        assert!(c_start > position(&events, "done:https://example.com/b"));

        assert_eq!(report.expanded[0], "https://example.com/");
        assert_eq!(
            report
                .expanded
                .iter()
                .filter(|l| *l == "https://example.com/c")
                .count(),
            1
        );
        assert_eq!(report.expanded.len(), 4);
        assert_eq!(report.pages_processed, 4);
        assert_eq!(report.pages_errored, 0);
    }

    #[tokio::test]
    async fn test_errored_children_are_pruned() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(
                    "https://example.com/",
                    r#"<a href="/ok">ok</a><a href="/down">down</a><a href="/gone">gone</a>"#,
                )
                .with_page("https://example.com/ok", "<p>ok</p>")
                .with_failure("https://example.com/down"),
        );

        let report = crawl_with(fetcher).await;

        assert!(report.root.has_child("https://example.com/ok"));
        assert!(!report.root.has_child("https://example.com/down"));
        assert!(!report.root.has_child("https://example.com/gone"));
        assert_eq!(report.pruned, 2);
        assert_eq!(report.pages_errored, 2);
        assert_eq!(report.faults, 0);
    }

    #[tokio::test]
    async fn test_panicking_task_is_pruned() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page("https://example.com/", r#"<a href="/boom">boom</a><a href="/fine">fine</a>"#)
                .with_page("https://example.com/fine", "<p>fine</p>")
                .with_panic("https://example.com/boom"),
        );

        let report = crawl_with(fetcher).await;

        assert_eq!(report.faults, 1);
        assert!(!report.root.has_child("https://example.com/boom"));
        assert!(report.root.has_child("https://example.com/fine"));
    }

    #[tokio::test]
    async fn test_unreachable_root_ends_crawl() {
        let fetcher = Arc::new(StaticFetcher::new().with_failure("https://example.com/"));

        let report = crawl_with(fetcher).await;

        assert!(report.root.is_errored());
        assert_eq!(report.expanded, vec!["https://example.com/"]);
        assert_eq!(report.pages_processed, 0);
    }

    #[tokio::test]
    async fn test_cycles_terminate() {
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page("https://example.com/", r#"<a href="/a">a</a><a href="/">self</a>"#)
                .with_page("https://example.com/a", r#"<a href="/">home</a>"#),
        );

        let report = crawl_with(Arc::clone(&fetcher)).await;

        assert_eq!(fetcher.fetch_count("https://example.com/"), 1);
        assert_eq!(fetcher.fetch_count("https://example.com/a"), 1);
        assert_eq!(report.expanded.len(), 2);
    }
}
