//! Crawl node and its fetch/parse state machine
//!
//! A `Page` starts `Unprocessed` and is moved into `Processed` or `Errored`
//! by exactly one call to [`Page::process`]. Concurrent callers serialize on
//! the page's process gate and observe the terminal state afterwards.
//!
//! `process` never re-enters itself for the same page: children are only
//! created through the registry, never processed from inside their parent.
//! A plain (non re-entrant) async mutex is therefore enough for the gate.

use crate::crawler::parser::{body_text, parse_html};
use crate::crawler::CrawlSession;
use crate::robots::RobotsPolicy;
use crate::state::PageState;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use url::Url;

#[derive(Default)]
struct PageData {
    children: Vec<Arc<Page>>,
    robots: Option<Arc<RobotsPolicy>>,
    title: Option<String>,
    text: Option<String>,
    normalized_text: Option<String>,
}

/// One crawl node
///
/// Children are shared references to registry-owned pages; a page never
/// exclusively owns them.
pub struct Page {
    link: String,
    state: AtomicU8,
    gate: tokio::sync::Mutex<()>,
    data: Mutex<PageData>,
}

impl Page {
    /// Creates an unprocessed page, attaching `robots` only if it covers `link`
    pub(crate) fn new(link: impl Into<String>, robots: Option<Arc<RobotsPolicy>>) -> Self {
        let link = link.into();
        let robots = robots.filter(|policy| policy.applies_to(&link));

        Self {
            link,
            state: AtomicU8::new(PageState::Unprocessed.as_u8()),
            gate: tokio::sync::Mutex::new(()),
            data: Mutex::new(PageData {
                robots,
                ..PageData::default()
            }),
        }
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn state(&self) -> PageState {
        PageState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_processed(&self) -> bool {
        self.state().is_success()
    }

    pub fn is_errored(&self) -> bool {
        self.state().is_error()
    }

    /// Snapshot of the recorded children, in discovery order
    pub fn children(&self) -> Vec<Arc<Page>> {
        self.data().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn has_child(&self, link: &str) -> bool {
        self.data().children.iter().any(|c| c.link == link)
    }

    pub fn robots(&self) -> Option<Arc<RobotsPolicy>> {
        self.data().robots.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.data().title.clone()
    }

    /// Decoded body, present only after successful processing
    pub fn text(&self) -> Option<String> {
        self.data().text.clone()
    }

    /// Extracted plain text, present only after successful processing
    pub fn normalized_text(&self) -> Option<String> {
        self.data().normalized_text.clone()
    }

    /// Fetches, parses and links this page
    ///
    /// Returns `true` only for the single call that performed the work. A
    /// page that is already processed or errored returns `false` without any
    /// mutation. A failed fetch marks the page errored and returns `false`.
    pub async fn process(&self, session: &CrawlSession) -> bool {
        let _gate = self.gate.lock().await;

        if self.state().is_terminal() {
            tracing::debug!("Already been: {}", self.link);
            return false;
        }

        tracing::info!("Trying to get: {}", self.link);
        let fetched = match session.fetch(&self.link).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Fetch error on {}: {}", self.link, e);
                self.set_state(PageState::Errored);
                return false;
            }
        };
        tracing::info!("Got: {}", self.link);
        if fetched.final_url != self.link {
            tracing::debug!("{} redirected to {}", self.link, fetched.final_url);
        }

        let robots = self.resolve_robots(session).await;

        let text = body_text(&fetched);
        let parsed = parse_html(&text);

        match Url::parse(&self.link) {
            Ok(base) => {
                for href in &parsed.links {
                    match session.admit_link(href, &base, robots.as_deref()) {
                        Ok(url) => {
                            let child = session
                                .registry()
                                .get_or_create(url.as_str(), robots.clone());
                            if !child.is_errored() {
                                self.add_child(child);
                            }
                        }
                        Err(reason) => {
                            tracing::trace!("Dropping {} found on {}: {}", href, self.link, reason);
                        }
                    }
                }
            }
            Err(e) => tracing::debug!("Cannot resolve links against {}: {}", self.link, e),
        }

        {
            let mut data = self.data();
            data.title = parsed.title;
            data.normalized_text = Some(parsed.text);
            data.text = Some(text);
        }

        self.set_state(PageState::Processed);
        true
    }

    /// Returns the attached policy, resolving the site's one lazily
    async fn resolve_robots(&self, session: &CrawlSession) -> Option<Arc<RobotsPolicy>> {
        if !session.config().respect_robots {
            return None;
        }

        if let Some(policy) = self.robots() {
            return Some(policy);
        }

        let policy = session.robots_for(&self.link).await?;
        if self.attach_robots(Arc::clone(&policy)) {
            Some(policy)
        } else {
            None
        }
    }

    fn attach_robots(&self, policy: Arc<RobotsPolicy>) -> bool {
        if !policy.applies_to(&self.link) {
            return false;
        }
        self.data().robots = Some(policy);
        true
    }

    /// Appends `child` unless a child with the same link is already recorded
    pub(crate) fn add_child(&self, child: Arc<Page>) -> bool {
        let mut data = self.data();
        if data.children.iter().any(|c| c.link == child.link) {
            return false;
        }
        data.children.push(child);
        true
    }

    /// Prunes `child` from the recorded children
    pub(crate) fn remove_child(&self, child: &Page) -> bool {
        let mut data = self.data();
        let before = data.children.len();
        data.children.retain(|c| c.link != child.link);
        data.children.len() != before
    }

    pub(crate) fn set_state(&self, to: PageState) {
        debug_assert!(
            self.state().can_transition_to(to),
            "invalid transition {} -> {} for {}",
            self.state(),
            to,
            self.link
        );
        self.state.store(to.as_u8(), Ordering::Release);
    }

    fn data(&self) -> MutexGuard<'_, PageData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("link", &self.link)
            .field("state", &self.state())
            .field("children", &self.child_count())
            .finish()
    }
}
