//! URL to Page registry
//!
//! The registry owns the uniqueness invariant of a crawl session: for any
//! link at most one `Page` ever exists. Its lock only guards the in-memory
//! map and is never held across network I/O.

use crate::crawler::Page;
use crate::robots::RobotsPolicy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session-wide map from link to its unique Page
#[derive(Debug, Default)]
pub struct PageRegistry {
    pages: Mutex<HashMap<String, Arc<Page>>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the Page for `link`, creating it if this is the first request
    ///
    /// An existing Page is returned unchanged and `candidate` is discarded, so
    /// the first creator's policy wins. A new Page gets `candidate` only when
    /// its link starts with the policy's base URL.
    pub fn get_or_create(&self, link: &str, candidate: Option<Arc<RobotsPolicy>>) -> Arc<Page> {
        let mut pages = self.lock();

        if let Some(existing) = pages.get(link) {
            return Arc::clone(existing);
        }

        let page = Arc::new(Page::new(link, candidate));
        pages.insert(link.to_string(), Arc::clone(&page));
        page
    }

    /// Checks whether a Page exists for `link`
    pub fn is_visited(&self, link: &str) -> bool {
        self.lock().contains_key(link)
    }

    pub fn get(&self, link: &str) -> Option<Arc<Page>> {
        self.lock().get(link).cloned()
    }

    /// Snapshot of every Page created so far
    pub fn pages(&self) -> Vec<Arc<Page>> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every Page
    ///
    /// Must not be called while a crawl using this registry is running.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Page>>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_returns_same_page() {
        let registry = PageRegistry::new();
        let first = registry.get_or_create("https://example.com/a", None);
        let second = registry.get_or_create("https://example.com/a", None);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_get_or_create_is_unique() {
        let registry = Arc::new(PageRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get_or_create("https://example.com/same", None))
            })
            .collect();

        let pages: Vec<Arc<Page>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for page in &pages[1..] {
            assert!(Arc::ptr_eq(&pages[0], page));
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_policy_attached_only_under_prefix() {
        let registry = PageRegistry::new();
        let policy = Arc::new(RobotsPolicy::new("https://example.com/", "User-agent: *"));

        let same_site = registry.get_or_create("https://example.com/x", Some(Arc::clone(&policy)));
        let sub_domain = registry.get_or_create("https://sub.example.com/x", Some(Arc::clone(&policy)));

        assert!(same_site.robots().is_some());
        assert!(sub_domain.robots().is_none());
    }

    #[test]
    fn test_first_creator_policy_wins() {
        let registry = PageRegistry::new();
        let first = Arc::new(RobotsPolicy::new("https://example.com/", "User-agent: *"));
        let second = Arc::new(RobotsPolicy::new("https://example.com/", "User-agent: *\nDisallow: /"));

        registry.get_or_create("https://example.com/x", Some(Arc::clone(&first)));
        let page = registry.get_or_create("https://example.com/x", Some(second));

        assert!(Arc::ptr_eq(&page.robots().unwrap(), &first));
    }

    #[test]
    fn test_is_visited_and_reset() {
        let registry = PageRegistry::new();
        assert!(!registry.is_visited("https://example.com/"));

        registry.get_or_create("https://example.com/", None);
        assert!(registry.is_visited("https://example.com/"));

        registry.reset();
        assert!(!registry.is_visited("https://example.com/"));
        assert!(registry.is_empty());
    }
}
