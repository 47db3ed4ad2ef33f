//! Per-session robots.txt cache
//!
//! Each site root gets one `OnceCell`, so the robots resource of a site is
//! resolved at most once per crawl session even when many pages of that site
//! are processed concurrently. Failed resolutions are cached as "no policy".

use crate::crawler::Fetcher;
use crate::robots::{resolve_policy, RobotsPolicy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;

type PolicySlot = Arc<OnceCell<Option<Arc<RobotsPolicy>>>>;

/// Lazily resolved robots policies keyed by site root
#[derive(Debug, Default)]
pub struct RobotsCache {
    slots: Mutex<HashMap<String, PolicySlot>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the policy for `site_root`, resolving it on first use
    pub async fn policy_for(
        &self,
        site_root: &str,
        fetcher: &dyn Fetcher,
        timeout: Duration,
    ) -> Option<Arc<RobotsPolicy>> {
        let slot = self.slot(site_root);

        slot.get_or_init(|| async {
            match resolve_policy(site_root, fetcher, timeout).await {
                Ok(policy) => {
                    tracing::debug!(
                        "Using robots.txt for {} ({} bytes, fetched {})",
                        site_root,
                        policy.content().len(),
                        policy.fetched_at().to_rfc3339()
                    );
                    Some(Arc::new(policy))
                }
                Err(e) => {
                    tracing::debug!("No robots policy for {}: {}", site_root, e);
                    None
                }
            }
        })
        .await
        .clone()
    }

    /// Number of sites with a resolution started or finished
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, site_root: &str) -> PolicySlot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .entry(site_root.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}
