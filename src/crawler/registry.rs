//! Deduplication registries
//!
//! `VisitedRegistry` guarantees each normalized URL is fetched at most once per
//! request. `SentLinkRegistry` guarantees each URL is delivered to a webhook at
//! most once for as long as the registry lives (or until its entry expires).
//! Both admit through a single atomic insert, so concurrent callers racing on
//! the same URL can never both win.

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Size at which a TTL registry first sweeps out expired entries
const SWEEP_THRESHOLD: usize = 1024;

/// Request-scoped set of URLs already scheduled for fetching
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    urls: DashSet<String>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a normalized URL
    ///
    /// Returns true exactly once per distinct URL; every later call with the
    /// same URL returns false.
    pub fn try_admit(&self, normalized_url: &str) -> bool {
        self.urls.insert(normalized_url.to_string())
    }

    pub fn contains(&self, normalized_url: &str) -> bool {
        self.urls.contains(normalized_url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Set of URLs already delivered to a webhook
///
/// With a TTL, an entry older than the TTL no longer blocks delivery and is
/// refreshed by the next admission. Expired entries are swept out whenever the
/// map grows past twice its size after the previous sweep.
#[derive(Debug, Default)]
pub struct SentLinkRegistry {
    sent: DashMap<String, Instant>,
    ttl: Option<Duration>,
    next_sweep: AtomicUsize,
}

impl SentLinkRegistry {
    /// Creates a registry whose entries never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry whose entries expire after `ttl`
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Admits a URL for delivery; false means it was already delivered
    pub fn try_admit(&self, url: &str) -> bool {
        let now = Instant::now();

        let admitted = match self.sent.entry(url.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
            Entry::Occupied(mut entry) => match self.ttl {
                Some(ttl) if now.duration_since(*entry.get()) >= ttl => {
                    entry.insert(now);
                    true
                }
                _ => false,
            },
        };

        // The entry guard is dropped here; sweeping while holding it would deadlock
        if admitted {
            self.maybe_sweep();
        }
        admitted
    }

    /// Removes every entry older than the TTL and returns how many were removed
    ///
    /// Without a TTL nothing ever expires.
    pub fn evict_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let before = self.sent.len();
        let now = Instant::now();
        self.sent.retain(|_, sent_at| now.duration_since(*sent_at) < ttl);
        let removed = before.saturating_sub(self.sent.len());

        if removed > 0 {
            tracing::debug!("Evicted {} expired delivery records", removed);
        }
        removed
    }

    fn maybe_sweep(&self) {
        if self.ttl.is_none() {
            return;
        }

        let limit = self.next_sweep.load(Ordering::Relaxed).max(SWEEP_THRESHOLD);
        if self.sent.len() < limit {
            return;
        }

        self.evict_expired();
        self.next_sweep
            .store((self.sent.len() * 2).max(SWEEP_THRESHOLD), Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    /// Forgets every delivered URL
    pub fn clear(&self) {
        self.sent.clear();
    }
}
