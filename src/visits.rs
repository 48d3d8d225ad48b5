//! Visit Counter
//!
//! Concurrent per-URL request counters, fed by the HTTP middleware.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct VisitCounter {
    counts: DashMap<String, AtomicU64>,
}

impl VisitCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, url: &str) {
        // fast path avoids allocating the key for already-seen URLs
        if let Some(count) = self.counts.get(url) {
            count.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counts
            .entry(url.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self, url: &str) -> u64 {
        self.counts
            .get(url)
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().load(Ordering::Relaxed)))
            .collect()
    }

    /// The URL with the highest count; ties go to the lexicographically smallest.
    pub fn most_visited(&self) -> Option<(String, u64)> {
        self.snapshot()
            .into_iter()
            .fold(None, |best, (url, count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((url, count)),
            })
    }
}
