//! Explicit query cache.
//!
//! Keys are a namespace plus the canonical JSON description of the filters
//! behind a fetch; values carry the events with their fetch time and
//! staleness window. Nothing invalidates implicitly: publishes invalidate
//! the namespaces they affect, and everything else ages out.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use nostr_sdk::prelude::*;
use parking_lot::RwLock;

#[derive(Debug, Clone)]
struct CacheEntry {
    events: Vec<Event>,
    fetched_at: Instant,
    stale_after: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.stale_after
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key for a fetch: namespace plus filter description.
    pub fn key(namespace: &str, filters: &[Filter]) -> String {
        let description = serde_json::to_string(filters).unwrap_or_default();
        format!("{namespace}:{description}")
    }

    /// Cached events for `key`, if present and not yet stale.
    pub fn get_fresh(&self, key: &str) -> Option<Vec<Event>> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.events.clone())
    }

    pub fn insert(&self, key: String, events: Vec<Event>, stale_after: Duration) {
        self.entries.write().insert(
            key,
            CacheEntry {
                events,
                fetched_at: Instant::now(),
                stale_after,
            },
        );
    }

    /// Drop every entry in a namespace.
    pub fn invalidate_namespace(&self, namespace: &str) {
        let prefix = format!("{namespace}:");
        self.entries
            .write()
            .retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn invalidate_all(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post_event, test_community};

    fn sample_events() -> Vec<Event> {
        let community = test_community();
        vec![post_event(&community.id, &Keys::generate(), "cached", 100)]
    }

    #[test]
    fn test_fresh_hit_then_stale_miss() {
        let cache = QueryCache::new();
        let key = QueryCache::key("posts", &[Filter::new().kind(Kind::from(11))]);

        cache.insert(key.clone(), sample_events(), Duration::from_millis(30));
        assert!(cache.get_fresh(&key).is_some());

        std::thread::sleep(Duration::from_millis(40));
        assert!(
            cache.get_fresh(&key).is_none(),
            "entries past stale_after must miss"
        );
    }

    #[test]
    fn test_namespace_invalidation_is_targeted() {
        let cache = QueryCache::new();
        let posts = QueryCache::key("posts", &[Filter::new().kind(Kind::from(11))]);
        let lists = QueryCache::key("moderation", &[Filter::new().kind(Kind::from(34554))]);

        cache.insert(posts.clone(), sample_events(), Duration::from_secs(60));
        cache.insert(lists.clone(), sample_events(), Duration::from_secs(60));

        cache.invalidate_namespace("posts");
        assert!(cache.get_fresh(&posts).is_none());
        assert!(cache.get_fresh(&lists).is_some());
    }

    #[test]
    fn test_distinct_filters_get_distinct_keys() {
        let a = QueryCache::key("posts", &[Filter::new().kind(Kind::from(11)).limit(10)]);
        let b = QueryCache::key("posts", &[Filter::new().kind(Kind::from(11)).limit(20)]);
        assert_ne!(a, b);
    }
}
