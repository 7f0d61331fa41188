//! In-process dedup cache of `(tag, url)` pairs already submitted to the store
//!
//! The cache only saves store round-trips. The store's uniqueness constraint
//! stays authoritative, so clearing the cache never produces duplicate rows.

use std::collections::{HashMap, HashSet};

/// Set of `(tag, url)` pairs this process has already enqueued
#[derive(Debug, Default)]
pub struct SeenCache {
    /// URLs keyed by tag, so lookups borrow instead of allocating
    entries: HashMap<String, HashSet<String>>,

    /// Total number of pairs across all tags
    len: usize,

    /// Entry count at which the cache starts over, `None` for unbounded
    limit: Option<usize>,
}

impl SeenCache {
    /// Creates an unbounded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache that is cleared whenever it reaches `limit` entries
    ///
    /// A limit of zero means unbounded.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: (limit > 0).then_some(limit),
            ..Self::default()
        }
    }

    pub fn contains(&self, tag: &str, url: &str) -> bool {
        self.entries
            .get(tag)
            .map_or(false, |urls| urls.contains(url))
    }

    /// Records a pair, returning false if it was already present
    pub fn insert(&mut self, tag: &str, url: &str) -> bool {
        if self.contains(tag, url) {
            return false;
        }

        if let Some(limit) = self.limit {
            if self.len >= limit {
                tracing::debug!("Seen cache reached {} entries, clearing", limit);
                self.entries.clear();
                self.len = 0;
            }
        }

        if !self.entries.contains_key(tag) {
            self.entries.insert(tag.to_string(), HashSet::new());
        }
        if let Some(urls) = self.entries.get_mut(tag) {
            urls.insert(url.to_string());
        }
        self.len += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_contains() {
        let mut cache = SeenCache::new();
        assert!(cache.is_empty());

        assert!(cache.insert("t", "http://ex.com/a"));
        assert!(!cache.insert("t", "http://ex.com/a"));

        assert!(cache.contains("t", "http://ex.com/a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_tags_partition_entries() {
        let mut cache = SeenCache::new();
        cache.insert("a", "http://ex.com/");

        assert!(!cache.contains("b", "http://ex.com/"));
        assert!(cache.insert("b", "http://ex.com/"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_limit_clears_cache() {
        let mut cache = SeenCache::with_limit(2);
        cache.insert("t", "http://ex.com/1");
        cache.insert("t", "http://ex.com/2");
        assert_eq!(cache.len(), 2);

        cache.insert("t", "http://ex.com/3");
        assert_eq!(cache.len(), 1);
        assert!(!cache.contains("t", "http://ex.com/1"));
        assert!(cache.contains("t", "http://ex.com/3"));
    }

    #[test]
    fn test_repeat_insert_at_limit_keeps_entries() {
        let mut cache = SeenCache::with_limit(2);
        cache.insert("t", "http://ex.com/1");
        cache.insert("u", "http://ex.com/1");

        assert!(!cache.insert("t", "http://ex.com/1"));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("u", "http://ex.com/1"));
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        let mut cache = SeenCache::with_limit(0);
        for i in 0..100 {
            cache.insert("t", &format!("http://ex.com/{}", i));
        }
        assert_eq!(cache.len(), 100);
    }
}
