//! LRU Tracker Module
//!
//! Keeps resident keys ordered by last access time for eviction.

use std::collections::VecDeque;

use crate::cache::CacheKey;

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque together with their last access timestamp:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Timestamps never increase from front to back, so the back is always an
/// entry with the minimum `last_accessed_at`. Among equal timestamps the key
/// that reached it first sits closer to the back. `touch` clamps its stamp
/// to the current front, so a wall clock stepping backwards cannot break
/// the ordering.
#[derive(Debug, Default)]
pub struct LruTracker {
    order: VecDeque<(CacheKey, u64)>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as used at `at` (moves to front).
    ///
    /// Returns the recorded stamp: `at`, or the front's stamp if `at` is
    /// older than it.
    pub fn touch(&mut self, key: &CacheKey, at: u64) -> u64 {
        self.remove(key);
        let at = self
            .order
            .front()
            .map_or(at, |(_, newest)| at.max(*newest));
        self.order.push_front((key.clone(), at));
        at
    }

    // == Place ==
    /// Inserts a key according to an existing access timestamp.
    ///
    /// Used when restoring entries whose `last_accessed_at` predates the
    /// keys already tracked. The key lands behind every key accessed at or
    /// after `at`.
    pub fn place(&mut self, key: &CacheKey, at: u64) {
        self.remove(key);
        let position = self
            .order
            .iter()
            .position(|(_, seen)| *seen < at)
            .unwrap_or(self.order.len());
        self.order.insert(position, (key.clone(), at));
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &CacheKey) {
        self.order.retain(|(k, _)| k != key);
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<CacheKey> {
        self.order.pop_back().map(|(key, _)| key)
    }

    // == Iterate ==
    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &CacheKey> {
        self.order.iter().map(|(key, _)| key)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }
}
