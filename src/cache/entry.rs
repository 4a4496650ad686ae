//! Cache Entry Module
//!
//! Defines a single memoized response together with its freshness and access metadata.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

// == Cache Entry ==
/// One memoized answer to a (prompt, model, options) request.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// The stored payload, opaque to the cache
    pub value: V,
    /// Insertion timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Timestamp of the most recent hit, starts at `created_at`
    pub last_accessed_at: u64,
    /// Number of hits served from this entry
    pub access_count: u64,
    /// Model tag the response was produced by
    pub model: String,
    /// Prompt length in bytes, kept for statistics only
    pub prompt_size: usize,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry that expires `ttl` after `now`.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `model` - Model tag of the request
    /// * `prompt_size` - Prompt length in bytes
    /// * `ttl` - Lifetime of the entry
    /// * `now` - Insertion timestamp in Unix milliseconds
    pub fn new(value: V, model: &str, prompt_size: usize, ttl: Duration, now: u64) -> Self {
        Self {
            value,
            created_at: now,
            expires_at: now.saturating_add(duration_ms(ttl)),
            last_accessed_at: now,
            access_count: 0,
            model: model.to_string(),
            prompt_size,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// The boundary is inclusive on the expiry side: once `now` reaches
    /// `expires_at` the entry is gone.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    // == Record Hit ==
    /// Marks a successful read at `now`.
    pub fn record_hit(&mut self, now: u64) {
        self.last_accessed_at = now;
        self.access_count += 1;
    }

    // == Age / Remaining ==
    /// Milliseconds elapsed since insertion.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Milliseconds left before expiry, 0 once expired.
    pub fn expires_in_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }

    // == Metadata ==
    /// Describes the entry as seen at `now` without touching it.
    pub fn metadata(&self, now: u64) -> EntryMetadata {
        EntryMetadata {
            exists: true,
            age_ms: self.age_ms(now),
            expires_in_ms: self.expires_in_ms(now),
            access_count: self.access_count,
            model: self.model.clone(),
        }
    }
}

// == Entry Metadata ==
/// Read-only view of an entry, without its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryMetadata {
    pub exists: bool,
    pub age_ms: u64,
    pub expires_in_ms: u64,
    pub access_count: u64,
    pub model: String,
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0 rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(duration_ms)
        .unwrap_or(0)
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
