//! Cache Statistics Module
//!
//! Tracks hit/miss/set/eviction counters and builds the stats report.

use serde::{Deserialize, Serialize};

/// Note attached to every stats report.
pub const ESTIMATED_SAVINGS_NOTE: &str =
    "Each hit is one upstream model call avoided; multiply hits by the average request cost to estimate savings";

// == Cache Stats ==
/// Counters and derived figures for a cache instance.
///
/// Counters are cumulative for the life of the instance. `size` and
/// `capacity` are filled in when a report is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of lookups answered from the cache
    pub hits: u64,
    /// Number of lookups that found nothing fresh
    pub misses: u64,
    /// Number of `set` calls, inserts and overwrites alike
    pub sets: u64,
    /// Number of entries evicted by the LRU policy
    pub evictions: u64,
    /// hits / (hits + misses), 0.0 before any lookup
    pub hit_rate: f64,
    /// Resident entry count, including expired entries not yet purged
    pub size: usize,
    /// Maximum resident entry count
    pub capacity: usize,
    pub estimated_savings_note: String,
}

impl Default for CacheStats {
    fn default() -> Self {
        Self {
            hits: 0,
            misses: 0,
            sets: 0,
            evictions: 0,
            hit_rate: 0.0,
            size: 0,
            capacity: 0,
            estimated_savings_note: ESTIMATED_SAVINGS_NOTE.to_string(),
        }
    }
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn compute_hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Report ==
    /// Returns a copy with the derived fields filled in.
    pub fn report(&self, size: usize, capacity: usize) -> Self {
        Self {
            hit_rate: self.compute_hit_rate(),
            size,
            capacity,
            ..self.clone()
        }
    }
}
