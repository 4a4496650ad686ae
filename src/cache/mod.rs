//! Cache Module
//!
//! Memoizes model responses keyed by prompt, model and options, with TTL
//! expiration, LRU eviction and snapshot export/import.

mod entry;
mod key;
mod lru;
mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, EntryMetadata};
pub use key::CacheKey;
pub use lru::LruTracker;
pub use snapshot::{ImportReport, Snapshot, SnapshotEntry, SNAPSHOT_VERSION};
pub use stats::{CacheStats, ESTIMATED_SAVINGS_NOTE};
pub use store::CacheStore;
