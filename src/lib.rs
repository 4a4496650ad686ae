//! Prompt Memo - response memoization for LLM API calls
//!
//! Caches model responses keyed by prompt, model and options, with TTL
//! expiration, LRU eviction, hit/miss statistics and snapshot export/import.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheStore, Snapshot};
pub use config::Config;
pub use error::CacheError;
pub use tasks::spawn_cleanup_task;
