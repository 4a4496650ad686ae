//! Snapshot Module
//!
//! Versioned, serializable point-in-time copy of the fresh cache entries.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::cache::{CacheEntry, CacheKey, CacheStats};
use crate::error::Result;

/// The only snapshot format this build reads and writes.
pub const SNAPSHOT_VERSION: u32 = 1;

// == Snapshot ==
/// Exported cache state.
///
/// `stats` is a copy taken at export time and is informational only;
/// importing never restores counters, so a snapshot without a stats block
/// still imports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<V> {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry<V>>,
    #[serde(default)]
    pub stats: CacheStats,
}

/// One exported entry with every field needed to rebuild it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry<V> {
    pub key: CacheKey,
    pub value: V,
    pub created_at: u64,
    pub expires_at: u64,
    pub last_accessed_at: u64,
    pub access_count: u64,
    pub model: String,
    pub prompt_size: usize,
}

impl<V: Clone> SnapshotEntry<V> {
    pub fn from_entry(key: &CacheKey, entry: &CacheEntry<V>) -> Self {
        Self {
            key: key.clone(),
            value: entry.value.clone(),
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            last_accessed_at: entry.last_accessed_at,
            access_count: entry.access_count,
            model: entry.model.clone(),
            prompt_size: entry.prompt_size,
        }
    }
}

impl<V> SnapshotEntry<V> {
    /// Splits the record back into its key and a live entry.
    pub fn into_entry(self) -> (CacheKey, CacheEntry<V>) {
        let entry = CacheEntry {
            value: self.value,
            created_at: self.created_at,
            expires_at: self.expires_at,
            last_accessed_at: self.last_accessed_at,
            access_count: self.access_count,
            model: self.model,
            prompt_size: self.prompt_size,
        };
        (self.key, entry)
    }
}

impl<V: Serialize> Snapshot<V> {
    /// Renders the snapshot as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the snapshot as JSON to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

impl<V: DeserializeOwned> Snapshot<V> {
    /// Parses a snapshot from JSON. The version is not checked here;
    /// `CacheStore::import` reports mismatches.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

// == Import Report ==
/// Outcome of restoring a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Entries inserted into the store
    pub imported: usize,
    /// Entries left out (expired, or all of them on a version mismatch)
    pub skipped: usize,
    /// Version found in a rejected snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_mismatch: Option<u32>,
}

impl ImportReport {
    pub fn is_rejected(&self) -> bool {
        self.version_mismatch.is_some()
    }
}
