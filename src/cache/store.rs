//! Cache Store Module
//!
//! Response memoization engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{
    CacheEntry, CacheKey, CacheStats, EntryMetadata, ImportReport, LruTracker, Snapshot,
    SnapshotEntry, SNAPSHOT_VERSION,
};

// == Cache Store ==
/// Bounded response cache with LRU eviction and lazy TTL expiry.
///
/// Expired entries are never returned. They stay resident until the next
/// `get` for their key, `purge_expired`, or an eviction removes them, and
/// they count towards `stats().size` until then.
///
/// The store is a plain single-owner structure. Share it behind one lock
/// (the HTTP layer uses `Arc<RwLock<CacheStore<_>>>`).
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-entry storage
    entries: HashMap<CacheKey, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Cumulative counters
    stats: CacheStats,
    /// Maximum number of resident entries
    capacity: usize,
    /// TTL applied when `set` gets none
    default_ttl: Duration,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// A capacity of 0 is raised to 1.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries the cache can hold
    /// * `default_ttl` - Lifetime for entries stored without an explicit TTL
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = if capacity == 0 {
            warn!("Cache capacity of 0 is not usable, using 1");
            1
        } else {
            capacity
        };

        Self {
            entries: HashMap::with_capacity(capacity.min(4096)),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
            default_ttl,
        }
    }

    // == Get ==
    /// Looks up the memoized response for a request.
    ///
    /// A hit refreshes the entry's recency and bumps its access count.
    /// An expired entry is removed and reported as a miss.
    pub fn get(&mut self, prompt: &str, model: &str, options: Option<&Value>) -> Option<V>
    where
        V: Clone,
    {
        self.get_at(prompt, model, options, current_timestamp_ms())
    }

    pub(crate) fn get_at(
        &mut self,
        prompt: &str,
        model: &str,
        options: Option<&Value>,
        now: u64,
    ) -> Option<V>
    where
        V: Clone,
    {
        let key = CacheKey::derive(prompt, model, options);

        let expired = match self.entries.get(&key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_key(&key);
            self.stats.record_miss();
            debug!(key = %key, "Dropped expired entry on lookup");
            return None;
        }

        let stamp = self.lru.touch(&key, now);
        let entry = self.entries.get_mut(&key)?;
        entry.record_hit(stamp);
        let value = entry.value.clone();
        self.stats.record_hit();
        Some(value)
    }

    // == Set ==
    /// Stores a response for a request and returns its key.
    ///
    /// Overwriting a resident key resets its TTL and access data and never
    /// evicts. Storing a new key while the store is full evicts the least
    /// recently used entry first.
    ///
    /// # Arguments
    /// * `prompt` - Prompt text of the request
    /// * `value` - The response to memoize
    /// * `model` - Model tag of the request
    /// * `options` - Request options that change the response
    /// * `ttl` - Lifetime of the entry (uses the default TTL if None)
    pub fn set(
        &mut self,
        prompt: &str,
        value: V,
        model: &str,
        options: Option<&Value>,
        ttl: Option<Duration>,
    ) -> CacheKey {
        self.set_at(prompt, value, model, options, ttl, current_timestamp_ms())
    }

    pub(crate) fn set_at(
        &mut self,
        prompt: &str,
        value: V,
        model: &str,
        options: Option<&Value>,
        ttl: Option<Duration>,
        now: u64,
    ) -> CacheKey {
        let key = CacheKey::derive(prompt, model, options);

        // An import may have left the store above capacity
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.capacity {
                if self.evict_lru().is_none() {
                    break;
                }
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut entry = CacheEntry::new(value, model, prompt.len(), ttl, now);
        entry.last_accessed_at = self.lru.touch(&key, now);
        self.entries.insert(key.clone(), entry);
        self.stats.record_set();

        key
    }

    // == Evict LRU ==
    /// Removes the entry with the oldest access time, if any.
    pub(crate) fn evict_lru(&mut self) -> Option<CacheKey> {
        let key = self.lru.evict_oldest()?;
        self.entries.remove(&key);
        self.stats.record_eviction();
        debug!(key = %key, "Evicted least recently used entry");
        Some(key)
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        info!("Cache cleared, {} entries removed", removed);
    }

    // == Metadata ==
    /// Inspects the entry for a request without consuming it.
    ///
    /// Does not count as a hit or miss and leaves recency and access count
    /// untouched. Expired entries read as absent but are not removed.
    pub fn metadata(
        &self,
        prompt: &str,
        model: &str,
        options: Option<&Value>,
    ) -> Option<EntryMetadata> {
        self.metadata_at(prompt, model, options, current_timestamp_ms())
    }

    pub(crate) fn metadata_at(
        &self,
        prompt: &str,
        model: &str,
        options: Option<&Value>,
        now: u64,
    ) -> Option<EntryMetadata> {
        let key = CacheKey::derive(prompt, model, options);
        self.entries
            .get(&key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.metadata(now))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.report(self.entries.len(), self.capacity)
    }

    // == Export ==
    /// Captures every entry that is fresh right now.
    ///
    /// Entries are listed from most to least recently used. Expired
    /// entries are left out but stay resident.
    pub fn export(&self) -> Snapshot<V>
    where
        V: Clone,
    {
        self.export_at(current_timestamp_ms())
    }

    pub(crate) fn export_at(&self, now: u64) -> Snapshot<V>
    where
        V: Clone,
    {
        let entries: Vec<SnapshotEntry<V>> = self
            .lru
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (key, entry)))
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| SnapshotEntry::from_entry(key, entry))
            .collect();

        info!(
            "Exported {} of {} resident entries",
            entries.len(),
            self.entries.len()
        );

        Snapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            entries,
            stats: self.stats(),
        }
    }

    // == Import ==
    /// Restores entries from a snapshot.
    ///
    /// A snapshot with another format version is rejected as a whole.
    /// Otherwise every entry still fresh by its own `expires_at` is inserted
    /// as-is, replacing a resident entry with the same key. Capacity is not
    /// enforced here; the next `set` of a new key evicts back down to it.
    /// Counters are not touched.
    pub fn import(&mut self, snapshot: Snapshot<V>) -> ImportReport {
        self.import_at(snapshot, current_timestamp_ms())
    }

    pub(crate) fn import_at(&mut self, snapshot: Snapshot<V>, now: u64) -> ImportReport {
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "Rejected snapshot with version {} (expected {}), skipping {} entries",
                snapshot.version,
                SNAPSHOT_VERSION,
                snapshot.entries.len()
            );
            return ImportReport {
                imported: 0,
                skipped: snapshot.entries.len(),
                version_mismatch: Some(snapshot.version),
            };
        }

        let mut report = ImportReport::default();
        for record in snapshot.entries {
            if now >= record.expires_at {
                report.skipped += 1;
                continue;
            }
            let (key, entry) = record.into_entry();
            self.lru.place(&key, entry.last_accessed_at);
            self.entries.insert(key, entry);
            report.imported += 1;
        }

        info!(
            "Imported {} entries, skipped {} expired",
            report.imported, report.skipped
        );
        report
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        self.purge_expired_at(current_timestamp_ms())
    }

    pub(crate) fn purge_expired_at(&mut self, now: u64) -> usize {
        let expired_keys: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_key(key);
        }

        expired_keys.len()
    }

    fn remove_key(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.lru.remove(key);
    }

    // == Accessors ==
    /// Returns the current number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    const MODEL: &str = "claude-3-haiku";
    const HOUR: Duration = Duration::from_secs(3600);

    fn store(capacity: usize) -> CacheStore<i32> {
        CacheStore::new(capacity, HOUR)
    }

    #[test]
    fn test_store_new() {
        let store = store(10);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 10);
        assert_eq!(store.default_ttl(), HOUR);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut store = store(0);
        assert_eq!(store.capacity(), 1);

        store.set("a", 1, MODEL, None, None);
        store.set("b", 2, MODEL, None, None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b", MODEL, None), Some(2));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store(10);

        store.set("What is 2+2?", 4, MODEL, None, None);

        assert_eq!(store.get("What is 2+2?", MODEL, None), Some(4));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing_is_miss() {
        let mut store = store(10);

        assert_eq!(store.get("nothing", MODEL, None), None);
        assert_eq!(store.stats().misses, 1);
        assert_eq!(store.stats().hits, 0);
    }

    #[test]
    fn test_key_components_separate_entries() {
        let mut store = store(10);
        let options = json!({"temperature": 0});

        store.set("p", 1, "model-a", None, None);
        store.set("p", 2, "model-b", None, None);
        store.set("p", 3, "model-a", Some(&options), None);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("p", "model-a", None), Some(1));
        assert_eq!(store.get("p", "model-b", None), Some(2));
        assert_eq!(store.get("p", "model-a", Some(&options)), Some(3));
    }

    #[test]
    fn test_separator_bytes_in_text_do_not_alias_entries() {
        let mut store: CacheStore<String> = CacheStore::new(10, HOUR);

        store.set("c", "answer for model a\u{1f}b".to_string(), "a\u{1f}b", None, None);

        assert_eq!(store.get("b\u{1f}c", "a", None), None);
        assert_eq!(
            store.get("c", "a\u{1f}b", None),
            Some("answer for model a\u{1f}b".to_string())
        );
    }

    #[test]
    fn test_set_returns_derived_key() {
        let mut store = store(10);
        let key = store.set("p", 1, MODEL, None, None);
        assert_eq!(key, CacheKey::derive("p", MODEL, None));
    }

    #[test]
    fn test_concrete_lru_scenario() {
        let mut store = store(2);

        store.set_at("A", 1, MODEL, None, None, 1_000);
        store.set_at("B", 2, MODEL, None, None, 1_001);
        assert_eq!(store.get_at("A", MODEL, None, 1_002), Some(1));
        store.set_at("C", 3, MODEL, None, None, 1_003);

        assert_eq!(store.get_at("A", MODEL, None, 1_004), Some(1));
        assert_eq!(store.get_at("B", MODEL, None, 1_005), None);
        assert_eq!(store.get_at("C", MODEL, None, 1_006), Some(3));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_lru_scenario_with_coarse_clock() {
        // All operations share one timestamp; recency order still decides
        let mut store = store(2);

        store.set_at("A", 1, MODEL, None, None, 1_000);
        store.set_at("B", 2, MODEL, None, None, 1_000);
        store.get_at("A", MODEL, None, 1_000);
        store.set_at("C", 3, MODEL, None, None, 1_000);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_at("B", MODEL, None, 1_000), None);
        assert_eq!(store.get_at("A", MODEL, None, 1_000), Some(1));
    }

    #[test]
    fn test_store_lru_eviction_of_untouched_first_entry() {
        let mut store = store(3);

        store.set("key1", 1, MODEL, None, None);
        store.set("key2", 2, MODEL, None, None);
        store.set("key3", 3, MODEL, None, None);
        store.get("key2", MODEL, None);
        store.get("key3", MODEL, None);

        store.set("key4", 4, MODEL, None, None);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("key1", MODEL, None), None);
        assert_eq!(store.get("key2", MODEL, None), Some(2));
        assert_eq!(store.get("key3", MODEL, None), Some(3));
        assert_eq!(store.get("key4", MODEL, None), Some(4));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut store = store(2);

        store.set("a", 1, MODEL, None, None);
        store.set("b", 2, MODEL, None, None);
        store.set("a", 10, MODEL, None, None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("a", MODEL, None), Some(10));
        assert_eq!(store.get("b", MODEL, None), Some(2));
    }

    #[test]
    fn test_overwrite_resets_entry() {
        let mut store = store(10);

        store.set_at("a", 1, MODEL, None, Some(Duration::from_millis(100)), 1_000);
        store.get_at("a", MODEL, None, 1_050);
        store.set_at("a", 2, MODEL, None, Some(Duration::from_millis(100)), 1_080);

        let meta = store.metadata_at("a", MODEL, None, 1_090).unwrap();
        assert_eq!(meta.access_count, 0);
        assert_eq!(meta.age_ms, 10);
        assert_eq!(meta.expires_in_ms, 90);
        assert_eq!(store.stats().sets, 2);
    }

    #[test]
    fn test_ttl_boundary_is_inclusive() {
        let mut store = store(10);

        store.set_at("x", 1, MODEL, None, Some(Duration::from_millis(100)), 5_000);

        assert_eq!(store.get_at("x", MODEL, None, 5_099), Some(1));
        assert_eq!(store.get_at("x", MODEL, None, 5_100), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_default_ttl_applies() {
        let mut store: CacheStore<i32> = CacheStore::new(10, Duration::from_millis(200));

        store.set_at("x", 1, MODEL, None, None, 0);

        assert_eq!(store.metadata_at("x", MODEL, None, 0).unwrap().expires_in_ms, 200);
        assert_eq!(store.get_at("x", MODEL, None, 200), None);
    }

    #[test]
    fn test_ttl_expiration_real_clock() {
        let mut store: CacheStore<String> = CacheStore::new(10, HOUR);

        store.set("X", "v".to_string(), MODEL, None, Some(Duration::from_millis(100)));
        assert_eq!(store.get("X", MODEL, None), Some("v".to_string()));

        sleep(Duration::from_millis(150));

        assert_eq!(store.get("X", MODEL, None), None);
        assert_eq!(store.stats().size, 0);
    }

    #[test]
    fn test_expired_entry_counts_in_size_until_touched() {
        let mut store = store(10);

        store.set_at("x", 1, MODEL, None, Some(Duration::from_millis(10)), 1_000);
        assert_eq!(store.stats().size, 1);

        store.get_at("x", MODEL, None, 2_000);
        assert_eq!(store.stats().size, 0);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_hit_updates_access_data() {
        let mut store = store(10);

        store.set_at("x", 1, MODEL, None, None, 1_000);
        store.get_at("x", MODEL, None, 1_010);
        store.get_at("x", MODEL, None, 1_020);

        let meta = store.metadata_at("x", MODEL, None, 1_030).unwrap();
        assert_eq!(meta.access_count, 2);
        assert_eq!(meta.age_ms, 30);
    }

    #[test]
    fn test_metadata_is_pure() {
        let mut store = store(2);

        store.set_at("a", 1, MODEL, None, None, 1_000);
        store.set_at("b", 2, MODEL, None, None, 1_001);

        // Peeking at "a" must not make it recent
        for now in 1_002..1_010 {
            assert!(store.metadata_at("a", MODEL, None, now).is_some());
        }
        assert!(store.metadata_at("missing", MODEL, None, 1_010).is_none());

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);

        store.set_at("c", 3, MODEL, None, None, 1_011);
        assert_eq!(store.get_at("a", MODEL, None, 1_012), None);
        assert_eq!(store.get_at("b", MODEL, None, 1_013), Some(2));
    }

    #[test]
    fn test_metadata_of_expired_entry_is_absent_but_not_purged() {
        let mut store = store(10);

        store.set_at("x", 1, MODEL, None, Some(Duration::from_millis(10)), 1_000);

        assert!(store.metadata_at("x", MODEL, None, 1_010).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_keeps_counters() {
        let mut store = store(10);

        store.set("a", 1, MODEL, None, None);
        store.get("a", MODEL, None);
        store.get("b", MODEL, None);
        store.clear();

        let stats = store.stats();
        assert!(store.is_empty());
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(store.get("a", MODEL, None), None);
    }

    #[test]
    fn test_store_stats() {
        let mut store = store(10);

        store.set("a", 1, MODEL, None, None);
        store.set("a", 1, MODEL, None, None);
        store.get("a", MODEL, None);
        store.get("a", MODEL, None);
        store.get("a", MODEL, None);
        store.get("b", MODEL, None);

        let stats = store.stats();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.sets, 2);
        assert_eq!(stats.hit_rate, 0.75);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.capacity, 10);
    }

    #[test]
    fn test_backward_clock_step_keeps_lru_order() {
        let mut store = store(2);

        store.set_at("a", 1, MODEL, None, None, 10_000);
        // Wall clock stepped back; "b" is still the more recent insert
        store.set_at("b", 2, MODEL, None, None, 9_000);
        store.get_at("a", MODEL, None, 9_100);
        store.set_at("c", 3, MODEL, None, None, 9_200);

        assert_eq!(store.get_at("b", MODEL, None, 9_300), None);
        assert_eq!(store.get_at("a", MODEL, None, 9_300), Some(1));
        assert_eq!(store.get_at("c", MODEL, None, 9_300), Some(3));

        // Exported access stamps never run backwards through the recency order
        let stamps: Vec<u64> = store
            .export_at(9_400)
            .entries
            .iter()
            .map(|e| e.last_accessed_at)
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn test_evict_lru_on_empty_store() {
        let mut store = store(10);
        assert_eq!(store.evict_lru(), None);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_evict_lru_removes_exactly_one() {
        let mut store = store(10);
        store.set_at("a", 1, MODEL, None, None, 1);
        store.set_at("b", 2, MODEL, None, None, 1);
        store.set_at("c", 3, MODEL, None, None, 1);

        assert!(store.evict_lru().is_some());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_export_skips_expired_without_purging() {
        let mut store = store(10);

        store.set_at("fresh", 1, MODEL, None, None, 1_000);
        store.set_at("stale", 2, MODEL, None, Some(Duration::from_millis(5)), 1_000);

        let snapshot = store.export_at(1_010);

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.entries[0].value, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_export_orders_most_recent_first() {
        let mut store = store(10);

        store.set_at("a", 1, MODEL, None, None, 1_000);
        store.set_at("b", 2, MODEL, None, None, 1_001);
        store.get_at("a", MODEL, None, 1_002);

        let values: Vec<i32> = store
            .export_at(1_003)
            .entries
            .into_iter()
            .map(|e| e.value)
            .collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut source = store(10);
        let options = json!({"max_tokens": 64});
        source.set_at("a", 1, MODEL, None, None, 1_000);
        source.set_at("b", 2, "other-model", Some(&options), None, 1_001);
        source.get_at("a", MODEL, None, 1_002);

        let snapshot = source.export_at(1_003);
        let mut target = store(10);
        let report = target.import_at(snapshot, 1_004);

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 0);
        assert!(!report.is_rejected());
        assert_eq!(target.get_at("a", MODEL, None, 1_005), Some(1));
        assert_eq!(target.get_at("b", "other-model", Some(&options), 1_006), Some(2));
    }

    #[test]
    fn test_import_keeps_entry_fields() {
        let mut source = store(10);
        source.set_at("a", 1, MODEL, None, Some(Duration::from_millis(500)), 1_000);
        source.get_at("a", MODEL, None, 1_100);

        let mut target = store(10);
        target.import_at(source.export_at(1_200), 1_300);

        let meta = target.metadata_at("a", MODEL, None, 1_300).unwrap();
        assert_eq!(meta.access_count, 1);
        assert_eq!(meta.age_ms, 300);
        assert_eq!(meta.expires_in_ms, 200);
    }

    #[test]
    fn test_import_does_not_touch_counters() {
        let mut source = store(10);
        source.set("a", 1, MODEL, None, None);
        source.get("a", MODEL, None);

        let mut target = store(10);
        target.import(source.export());

        let stats = target.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.sets, 0);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_import_skips_entries_expired_by_snapshot_time() {
        let mut source = store(10);
        source.set_at("short", 1, MODEL, None, Some(Duration::from_millis(50)), 1_000);
        source.set_at("long", 2, MODEL, None, Some(Duration::from_millis(500)), 1_000);

        let snapshot = source.export_at(1_010);
        assert_eq!(snapshot.entries.len(), 2);

        let mut target = store(10);
        let report = target.import_at(snapshot, 1_050);

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(target.get_at("long", MODEL, None, 1_060), Some(2));
        assert_eq!(target.get_at("short", MODEL, None, 1_060), None);
    }

    #[test]
    fn test_import_version_mismatch_is_reported() {
        let mut source = store(10);
        source.set("a", 1, MODEL, None, None);
        source.set("b", 2, MODEL, None, None);

        let mut snapshot = source.export();
        snapshot.version = 2;

        let mut target = store(10);
        let report = target.import(snapshot);

        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.version_mismatch, Some(2));
        assert!(target.is_empty());
    }

    #[test]
    fn test_import_may_exceed_capacity_until_next_set() {
        let mut source = store(10);
        for (i, prompt) in ["a", "b", "c", "d"].iter().enumerate() {
            source.set_at(prompt, i as i32, MODEL, None, None, 1_000 + i as u64);
        }

        let mut target = store(2);
        let report = target.import_at(source.export_at(1_010), 1_010);
        assert_eq!(report.imported, 4);
        assert_eq!(target.len(), 4);

        target.set_at("e", 99, MODEL, None, None, 1_020);

        assert_eq!(target.len(), 2);
        assert_eq!(target.get_at("d", MODEL, None, 1_021), Some(3));
        assert_eq!(target.get_at("e", MODEL, None, 1_022), Some(99));
        assert_eq!(target.get_at("a", MODEL, None, 1_023), None);
    }

    #[test]
    fn test_imported_entries_slot_into_lru_order() {
        let mut source = store(10);
        source.set_at("old", 1, MODEL, None, None, 1_000);

        let mut target = store(2);
        target.set_at("live", 2, MODEL, None, None, 2_000);
        target.import_at(source.export_at(1_500), 2_001);

        target.set_at("new", 3, MODEL, None, None, 2_002);

        assert_eq!(target.get_at("old", MODEL, None, 2_003), None);
        assert_eq!(target.get_at("live", MODEL, None, 2_004), Some(2));
    }

    #[test]
    fn test_import_replaces_resident_key() {
        let mut source = store(10);
        source.set_at("a", 1, MODEL, None, None, 1_000);

        let mut target = store(10);
        target.set_at("a", 50, MODEL, None, None, 900);
        let report = target.import_at(source.export_at(1_001), 1_002);

        assert_eq!(report.imported, 1);
        assert_eq!(target.len(), 1);
        assert_eq!(target.get_at("a", MODEL, None, 1_003), Some(1));
    }

    #[test]
    fn test_purge_expired() {
        let mut store = store(10);

        store.set_at("short", 1, MODEL, None, Some(Duration::from_millis(10)), 1_000);
        store.set_at("long", 2, MODEL, None, Some(Duration::from_secs(10)), 1_000);

        assert_eq!(store.purge_expired_at(1_100), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_at("long", MODEL, None, 1_100), Some(2));
        // Purging is not a lookup
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_json_values_are_stored_opaquely() {
        let mut store: CacheStore<Value> = CacheStore::new(10, HOUR);
        let response = json!({
            "content": [{"type": "text", "text": "Hello"}],
            "usage": {"input_tokens": 12, "output_tokens": 3}
        });

        store.set("hi", response.clone(), MODEL, None, None);

        assert_eq!(store.get("hi", MODEL, None), Some(response));
    }
}
