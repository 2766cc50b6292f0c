//! Execution ledgers, loaded-window markers and synthetic snapshots on top of
//! a [`KeyValueStore`].
//!
//! Every public operation swallows store-layer failures: reads degrade to
//! "nothing cached" and writes degrade to a logged no-op. Callers therefore
//! see a store outage as cache misses, never as errors.
//!
//! `merge` and `mark_loaded` are read-modify-write cycles over a whole key.
//! Two concurrent writers to the same ledger race and the last write wins;
//! the natural-key check keeps content free of duplicates but cannot stop a
//! lost update. A store with an atomic add-if-absent primitive is required
//! to close that gap.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use ares_core::{timestamp, ExecutionRecord, SourceTag};

use crate::backend::KeyValueStore;
use crate::decode::Decoded;

/// Prefix of count-keyed synthetic snapshots.
pub const SNAPSHOT_KEY_PREFIX: &str = "executions:count:";

/// TTL applied to every key when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 3600);

pub fn snapshot_key(count: usize) -> String {
    format!("{}{}", SNAPSHOT_KEY_PREFIX, count)
}

pub fn ledger_key(source: SourceTag) -> String {
    format!("executions:{}:data", source)
}

pub fn windows_key(source: SourceTag) -> String {
    format!("executions:{}:loaded-dates", source)
}

/// Result of folding a batch into a ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Records appended to the ledger.
    pub inserted: usize,
    /// Records dropped because their natural key was already present.
    pub duplicates: usize,
    /// Ledger size after the merge.
    pub total: usize,
    /// Whether the updated ledger reached the store.
    pub persisted: bool,
}

/// Point-in-time view of one source's ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub source: SourceTag,
    pub resident: bool,
    pub records: usize,
    pub loaded_windows: Vec<String>,
}

/// The only component that talks to the key-value store.
pub struct ExecutionCacheStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ExecutionCacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn with_default_ttl(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_TTL)
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.name()
    }

    // ── Typed read/write ──────────────────────────────────────────

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Decoded<T> {
        match self.store.get(key).await {
            Ok(raw) => {
                let decoded = Decoded::from_raw(raw.as_deref());
                if let Decoded::Malformed(ref e) = decoded {
                    warn!(key, error = %e, "discarding malformed cache entry");
                }
                decoded
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed");
                Decoded::Unavailable
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(p) => p,
            Err(e) => {
                warn!(key, error = %e, "cache entry not serializable, write skipped");
                return false;
            }
        };
        match self.store.put(key, payload, self.ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "cache write failed, continuing without cache");
                false
            }
        }
    }

    // ── Synthetic snapshots ───────────────────────────────────────

    /// Previously memoized sample of exactly `count` records.
    pub async fn get_snapshot(&self, count: usize) -> Option<Vec<ExecutionRecord>> {
        let key = snapshot_key(count);
        self.read::<Vec<ExecutionRecord>>(&key)
            .await
            .present()
            .filter(|records| !records.is_empty())
    }

    pub async fn put_snapshot(&self, count: usize, records: &[ExecutionRecord]) {
        self.write(&snapshot_key(count), records).await;
    }

    // ── Ledgers ───────────────────────────────────────────────────

    /// Every record in the source's ledger, in stored order.
    pub async fn get_all(&self, source: SourceTag) -> Vec<ExecutionRecord> {
        self.read(&ledger_key(source))
            .await
            .present()
            .unwrap_or_default()
    }

    /// Records with `executionTime >= start`. Blank or unparseable `start`
    /// yields an empty list.
    pub async fn get_since(&self, source: SourceTag, start: &str) -> Vec<ExecutionRecord> {
        if start.trim().is_empty() {
            return Vec::new();
        }
        let start_time = match timestamp::parse(start) {
            Ok(t) => t,
            Err(e) => {
                warn!(%source, start, error = %e, "unparseable window start");
                return Vec::new();
            }
        };

        let records: Vec<ExecutionRecord> = self
            .get_all(source)
            .await
            .into_iter()
            .filter(|r| r.is_at_or_after(&start_time))
            .collect();
        debug!(%source, start, count = records.len(), "ledger read");
        records
    }

    /// Fold `incoming` into the ledger.
    ///
    /// A record is appended when its natural key is blank or not yet
    /// present; the copy already stored wins over a later duplicate. The
    /// whole ledger is written back in one `put`. Nothing is written when
    /// the stored ledger could not be read.
    pub async fn merge(&self, source: SourceTag, incoming: Vec<ExecutionRecord>) -> MergeOutcome {
        if incoming.is_empty() {
            return MergeOutcome {
                persisted: true,
                ..MergeOutcome::default()
            };
        }

        let key = ledger_key(source);
        let mut ledger: Vec<ExecutionRecord> = match self.read(&key).await {
            Decoded::Present(records) => records,
            Decoded::Absent | Decoded::Malformed(_) => Vec::new(),
            Decoded::Unavailable => {
                warn!(%source, "ledger unreadable, merge skipped");
                return MergeOutcome::default();
            }
        };

        let mut seen: HashSet<String> = ledger
            .iter()
            .filter_map(|r| r.natural_key().map(str::to_string))
            .collect();

        let mut outcome = MergeOutcome::default();
        for record in incoming {
            if let Some(k) = record.natural_key() {
                if !seen.insert(k.to_string()) {
                    outcome.duplicates += 1;
                    continue;
                }
            }
            ledger.push(record);
            outcome.inserted += 1;
        }

        outcome.total = ledger.len();
        outcome.persisted = self.write(&key, &ledger).await;
        info!(
            %source,
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            total = outcome.total,
            "ledger merged"
        );
        outcome
    }

    // ── Loaded windows ────────────────────────────────────────────

    /// Window markers recorded for `source`, compared as exact text.
    pub async fn loaded_windows(&self, source: SourceTag) -> BTreeSet<String> {
        self.read::<Vec<String>>(&windows_key(source))
            .await
            .present()
            .map(|v| v.into_iter().collect())
            .unwrap_or_default()
    }

    pub async fn is_loaded(&self, source: SourceTag, start: &str) -> bool {
        if start.trim().is_empty() {
            return false;
        }
        self.loaded_windows(source).await.contains(start)
    }

    /// Record `start` verbatim. Only call after the fetch scoped to `start`
    /// has been merged.
    pub async fn mark_loaded(&self, source: SourceTag, start: &str) {
        if start.trim().is_empty() {
            return;
        }
        let mut windows = self.loaded_windows(source).await;
        if windows.insert(start.to_string()) {
            let list: Vec<&String> = windows.iter().collect();
            self.write(&windows_key(source), &list).await;
            debug!(%source, start, "window marked loaded");
        }
    }

    // ── Maintenance ───────────────────────────────────────────────

    pub async fn stats(&self, source: SourceTag) -> LedgerStats {
        let resident = match self.store.exists(&ledger_key(source)).await {
            Ok(b) => b,
            Err(e) => {
                warn!(%source, error = %e, "cache exists check failed");
                false
            }
        };
        let records = if resident { self.get_all(source).await.len() } else { 0 };
        LedgerStats {
            source,
            resident,
            records,
            loaded_windows: self.loaded_windows(source).await.into_iter().collect(),
        }
    }

    /// Delete every snapshot, ledger and window set. Not isolated from
    /// in-flight merges; a racing write can repopulate a ledger afterwards.
    pub async fn clear(&self) {
        let pattern = format!("{}*", SNAPSHOT_KEY_PREFIX);
        match self.store.delete_pattern(&pattern).await {
            Ok(n) => debug!(removed = n, "snapshot entries cleared"),
            Err(e) => warn!(error = %e, "failed to clear snapshot entries"),
        }

        for source in SourceTag::ALL {
            for key in [ledger_key(source), windows_key(source)] {
                if let Err(e) = self.store.delete(&key).await {
                    warn!(key = %key, error = %e, "failed to delete cache key");
                }
            }
        }
        info!("execution cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::error::StorageError;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;

    /// Store that fails every call.
    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Backend("down".into()))
        }
        async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), StorageError> {
            Err(StorageError::Backend("down".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("down".into()))
        }
        async fn delete_pattern(&self, _pattern: &str) -> Result<u64, StorageError> {
            Err(StorageError::Backend("down".into()))
        }
        async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
            Err(StorageError::Backend("down".into()))
        }
        fn name(&self) -> &'static str {
            "failing"
        }
    }

    /// Memory store whose next `get` can be made to fail once.
    struct FlakyStore {
        inner: MemoryStore,
        fail_next_get: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: MemoryStore::new(),
                fail_next_get: AtomicBool::new(false),
            })
        }

        fn fail_next_get(&self) {
            self.fail_next_get.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(StorageError::Backend("timeout".into()));
            }
            self.inner.get(key).await
        }
        async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StorageError> {
            self.inner.put(key, value, ttl).await
        }
        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }
        async fn delete_pattern(&self, pattern: &str) -> Result<u64, StorageError> {
            self.inner.delete_pattern(pattern).await
        }
        async fn exists(&self, key: &str) -> Result<bool, StorageError> {
            self.inner.exists(key).await
        }
        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    fn cache() -> (Arc<MemoryStore>, ExecutionCacheStore) {
        let store = Arc::new(MemoryStore::new());
        let cache = ExecutionCacheStore::with_default_ttl(store.clone());
        (store, cache)
    }

    fn rec(key: &str, time: &str) -> ExecutionRecord {
        ExecutionRecord {
            trade_id: Some(key.to_string()).filter(|k| !k.is_empty()),
            execution_time: Some(timestamp::parse(time).unwrap()),
            ..Default::default()
        }
    }

    fn keys(records: &[ExecutionRecord]) -> Vec<String> {
        let mut keys: Vec<String> = records
            .iter()
            .map(|r| r.trade_id.clone().unwrap_or_default())
            .collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn merge_skips_existing_keys_and_keeps_first_copy() {
        let (_, cache) = cache();
        cache
            .merge(SourceTag::RealApi, vec![rec("A", "2025-01-01 09:00:00")])
            .await;

        let mut newer = rec("A", "2025-01-05 09:00:00");
        newer.display.side = Some("SELL".into());
        let outcome = cache
            .merge(SourceTag::RealApi, vec![newer, rec("B", "2025-01-01 10:00:00")])
            .await;

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.total, 2);
        assert!(outcome.persisted);

        let all = cache.get_all(SourceTag::RealApi).await;
        assert_eq!(keys(&all), vec!["A", "B"]);
        let a = all.iter().find(|r| r.natural_key() == Some("A")).unwrap();
        assert_eq!(a.display.side, None);
    }

    #[tokio::test]
    async fn merge_dedups_within_a_single_batch() {
        let (_, cache) = cache();
        let outcome = cache
            .merge(
                SourceTag::MockApi,
                vec![rec("A", "2025-01-01 09:00:00"), rec("A", "2025-01-01 09:00:00")],
            )
            .await;
        assert_eq!(outcome.inserted, 1);
        assert_eq!(cache.get_all(SourceTag::MockApi).await.len(), 1);
    }

    #[tokio::test]
    async fn blank_keys_are_always_appended() {
        let (_, cache) = cache();
        let blank = rec("", "2025-01-01 09:00:00");
        cache.merge(SourceTag::RealApi, vec![blank.clone()]).await;
        cache.merge(SourceTag::RealApi, vec![blank]).await;
        assert_eq!(cache.get_all(SourceTag::RealApi).await.len(), 2);
    }

    #[tokio::test]
    async fn ledgers_are_isolated_per_source() {
        let (_, cache) = cache();
        cache
            .merge(SourceTag::MockApi, vec![rec("A", "2025-01-01 09:00:00")])
            .await;
        assert!(cache.get_all(SourceTag::RealApi).await.is_empty());
        assert_eq!(cache.get_all(SourceTag::MockApi).await.len(), 1);
    }

    #[tokio::test]
    async fn get_since_is_inclusive_and_skips_untimed() {
        let (_, cache) = cache();
        let untimed = ExecutionRecord {
            trade_id: Some("U".into()),
            ..Default::default()
        };
        cache
            .merge(
                SourceTag::RealApi,
                vec![
                    rec("EARLY", "2024-12-31 23:59:59"),
                    rec("EXACT", "2025-01-01 00:00:00"),
                    rec("LATE", "2025-01-02 08:00:00"),
                    untimed,
                ],
            )
            .await;

        let since = cache.get_since(SourceTag::RealApi, "2025-01-01 00:00:00").await;
        assert_eq!(keys(&since), vec!["EXACT", "LATE"]);
    }

    #[tokio::test]
    async fn get_since_with_bad_input_is_empty() {
        let (_, cache) = cache();
        cache
            .merge(SourceTag::RealApi, vec![rec("A", "2025-01-01 09:00:00")])
            .await;
        assert!(cache.get_since(SourceTag::RealApi, "").await.is_empty());
        assert!(cache.get_since(SourceTag::RealApi, "not a date").await.is_empty());
        assert!(cache
            .get_since(SourceTag::RealApi, "2025-01-01T00:00:00")
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn loaded_windows_use_exact_text() {
        let (_, cache) = cache();
        assert!(!cache.is_loaded(SourceTag::RealApi, "2025-01-01 00:00:00").await);

        cache.mark_loaded(SourceTag::RealApi, "2025-01-01 00:00:00").await;
        assert!(cache.is_loaded(SourceTag::RealApi, "2025-01-01 00:00:00").await);
        // same instant, different text
        assert!(!cache.is_loaded(SourceTag::RealApi, "2025-01-01 00:00:00 ").await);
        assert!(!cache.is_loaded(SourceTag::MockApi, "2025-01-01 00:00:00").await);

        cache.mark_loaded(SourceTag::RealApi, "").await;
        assert_eq!(cache.loaded_windows(SourceTag::RealApi).await.len(), 1);
        assert!(!cache.is_loaded(SourceTag::RealApi, "").await);
    }

    #[tokio::test]
    async fn windows_are_stored_as_a_json_array() {
        let (store, cache) = cache();
        cache.mark_loaded(SourceTag::MockApi, "2025-01-02 00:00:00").await;
        cache.mark_loaded(SourceTag::MockApi, "2025-01-01 00:00:00").await;
        let raw = store
            .get("executions:mock-api:loaded-dates")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, r#"["2025-01-01 00:00:00","2025-01-02 00:00:00"]"#);
    }

    #[tokio::test]
    async fn snapshots_round_trip_by_count() {
        let (_, cache) = cache();
        assert!(cache.get_snapshot(3).await.is_none());

        let sample = vec![rec("S1", "2024-12-18 17:00:00")];
        cache.put_snapshot(3, &sample).await;
        assert_eq!(cache.get_snapshot(3).await, Some(sample));
        assert!(cache.get_snapshot(4).await.is_none());
    }

    #[tokio::test]
    async fn malformed_entries_read_as_absent() {
        let (store, cache) = cache();
        store
            .put("executions:real-api:data", "{broken".into(), DEFAULT_TTL)
            .await
            .unwrap();
        assert!(cache.get_all(SourceTag::RealApi).await.is_empty());

        // a merge over a malformed ledger starts fresh
        let outcome = cache
            .merge(SourceTag::RealApi, vec![rec("A", "2025-01-01 09:00:00")])
            .await;
        assert_eq!(outcome.total, 1);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let (store, cache) = cache();
        for source in SourceTag::ALL {
            cache.merge(source, vec![rec("A", "2025-01-01 09:00:00")]).await;
            cache.mark_loaded(source, "2025-01-01 00:00:00").await;
        }
        cache.put_snapshot(10, &[rec("S", "2024-12-18 17:00:00")]).await;
        cache.put_snapshot(2000, &[rec("S", "2024-12-18 17:00:00")]).await;

        cache.clear().await;

        for source in SourceTag::ALL {
            assert!(cache.get_all(source).await.is_empty());
            assert!(!cache.is_loaded(source, "2025-01-01 00:00:00").await);
        }
        assert!(cache.get_snapshot(10).await.is_none());
        assert!(cache.get_snapshot(2000).await.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn stats_report_residency() {
        let (_, cache) = cache();
        let empty = cache.stats(SourceTag::RealApi).await;
        assert!(!empty.resident);
        assert_eq!(empty.records, 0);

        cache
            .merge(SourceTag::RealApi, vec![rec("A", "2025-01-01 09:00:00")])
            .await;
        cache.mark_loaded(SourceTag::RealApi, "2025-01-01 00:00:00").await;
        let stats = cache.stats(SourceTag::RealApi).await;
        assert!(stats.resident);
        assert_eq!(stats.records, 1);
        assert_eq!(stats.loaded_windows, vec!["2025-01-01 00:00:00"]);
    }

    #[tokio::test]
    async fn store_outage_degrades_to_misses() {
        let cache = ExecutionCacheStore::with_default_ttl(Arc::new(FailingStore));

        let outcome = cache
            .merge(SourceTag::RealApi, vec![rec("A", "2025-01-01 09:00:00")])
            .await;
        assert_eq!(outcome.inserted, 0);
        assert!(!outcome.persisted);

        cache.mark_loaded(SourceTag::RealApi, "2025-01-01 00:00:00").await;
        assert!(!cache.is_loaded(SourceTag::RealApi, "2025-01-01 00:00:00").await);
        assert!(cache.get_all(SourceTag::RealApi).await.is_empty());
        assert!(cache.get_snapshot(1).await.is_none());
        assert!(!cache.stats(SourceTag::RealApi).await.resident);
        cache.clear().await;
    }

    #[tokio::test]
    async fn unreadable_ledger_is_not_overwritten() {
        let store = FlakyStore::new();
        let cache = ExecutionCacheStore::with_default_ttl(store.clone());
        cache
            .merge(
                SourceTag::RealApi,
                vec![rec("A", "2025-01-01 08:00:00"), rec("B", "2025-01-01 12:00:00")],
            )
            .await;

        store.fail_next_get();
        let outcome = cache
            .merge(SourceTag::RealApi, vec![rec("C", "2025-01-01 18:30:00")])
            .await;
        assert!(!outcome.persisted);
        assert_eq!(outcome.inserted, 0);
        assert_eq!(keys(&cache.get_all(SourceTag::RealApi).await), vec!["A", "B"]);

        let outcome = cache
            .merge(SourceTag::RealApi, vec![rec("C", "2025-01-01 18:30:00")])
            .await;
        assert!(outcome.persisted);
        assert_eq!(keys(&cache.get_all(SourceTag::RealApi).await), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn empty_batch_counts_as_persisted() {
        let (_, cache) = cache();
        let outcome = cache.merge(SourceTag::MockApi, Vec::new()).await;
        assert!(outcome.persisted);
        assert_eq!(outcome.total, 0);
    }
}
