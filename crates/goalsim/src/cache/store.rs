//! In-memory cache store: TTL expiry, LRU eviction, stats

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::persist::{self, CacheSnapshot, SnapshotMetadata};
use super::CacheError;
use crate::config::CacheConfig;

/// Entries sampled when estimating the cache's memory footprint
const MEMORY_SAMPLE: usize = 8;
/// Fixed per-entry bookkeeping estimate (timestamps, map overhead)
const ENTRY_OVERHEAD_BYTES: u64 = 64;

/// One cached value with its lifecycle timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CacheEntry<V> {
    pub value: V,
    /// Unix milliseconds; TTL expiry is measured from insertion
    pub inserted_at_ms: i64,
    /// Unix milliseconds; refreshed on read for LRU bookkeeping
    pub last_access_ms: i64,
    /// Per-entry TTL override in seconds
    pub ttl_secs: Option<u64>,
    /// Monotonic access clock position; rebuilt on load
    #[serde(skip)]
    pub seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now_ms: i64, default_ttl: Duration) -> bool {
        let ttl_ms = self
            .ttl_secs
            .map(|secs| secs.saturating_mul(1_000))
            .unwrap_or(default_ttl.as_millis() as u64) as i64;
        now_ms - self.inserted_at_ms >= ttl_ms
    }
}

fn now_ms() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

#[derive(Debug)]
struct CacheState<V> {
    entries: FxHashMap<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
    dirty: bool,
    /// Access clock for LRU ordering; strictly increasing across get/set
    seq: u64,
    /// Mutation counter; lets a finished save tell whether the state it
    /// wrote is still current before clearing the dirty flag
    version: u64,
}

/// Observability snapshot of the cache
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub ttl_secs: u64,
    pub dirty: bool,
    /// Sampled estimate, not an exhaustive accounting
    pub estimated_bytes: u64,
}

/// Bounded, thread-safe TTL + LRU cache for simulation results.
///
/// One mutex guards the entry map for every structural mutation; a second
/// mutex serializes whole save operations so a scheduled background save
/// and a shutdown save cannot interleave on the snapshot file.
#[derive(Debug)]
pub struct SimulationCache<V> {
    state: Mutex<CacheState<V>>,
    save_lock: Mutex<()>,
    max_entries: usize,
    default_ttl: Duration,
}

impl<V> SimulationCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    #[must_use]
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: FxHashMap::default(),
                hits: 0,
                misses: 0,
                dirty: false,
                seq: 0,
                version: 0,
            }),
            save_lock: Mutex::new(()),
            max_entries: config.max_entries.max(1),
            default_ttl: config.ttl,
        }
    }

    /// Look up a key. Expired entries are removed and count as misses; a
    /// hit refreshes the entry's access position.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = now_ms();
        let mut state = self.state.lock().unwrap();

        let expired = match state.entries.get(key) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired(now, self.default_ttl),
        };

        if expired {
            state.entries.remove(key);
            state.misses += 1;
            state.dirty = true;
            state.version += 1;
            return None;
        }

        state.hits += 1;
        state.seq += 1;
        let seq = state.seq;
        let entry = state.entries.get_mut(key).expect("entry checked above");
        entry.last_access_ms = now;
        entry.seq = seq;
        Some(entry.value.clone())
    }

    /// Insert a value, evicting the least-recently-used entry first when
    /// at capacity. Marks the cache dirty.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let now = now_ms();
        let mut state = self.state.lock().unwrap();

        if !state.entries.contains_key(key) && state.entries.len() >= self.max_entries {
            if let Some(lru_key) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.seq)
                .map(|(k, _)| k.clone())
            {
                tracing::debug!(key = %lru_key, "evicting least-recently-used entry");
                state.entries.remove(&lru_key);
            }
        }

        state.seq += 1;
        let seq = state.seq;
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at_ms: now,
                last_access_ms: now,
                ttl_secs: ttl.map(|t| t.as_secs()),
                seq,
            },
        );
        state.dirty = true;
        state.version += 1;
    }

    /// Remove all entries (no pattern) or entries whose key contains the
    /// pattern substring. Returns the number removed.
    pub fn invalidate(&self, pattern: Option<&str>) -> usize {
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        match pattern {
            None => state.entries.clear(),
            Some(fragment) => state.entries.retain(|key, _| !key.contains(fragment)),
        }
        let removed = before - state.entries.len();
        if removed > 0 {
            state.dirty = true;
            state.version += 1;
        }
        removed
    }

    /// Sweep entries past their TTL. Returns the number removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = now_ms();
        let mut state = self.state.lock().unwrap();
        let before = state.entries.len();
        let default_ttl = self.default_ttl;
        state
            .entries
            .retain(|_, entry| !entry.is_expired(now, default_ttl));
        let removed = before - state.entries.len();
        if removed > 0 {
            state.dirty = true;
            state.version += 1;
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.state.lock().unwrap().dirty
    }

    /// Size, counters, and a sampled memory estimate.
    ///
    /// The estimate serializes at most [`MEMORY_SAMPLE`] entries and
    /// extrapolates, bounding the cost of the stats call itself.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap();
        let total = state.hits + state.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            state.hits as f64 / total as f64
        };

        let sampled: Vec<u64> = state
            .entries
            .iter()
            .take(MEMORY_SAMPLE)
            .map(|(key, entry)| {
                let value_bytes = serde_json::to_vec(&entry.value)
                    .map(|v| v.len() as u64)
                    .unwrap_or(0);
                key.len() as u64 + value_bytes + ENTRY_OVERHEAD_BYTES
            })
            .collect();
        let estimated_bytes = if sampled.is_empty() {
            0
        } else {
            let avg = sampled.iter().sum::<u64>() / sampled.len() as u64;
            avg * state.entries.len() as u64
        };

        CacheStats {
            size: state.entries.len(),
            max_entries: self.max_entries,
            hits: state.hits,
            misses: state.misses,
            hit_rate,
            ttl_secs: self.default_ttl.as_secs(),
            dirty: state.dirty,
            estimated_bytes,
        }
    }

    /// Write a point-in-time snapshot to `path` atomically.
    ///
    /// The snapshot is taken under the structural lock; the whole save is
    /// serialized by the save lock. A failed write leaves the cache dirty
    /// for a later retry.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let _save_guard = self.save_lock.lock().unwrap();

        let (snapshot, version) = {
            let state = self.state.lock().unwrap();
            let snapshot = CacheSnapshot {
                metadata: SnapshotMetadata {
                    timestamp_ms: now_ms(),
                    version: persist::SNAPSHOT_FORMAT_VERSION,
                    hits: state.hits,
                    misses: state.misses,
                },
                entries: state.entries.clone(),
            };
            (snapshot, state.version)
        };

        persist::write_snapshot(path, &snapshot)?;

        let mut state = self.state.lock().unwrap();
        if state.version == version {
            state.dirty = false;
        }
        Ok(())
    }

    /// Load a snapshot from `path`, merging hit/miss counters and dropping
    /// entries already past their TTL. In-memory entries win over snapshot
    /// entries with the same key. Returns the number of entries restored.
    pub fn load(&self, path: &Path) -> Result<usize, CacheError> {
        let snapshot: CacheSnapshot<V> = persist::read_snapshot(path)?;
        let now = now_ms();
        let mut state = self.state.lock().unwrap();

        state.hits += snapshot.metadata.hits;
        state.misses += snapshot.metadata.misses;

        // Restore in last-access order so the rebuilt access clock
        // preserves the snapshot's LRU ordering
        let mut restorable: Vec<(String, CacheEntry<V>)> = snapshot
            .entries
            .into_iter()
            .filter(|(key, entry)| {
                !entry.is_expired(now, self.default_ttl) && !state.entries.contains_key(key)
            })
            .collect();
        restorable.sort_by_key(|(_, entry)| entry.last_access_ms);

        let mut restored = 0;
        for (key, mut entry) in restorable {
            if state.entries.len() >= self.max_entries {
                break;
            }
            state.seq += 1;
            entry.seq = state.seq;
            state.entries.insert(key, entry);
            restored += 1;
        }
        Ok(restored)
    }
}
