//! Atomic snapshot persistence
//!
//! Snapshots are JSON containers of `{ metadata, entries }` written with a
//! write-then-rename so a crash mid-write never corrupts the store.

use std::fs;
use std::io;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::store::CacheEntry;
use super::CacheError;

/// Bumped when the snapshot layout changes
pub(crate) const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Snapshot header: when it was written and the counters to merge on load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub timestamp_ms: i64,
    pub version: u32,
    pub hits: u64,
    pub misses: u64,
}

/// Full persisted form of the cache
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound = "V: Serialize + DeserializeOwned")]
pub struct CacheSnapshot<V> {
    pub metadata: SnapshotMetadata,
    pub(crate) entries: FxHashMap<String, CacheEntry<V>>,
}

/// Write bytes to a file atomically using write-then-rename.
///
/// The content lands in a sibling temp file first; the rename is atomic on
/// POSIX systems, so readers see either the old snapshot or the new one.
fn atomic_write_bytes(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Serialize and atomically write a snapshot, creating the parent
/// directory if needed
pub(crate) fn write_snapshot<V: Serialize + DeserializeOwned>(
    path: &Path,
    snapshot: &CacheSnapshot<V>,
) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = serde_json::to_vec(snapshot)?;
    atomic_write_bytes(path, &bytes)?;
    Ok(())
}

/// Read and deserialize a snapshot
pub(crate) fn read_snapshot<V: DeserializeOwned + Serialize>(
    path: &Path,
) -> Result<CacheSnapshot<V>, CacheError> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn snapshot() -> CacheSnapshot<i64> {
        let mut entries = FxHashMap::default();
        entries.insert(
            "k".to_string(),
            CacheEntry {
                value: 7,
                inserted_at_ms: 1_000,
                last_access_ms: 2_000,
                ttl_secs: None,
                seq: 0,
            },
        );
        CacheSnapshot {
            metadata: SnapshotMetadata {
                timestamp_ms: 3_000,
                version: SNAPSHOT_FORMAT_VERSION,
                hits: 5,
                misses: 2,
            },
            entries,
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        write_snapshot(&path, &snapshot()).unwrap();
        let loaded: CacheSnapshot<i64> = read_snapshot(&path).unwrap();

        assert_eq!(loaded.metadata.hits, 5);
        assert_eq!(loaded.metadata.misses, 2);
        assert_eq!(loaded.entries["k"].value, 7);

        // Temp file must not linger after the rename
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/cache.json");

        write_snapshot(&path, &snapshot()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_a_serialize_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result: Result<CacheSnapshot<i64>, _> = read_snapshot(&path);
        assert!(matches!(result, Err(CacheError::Serialize(_))));
    }
}
