//! Thread-safe simulation result cache.
//!
//! A bounded TTL store with LRU eviction, keyed by a deterministic hash of
//! the simulation inputs. Snapshots persist to disk atomically; a
//! background scheduler debounces saves while the cache churns.

mod autosave;
mod key;
mod persist;
mod store;

pub use autosave::AutosaveHandle;
pub use key::cache_key;
pub use persist::{CacheSnapshot, SnapshotMetadata};
pub use store::{CacheStats, SimulationCache};

/// Errors from cache persistence.
///
/// These are advisory: callers log them and continue with the in-memory
/// state, which stays dirty so a later save can retry.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
