//! In-memory holder of the latest probe pass.

use std::sync::Arc;
use std::time::{Duration, Instant};
use parking_lot::RwLock;
use shared::types::Snapshot;

struct CacheEntry {
    snapshot: Arc<Snapshot>,
    created_at: Instant,
}

impl CacheEntry {
    fn is_valid(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() < ttl
    }
}

/// Single-snapshot cache with age-based expiry.
///
/// An expired entry reads exactly like an empty cache. It is left in place
/// and replaced by the next write.
pub struct ResultCache {
    entry: RwLock<Option<CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached snapshot, if one exists and is younger than the TTL.
    pub fn read(&self) -> Option<Arc<Snapshot>> {
        self.entry
            .read()
            .as_ref()
            .filter(|entry| entry.is_valid(self.ttl))
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Whether any entry is held, expired or not
    pub fn has_entry(&self) -> bool {
        self.entry.read().is_some()
    }

    /// Replace whatever is cached with `snapshot`, aged from now.
    pub fn write(&self, snapshot: Arc<Snapshot>) {
        self.store(snapshot, Instant::now());
    }

    /// Seed the cache with a snapshot that was built `age` ago elsewhere,
    /// so it expires when it would have in its original writer.
    pub fn restore(&self, snapshot: Arc<Snapshot>, age: Duration) {
        let created_at = Instant::now().checked_sub(age).unwrap_or_else(Instant::now);
        self.store(snapshot, created_at);
    }

    fn store(&self, snapshot: Arc<Snapshot>, created_at: Instant) {
        *self.entry.write() = Some(CacheEntry { snapshot, created_at });
    }
}
