//! Produces the snapshot served to callers, probing only when the cached
//! one has expired.
//!
//! Concurrent misses serialize on a refresh lock and re-check the cache
//! once they hold it, so a burst of requests after expiry costs a single
//! probe pass. The cache is written once per pass with the complete
//! snapshot; nothing observes a pass in progress.

use std::sync::Arc;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use shared::types::Snapshot;
use crate::cache::ResultCache;
use crate::cache_manager::StoreHandle;
use crate::probe::checker::ReachabilityChecker;
use crate::probe::resolver::resolve;
use crate::registry::Registry;

pub struct SnapshotBuilder {
    registry: Registry,
    checker: Arc<dyn ReachabilityChecker>,
    cache: ResultCache,
    store: Option<StoreHandle>,
    concurrency: usize,
    refresh: Mutex<()>,
}

impl SnapshotBuilder {
    pub fn new(registry: Registry, checker: Arc<dyn ReachabilityChecker>, cache: ResultCache) -> Self {
        Self {
            registry,
            checker,
            cache,
            store: None,
            concurrency: 1,
            refresh: Mutex::new(()),
        }
    }

    /// Persist each pass through `store` and consult it on a cache miss
    pub fn with_store(mut self, store: StoreHandle) -> Self {
        self.store = Some(store);
        self
    }

    /// Allow up to `concurrency` checks in flight during a pass
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current snapshot; never fails.
    pub async fn get_snapshot(&self) -> Arc<Snapshot> {
        if let Some(snapshot) = self.cache.read() {
            return snapshot;
        }

        let _guard = self.refresh.lock().await;

        // Another caller may have finished a pass while we waited
        if let Some(snapshot) = self.cache.read() {
            return snapshot;
        }

        if let Some(snapshot) = self.restore_from_store().await {
            return snapshot;
        }

        let snapshot = Arc::new(self.probe_pass().await);
        let written_at = Utc::now();
        self.cache.write(Arc::clone(&snapshot));

        // Persist the cache write time, not the store's, so the copy on disk
        // never outlives the in-memory entry
        if let Some(store) = &self.store {
            if let Err(e) = store.store(Arc::clone(&snapshot), written_at).await {
                tracing::warn!("Failed to persist snapshot: {:#}", e);
            }
        }

        snapshot
    }

    async fn restore_from_store(&self) -> Option<Arc<Snapshot>> {
        let store = self.store.as_ref()?;

        // Our own entry expired; the store can only hold that same pass or older
        if self.cache.has_entry() {
            return None;
        }

        let stored = match store.load_latest().await {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read persisted snapshot, probing instead: {:#}", e);
                return None;
            }
        };

        // A timestamp from the future (clock skew between writers) is not trusted
        let age = (Utc::now() - stored.stored_at).to_std().ok()?;
        if age >= self.cache.ttl() {
            return None;
        }

        tracing::debug!("Restored persisted snapshot aged {:?}", age);
        let snapshot = Arc::new(stored.snapshot);
        self.cache.restore(Arc::clone(&snapshot), age);
        Some(snapshot)
    }

    async fn probe_pass(&self) -> Snapshot {
        let checked_at = Utc::now();

        let destinations = match self.registry.load().await {
            Ok(destinations) => destinations,
            Err(e) => {
                tracing::warn!("No destinations available: {:#}", e);
                Vec::new()
            }
        };

        let checker = &self.checker;
        let outcomes: Vec<_> = stream::iter(destinations)
            .map(|destination| async move {
                let address = resolve(&destination);
                let reachable = checker.check(&address.host, address.port).await;
                tracing::debug!(
                    "{} ({}:{}) reachable={}",
                    destination.name,
                    address.host,
                    address.port,
                    reachable
                );
                (destination.name, address, reachable)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let snapshot = Snapshot::from_outcomes(checked_at, outcomes);
        tracing::info!(
            "Probe pass complete: {}/{} destinations reachable",
            snapshot.reachable_count(),
            snapshot.len()
        );
        snapshot
    }
}
