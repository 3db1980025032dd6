use std::sync::Arc;
use std::thread;
use tokio::sync::{mpsc, oneshot};
use anyhow::Result;
use chrono::{DateTime, Utc};
use shared::types::Snapshot;
use crate::cache::db::{SnapshotDb, StoredSnapshot};

/// Commands sent to the store thread
pub enum StoreCommand {
    Store(Arc<Snapshot>, DateTime<Utc>, oneshot::Sender<Result<()>>),
    LoadLatest(oneshot::Sender<Result<Option<StoredSnapshot>>>),
    Shutdown,
}

/// Handle to the thread that owns the snapshot database
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    /// Spawn the store thread around an opened database
    pub fn spawn(db: SnapshotDb) -> Self {
        let (tx, mut rx) = mpsc::channel::<StoreCommand>(32);

        thread::spawn(move || {
            while let Some(cmd) = rx.blocking_recv() {
                match cmd {
                    StoreCommand::Store(snapshot, stored_at, reply) => {
                        let _ = reply.send(db.store_snapshot(&snapshot, stored_at));
                    }
                    StoreCommand::LoadLatest(reply) => {
                        let _ = reply.send(db.load_latest());
                    }
                    StoreCommand::Shutdown => {
                        tracing::info!("Snapshot store thread shutting down");
                        break;
                    }
                }
            }
        });

        Self { tx }
    }

    /// Persist a finished snapshot cached at `stored_at`, replacing the previous one
    pub async fn store(&self, snapshot: Arc<Snapshot>, stored_at: DateTime<Utc>) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(StoreCommand::Store(snapshot, stored_at, reply)).await?;
        rx.await?
    }

    /// Latest persisted snapshot, if any
    pub async fn load_latest(&self) -> Result<Option<StoredSnapshot>> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(StoreCommand::LoadLatest(reply)).await?;
        rx.await?
    }

    /// Shutdown the store thread
    pub async fn shutdown(&self) -> Result<()> {
        self.tx.send(StoreCommand::Shutdown).await?;
        Ok(())
    }
}
