use std::collections::BTreeMap;
use std::path::Path;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params, OptionalExtension};
use shared::types::{ProbeResult, Snapshot};

/// A snapshot read back from disk along with the time it was written.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub snapshot: Snapshot,
    pub stored_at: DateTime<Utc>,
}

/// SQLite copy of the most recent probe pass. Holds at most one snapshot.
pub struct SnapshotDb {
    conn: Connection,
}

impl SnapshotDb {
    /// Open or create the SQLite database with WAL mode enabled
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // Enable WAL mode for better concurrency and crash recovery
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to enable WAL mode")?;

        // Create tables if they don't exist
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS snapshot (
                id          INTEGER PRIMARY KEY CHECK (id = 1),
                checked_at  TEXT NOT NULL,
                stored_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS probe_results (
                name        TEXT PRIMARY KEY,
                host        TEXT NOT NULL,
                port        INTEGER NOT NULL,
                reachable   INTEGER NOT NULL
            );
            "#,
        )
        .context("Failed to create database schema")?;

        Ok(Self { conn })
    }

    /// Replace the stored snapshot. Header and rows change in one transaction,
    /// so a reader never sees a mix of two passes. `stored_at` is when the
    /// writer cached the pass; its age is measured from there.
    pub fn store_snapshot(&self, snapshot: &Snapshot, stored_at: DateTime<Utc>) -> Result<()> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;

        // Rows of the previous pass go first; the header is upserted in place
        tx.execute("DELETE FROM probe_results", [])
            .context("Failed to clear previous results")?;

        tx.execute(
            r#"
            INSERT INTO snapshot (id, checked_at, stored_at) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                checked_at = excluded.checked_at,
                stored_at = excluded.stored_at
            "#,
            params![snapshot.checked_at.to_rfc3339(), stored_at.to_rfc3339()],
        )
        .context("Failed to write snapshot header")?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO probe_results (name, host, port, reachable) VALUES (?1, ?2, ?3, ?4)")
                .context("Failed to prepare insert")?;

            for result in snapshot.results.values() {
                stmt.execute(params![
                    &result.name,
                    &result.host,
                    result.port,
                    result.reachable as i32,
                ])
                .with_context(|| format!("Failed to write result for {}", result.name))?;
            }
        }

        tx.commit().context("Failed to commit snapshot")?;
        Ok(())
    }

    /// Load the stored snapshot, if any pass has been written yet
    pub fn load_latest(&self) -> Result<Option<StoredSnapshot>> {
        let header = self
            .conn
            .query_row(
                "SELECT checked_at, stored_at FROM snapshot WHERE id = 1",
                [],
                |row| {
                    let checked_at: String = row.get(0)?;
                    let stored_at: String = row.get(1)?;
                    Ok((parse_timestamp(0, &checked_at)?, parse_timestamp(1, &stored_at)?))
                },
            )
            .optional()
            .context("Failed to query snapshot header")?;

        let Some((checked_at, stored_at)) = header else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT name, host, port, reachable FROM probe_results")
            .context("Failed to prepare query")?;

        let results = stmt
            .query_map([], |row| {
                let reachable: i32 = row.get(3)?;
                Ok(ProbeResult {
                    name: row.get(0)?,
                    host: row.get(1)?,
                    port: row.get::<_, u16>(2)?,
                    reachable: reachable != 0,
                    checked_at,
                })
            })
            .context("Failed to query probe results")?
            .map(|row| row.map(|result| (result.name.clone(), result)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .context("Failed to collect probe results")?;

        Ok(Some(StoredSnapshot {
            snapshot: Snapshot { checked_at, results },
            stored_at,
        }))
    }
}

fn parse_timestamp(idx: usize, value: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(e),
        ))
}
