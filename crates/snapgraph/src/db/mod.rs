//! `SQLite` storage layer for the graph engine.
//!
//! `SQLite` is the source of truth for all five relations. See the `graph`
//! module for traversal built on top of this layer.
//!
//! ## Module Structure
//!
//! - `schema` - Database schema (DDL)
//! - `repository` - `Record` trait and the generic `Repository` accessor
//! - `snapshots` - Snapshot relation and partial updates
//! - `object_versions` - Object version relation
//! - `object_deps` - Object dependency edges
//! - `snapshot_deps` - Snapshot dependency edges
//! - `memberships` - Object version membership in snapshots
//! - `graph` - Graph query operations (`SnapshotGraphOps`, `ObjectGraphOps`)

mod graph;
mod memberships;
mod object_deps;
mod object_versions;
mod repository;
mod schema;
mod snapshot_deps;
mod snapshots;

pub use repository::{Record, Repository};
pub(crate) use schema::SCHEMA;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::types::StoreStats;

/// `SQLite` database holding the dependency graph.
///
/// The connection is wrapped in a `Mutex`; each operation holds the guard
/// only for its own duration, so readers and writers interleave at call
/// granularity and never across calls.
pub struct Store {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create the database at `path` with default settings.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(&GraphConfig::with_database(path))
    }

    /// Open or create the database described by `config`.
    pub fn open_with(config: &GraphConfig) -> Result<Self> {
        config.validate()?;
        let path = &config.database;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::StoreUnavailable(format!("cannot open {}: {e}", path.display()))
        })?;

        conn.busy_timeout(config.busy_timeout())?;
        if config.wal {
            conn.pragma_update(None, "journal_mode", "WAL")?;
        }
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(path = %path.display(), wal = config.wal, "Opened graph store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.clone()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StoreUnavailable(format!("cannot open in-memory store: {e}")))?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the database file, or `None` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Acquire the connection lock.
    ///
    /// Used internally by all database operations.
    pub(crate) fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            Error::StoreUnavailable(format!(
                "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
            ))
        })
    }

    /// Row counts for every relation.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.connection()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
            Ok(usize::try_from(n).unwrap_or(0))
        };

        Ok(StoreStats {
            snapshots: count("snapshots")?,
            object_versions: count("object_versions")?,
            object_dependencies: count("object_deps")?,
            snapshot_dependencies: count("snapshot_deps")?,
            memberships: count("memberships")?,
        })
    }

    /// Update `SQLite` query planner statistics.
    ///
    /// Worth calling after bulk ingestion.
    pub fn analyze(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute_batch("ANALYZE")?;
        Ok(())
    }

    /// Vacuum the database.
    pub fn vacuum(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute_batch("VACUUM")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Snapshot, SnapshotId};

    #[test]
    fn open_creates_database_and_schema() {
        let dir = tempfile::tempdir().expect("should create temp directory");
        let path = dir.path().join("nested").join("graph.db");

        let store = Store::open(&path).expect("failed to open database");
        let conn = store.connection().expect("should get connection");

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            tables,
            vec![
                "memberships",
                "object_deps",
                "object_versions",
                "snapshot_deps",
                "snapshots"
            ]
        );
        assert!(path.exists());
    }

    #[test]
    fn reopening_keeps_rows() {
        let dir = tempfile::tempdir().expect("should create temp directory");
        let path = dir.path().join("graph.db");

        {
            let store = Store::open(&path).unwrap();
            store
                .snapshots()
                .insert(&Snapshot {
                    snapshot_id: SnapshotId(1),
                    app_id: 1,
                    branch_id: 1,
                    snapshot_name: "s".to_string(),
                    branch_name: "b".to_string(),
                    app_short_name: "A".to_string(),
                    app_name: "App".to_string(),
                    is_toolkit: false,
                    is_objects_processed: false,
                })
                .unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.stats().unwrap().snapshots, 1);
    }

    #[test]
    fn stats_start_at_zero() {
        let store = Store::open_in_memory().unwrap();

        let stats = store.stats().unwrap();

        assert_eq!(stats, StoreStats::default());
        assert_eq!(stats.total(), 0);
    }
}
