//! Snapshot dependency edge relation.

use rusqlite::{params, Row, Statement};

use super::repository::{Record, Repository};
use super::Store;
use crate::filter::SnapshotDependencyField;
use crate::types::{SnapshotDependency, SnapshotId};

impl Record for SnapshotDependency {
    type Field = SnapshotDependencyField;

    const TABLE: &'static str = "snapshot_deps";

    const COLUMNS: &'static str = "parent_snapshot_id, child_snapshot_id, rank, dependency_id";

    const ORDER_BY: &'static str = "parent_snapshot_id, rank, child_snapshot_id";

    const INSERT: &'static str = "INSERT INTO snapshot_deps \
         (parent_snapshot_id, child_snapshot_id, rank, dependency_id)
         VALUES (?1, ?2, ?3, ?4)";

    const DELETE_ORPHANED: &'static str = "DELETE FROM snapshot_deps
         WHERE NOT EXISTS (
             SELECT 1 FROM snapshots s
             WHERE s.snapshot_id = snapshot_deps.parent_snapshot_id
         )";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            parent: SnapshotId(row.get(0)?),
            child: SnapshotId(row.get(1)?),
            rank: row.get(2)?,
            dependency_id: row.get(3)?,
        })
    }

    fn execute_insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.parent.as_i64(),
            self.child.as_i64(),
            self.rank,
            self.dependency_id,
        ])
    }
}

impl Store {
    /// Accessor for the `snapshot_deps` relation.
    pub fn snapshot_dependencies(&self) -> Repository<'_, SnapshotDependency> {
        Repository::new(self)
    }
}
