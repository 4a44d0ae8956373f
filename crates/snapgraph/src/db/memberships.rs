//! Snapshot membership relation (object version belongs to snapshot).

use rusqlite::{params, Row, Statement};

use super::repository::{Record, Repository};
use super::Store;
use crate::filter::MembershipField;
use crate::types::{Membership, ObjectVersionId, SnapshotId};

impl Record for Membership {
    type Field = MembershipField;

    const TABLE: &'static str = "memberships";

    const COLUMNS: &'static str = "object_version_id, snapshot_id, object_id";

    const ORDER_BY: &'static str = "snapshot_id, object_version_id";

    const INSERT: &'static str = "INSERT INTO memberships (object_version_id, snapshot_id, object_id)
         VALUES (?1, ?2, ?3)";

    const DELETE_ORPHANED: &'static str = "DELETE FROM memberships
         WHERE NOT EXISTS (
             SELECT 1 FROM snapshots s
             WHERE s.snapshot_id = memberships.snapshot_id
         )";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            object_version_id: ObjectVersionId(row.get(0)?),
            snapshot_id: SnapshotId(row.get(1)?),
            object_id: row.get(2)?,
        })
    }

    fn execute_insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.object_version_id.as_i64(),
            self.snapshot_id.as_i64(),
            self.object_id,
        ])
    }
}

impl Store {
    /// Accessor for the `memberships` relation.
    pub fn memberships(&self) -> Repository<'_, Membership> {
        Repository::new(self)
    }
}
