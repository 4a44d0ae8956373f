//! Snapshot relation.

use rusqlite::{params, params_from_iter, Row, Statement};

use super::repository::{Record, Repository};
use super::Store;
use crate::error::{Error, Result};
use crate::filter::{SnapshotField, Value};
use crate::types::{Snapshot, SnapshotId, SnapshotUpdate};

impl Record for Snapshot {
    type Field = SnapshotField;

    const TABLE: &'static str = "snapshots";

    const COLUMNS: &'static str = "snapshot_id, app_id, branch_id, snapshot_name, branch_name, \
         app_short_name, app_name, is_toolkit, is_objects_processed";

    const ORDER_BY: &'static str = "snapshot_id";

    const INSERT: &'static str = "INSERT INTO snapshots (snapshot_id, app_id, branch_id, \
         snapshot_name, branch_name, app_short_name, app_name, is_toolkit, is_objects_processed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

    // A toolkit snapshot only exists to be depended upon.
    const DELETE_ORPHANED: &'static str = "DELETE FROM snapshots
         WHERE is_toolkit = 1
           AND NOT EXISTS (
               SELECT 1 FROM snapshot_deps d
               WHERE d.child_snapshot_id = snapshots.snapshot_id
           )";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            snapshot_id: SnapshotId(row.get(0)?),
            app_id: row.get(1)?,
            branch_id: row.get(2)?,
            snapshot_name: row.get(3)?,
            branch_name: row.get(4)?,
            app_short_name: row.get(5)?,
            app_name: row.get(6)?,
            is_toolkit: row.get(7)?,
            is_objects_processed: row.get(8)?,
        })
    }

    fn execute_insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.snapshot_id.as_i64(),
            self.app_id,
            self.branch_id,
            self.snapshot_name,
            self.branch_name,
            self.app_short_name,
            self.app_name,
            self.is_toolkit,
            self.is_objects_processed,
        ])
    }
}

impl Store {
    /// Accessor for the `snapshots` relation.
    pub fn snapshots(&self) -> Repository<'_, Snapshot> {
        Repository::new(self)
    }

    /// Apply a partial update to one snapshot.
    ///
    /// Returns [`Error::NotFound`] if no snapshot has the given ID.
    pub fn update_snapshot(&self, id: SnapshotId, update: &SnapshotUpdate) -> Result<()> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        let text_fields = [
            ("snapshot_name = ?", &update.snapshot_name),
            ("branch_name = ?", &update.branch_name),
            ("app_short_name = ?", &update.app_short_name),
            ("app_name = ?", &update.app_name),
        ];
        for (set, field) in text_fields {
            if let Some(v) = field {
                sets.push(set);
                values.push(Value::Text(v.clone()));
            }
        }
        if let Some(v) = update.is_toolkit {
            sets.push("is_toolkit = ?");
            values.push(Value::Bool(v));
        }
        if let Some(v) = update.is_objects_processed {
            sets.push("is_objects_processed = ?");
            values.push(Value::Bool(v));
        }

        let conn = self.connection()?;

        let affected: usize = if sets.is_empty() {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM snapshots WHERE snapshot_id = ?1",
                [id.as_i64()],
                |row| row.get(0),
            )?;
            usize::try_from(count).unwrap_or(0)
        } else {
            values.push(Value::Int(id.as_i64()));
            let sql = format!(
                "UPDATE snapshots SET {} WHERE snapshot_id = ?",
                sets.join(", ")
            );
            conn.execute(&sql, params_from_iter(values.iter()))?
        };

        if affected == 0 {
            return Err(Error::NotFound(format!("snapshot id: {id}")));
        }

        tracing::debug!(snapshot_id = %id, fields = sets.len(), "Snapshot updated");
        Ok(())
    }
}
