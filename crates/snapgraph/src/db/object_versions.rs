//! Object version relation.

use rusqlite::{params, Row, Statement};

use super::repository::{Record, Repository};
use super::Store;
use crate::filter::ObjectVersionField;
use crate::types::{ObjectVersion, ObjectVersionId};

impl Record for ObjectVersion {
    type Field = ObjectVersionField;

    const TABLE: &'static str = "object_versions";

    const COLUMNS: &'static str = "object_version_id, object_id, name, type, subtype";

    const ORDER_BY: &'static str = "object_version_id";

    const INSERT: &'static str = "INSERT INTO object_versions \
         (object_version_id, object_id, name, type, subtype)
         VALUES (?1, ?2, ?3, ?4, ?5)";

    // Unreachable from any snapshot once its last membership is gone.
    const DELETE_ORPHANED: &'static str = "DELETE FROM object_versions
         WHERE NOT EXISTS (
             SELECT 1 FROM memberships m
             WHERE m.object_version_id = object_versions.object_version_id
         )";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            object_version_id: ObjectVersionId(row.get(0)?),
            object_id: row.get(1)?,
            name: row.get(2)?,
            object_type: row.get(3)?,
            subtype: row.get(4)?,
        })
    }

    fn execute_insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.object_version_id.as_i64(),
            self.object_id,
            self.name,
            self.object_type,
            self.subtype,
        ])
    }
}

impl Store {
    /// Accessor for the `object_versions` relation.
    pub fn object_versions(&self) -> Repository<'_, ObjectVersion> {
        Repository::new(self)
    }
}
