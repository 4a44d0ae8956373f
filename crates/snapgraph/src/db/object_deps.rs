//! Object dependency edge relation.

use rusqlite::{params, Row, Statement};

use super::repository::{Record, Repository};
use super::Store;
use crate::filter::ObjectDependencyField;
use crate::types::{ObjectDependency, ObjectVersionId};

impl Record for ObjectDependency {
    type Field = ObjectDependencyField;

    const TABLE: &'static str = "object_deps";

    const COLUMNS: &'static str =
        "parent_object_version_id, child_object_version_id, dependency_type, dependency_name";

    const ORDER_BY: &'static str = "rowid";

    const INSERT: &'static str = "INSERT INTO object_deps \
         (parent_object_version_id, child_object_version_id, dependency_type, dependency_name)
         VALUES (?1, ?2, ?3, ?4)";

    // Only the parent side is checked.
    const DELETE_ORPHANED: &'static str = "DELETE FROM object_deps
         WHERE NOT EXISTS (
             SELECT 1 FROM object_versions ov
             WHERE ov.object_version_id = object_deps.parent_object_version_id
         )";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            parent: ObjectVersionId(row.get(0)?),
            child: ObjectVersionId(row.get(1)?),
            dependency_type: row.get(2)?,
            dependency_name: row.get(3)?,
        })
    }

    fn execute_insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize> {
        stmt.execute(params![
            self.parent.as_i64(),
            self.child.as_i64(),
            self.dependency_type,
            self.dependency_name,
        ])
    }
}

impl Store {
    /// Accessor for the `object_deps` relation.
    pub fn object_dependencies(&self) -> Repository<'_, ObjectDependency> {
        Repository::new(self)
    }
}
