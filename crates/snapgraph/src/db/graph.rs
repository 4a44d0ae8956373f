//! Graph operations implemented directly on `Store`.
//!
//! Direct relationship queries are single SQL joins. Traversal and cycle
//! detection load a `GraphView` (all nodes plus all edges of one graph)
//! under a single connection guard.

use rusqlite::{params_from_iter, Connection, Row};

use super::repository::Record;
use super::Store;
use crate::error::Result;
use crate::filter::{ObjectVersionFilter, SnapshotFilter, Value};
use crate::graph::{find_cycles, GraphSource, GraphView, ObjectGraphOps, SnapshotGraphOps};
use crate::types::{Cycle, ObjectVersion, ObjectVersionId, Snapshot, SnapshotId};

/// Prefix every column of a `Record::COLUMNS` list with `alias`.
fn qualified(alias: &str, columns: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run a query returning rows of `R`, binding `params` in order.
fn query_records<R: Record>(conn: &Connection, sql: &str, params: &[Value]) -> Result<Vec<R>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), R::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn id_pair(row: &Row<'_>) -> rusqlite::Result<(i64, i64)> {
    Ok((row.get(0)?, row.get(1)?))
}

impl Store {
    /// Snapshots joined through `snapshot_deps`, selecting the `select` side
    /// of edges whose `match_on` side is `id`.
    fn snapshots_across_edge(
        &self,
        id: SnapshotId,
        match_on: &str,
        select: &str,
    ) -> Result<Vec<Snapshot>> {
        let sql = format!(
            "SELECT DISTINCT {cols}
             FROM snapshot_deps d
             JOIN snapshots s ON s.snapshot_id = d.{select}
             WHERE d.{match_on} = ?
             ORDER BY s.snapshot_id",
            cols = qualified("s", Snapshot::COLUMNS),
        );

        let conn = self.connection()?;
        query_records(&conn, &sql, &[Value::from(id)])
    }

    /// Object versions joined through `object_deps`, selecting the `select`
    /// side of edges whose `match_on` side is `id`.
    fn objects_across_edge(
        &self,
        id: ObjectVersionId,
        match_on: &str,
        select: &str,
    ) -> Result<Vec<ObjectVersion>> {
        let sql = format!(
            "SELECT DISTINCT {cols}
             FROM object_deps d
             JOIN object_versions ov ON ov.object_version_id = d.{select}
             WHERE d.{match_on} = ?
             ORDER BY ov.object_version_id",
            cols = qualified("ov", ObjectVersion::COLUMNS),
        );

        let conn = self.connection()?;
        query_records(&conn, &sql, &[Value::from(id)])
    }
}

impl SnapshotGraphOps for Store {
    fn get_snapshots(&self, filter: &SnapshotFilter) -> Result<Vec<Snapshot>> {
        self.snapshots().list_where(filter)
    }

    fn snapshot_children(&self, id: SnapshotId) -> Result<Vec<Snapshot>> {
        self.snapshots_across_edge(id, "parent_snapshot_id", "child_snapshot_id")
    }

    fn snapshot_where_used(&self, id: SnapshotId) -> Result<Vec<Snapshot>> {
        self.snapshots_across_edge(id, "child_snapshot_id", "parent_snapshot_id")
    }

    fn members_of(&self, id: SnapshotId) -> Result<Vec<ObjectVersion>> {
        let sql = format!(
            "SELECT {cols}
             FROM memberships m
             JOIN object_versions ov ON ov.object_version_id = m.object_version_id
             WHERE m.snapshot_id = ?
             ORDER BY ov.object_version_id",
            cols = qualified("ov", ObjectVersion::COLUMNS),
        );

        let conn = self.connection()?;
        query_records(&conn, &sql, &[Value::from(id)])
    }

    fn detect_snapshot_cycles(&self) -> Result<Vec<Cycle<SnapshotId>>> {
        let graph: GraphView<Snapshot> = self.load_graph()?;
        Ok(find_cycles(&graph))
    }
}

impl ObjectGraphOps for Store {
    fn get_object_versions(
        &self,
        filter: &ObjectVersionFilter,
        snapshot_filter: Option<&SnapshotFilter>,
    ) -> Result<Vec<ObjectVersion>> {
        let Some(snapshot_filter) = snapshot_filter else {
            return self.object_versions().list_where(filter);
        };

        let mut params = Vec::new();
        let object_predicate = filter.to_sql(Some("ov"), &mut params);
        let snapshot_predicate = snapshot_filter.to_sql(Some("s"), &mut params);
        let sql = format!(
            "SELECT DISTINCT {cols}
             FROM object_versions ov
             JOIN memberships m ON m.object_version_id = ov.object_version_id
             JOIN snapshots s ON s.snapshot_id = m.snapshot_id
             WHERE ({object_predicate}) AND ({snapshot_predicate})
             ORDER BY ov.object_version_id",
            cols = qualified("ov", ObjectVersion::COLUMNS),
        );

        let conn = self.connection()?;
        query_records(&conn, &sql, &params)
    }

    fn object_children(&self, id: ObjectVersionId) -> Result<Vec<ObjectVersion>> {
        self.objects_across_edge(id, "parent_object_version_id", "child_object_version_id")
    }

    fn object_where_used(&self, id: ObjectVersionId) -> Result<Vec<ObjectVersion>> {
        self.objects_across_edge(id, "child_object_version_id", "parent_object_version_id")
    }

    fn snapshots_of(&self, id: ObjectVersionId) -> Result<Vec<Snapshot>> {
        let sql = format!(
            "SELECT {cols}
             FROM memberships m
             JOIN snapshots s ON s.snapshot_id = m.snapshot_id
             WHERE m.object_version_id = ?
             ORDER BY s.snapshot_id",
            cols = qualified("s", Snapshot::COLUMNS),
        );

        let conn = self.connection()?;
        query_records(&conn, &sql, &[Value::from(id)])
    }

    fn detect_object_cycles(&self) -> Result<Vec<Cycle<ObjectVersionId>>> {
        let graph: GraphView<ObjectVersion> = self.load_graph()?;
        Ok(find_cycles(&graph))
    }
}

impl GraphSource<Snapshot> for Store {
    fn load_graph(&self) -> Result<GraphView<Snapshot>> {
        let conn = self.connection()?;

        let nodes: Vec<Snapshot> = query_records(
            &conn,
            &format!(
                "SELECT {} FROM snapshots ORDER BY snapshot_id",
                Snapshot::COLUMNS
            ),
            &[],
        )?;

        let mut stmt =
            conn.prepare("SELECT parent_snapshot_id, child_snapshot_id FROM snapshot_deps")?;
        let edges = stmt
            .query_map([], id_pair)?
            .map(|r| r.map(|(p, c)| (SnapshotId(p), SnapshotId(c))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(GraphView::new(nodes, edges))
    }
}

impl GraphSource<ObjectVersion> for Store {
    fn load_graph(&self) -> Result<GraphView<ObjectVersion>> {
        let conn = self.connection()?;

        let nodes: Vec<ObjectVersion> = query_records(
            &conn,
            &format!(
                "SELECT {} FROM object_versions ORDER BY object_version_id",
                ObjectVersion::COLUMNS
            ),
            &[],
        )?;

        let mut stmt = conn.prepare(
            "SELECT parent_object_version_id, child_object_version_id FROM object_deps",
        )?;
        let edges = stmt
            .query_map([], id_pair)?
            .map(|r| r.map(|(p, c)| (ObjectVersionId(p), ObjectVersionId(c))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(GraphView::new(nodes, edges))
    }
}
