//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use snapgraph::{
    Membership, ObjectDependency, ObjectVersion, ObjectVersionId, SnapGraph, Snapshot,
    SnapshotDependency, SnapshotId,
};
use tempfile::TempDir;

/// A graph backed by a database file in its own temporary directory.
pub struct TestGraph {
    pub graph: SnapGraph,
    _dir: TempDir,
}

impl std::ops::Deref for TestGraph {
    type Target = SnapGraph;

    fn deref(&self) -> &SnapGraph {
        &self.graph
    }
}

pub fn temp_graph() -> TestGraph {
    let dir = tempfile::tempdir().expect("create temp dir");
    let graph = SnapGraph::open(&dir.path().join("graph.db")).expect("open graph");
    TestGraph { graph, _dir: dir }
}

pub fn snapshot(id: i64, app_id: i64, is_toolkit: bool) -> Snapshot {
    Snapshot {
        snapshot_id: SnapshotId(id),
        app_id,
        branch_id: 1,
        snapshot_name: format!("snapshot-{id}"),
        branch_name: "main".to_string(),
        app_short_name: format!("APP{app_id}"),
        app_name: format!("Application {app_id}"),
        is_toolkit,
        is_objects_processed: false,
    }
}

pub fn depends(parent: i64, child: i64) -> SnapshotDependency {
    SnapshotDependency {
        parent: SnapshotId(parent),
        child: SnapshotId(child),
        rank: 1,
        dependency_id: parent * 1000 + child,
    }
}

pub fn version(id: i64) -> ObjectVersion {
    ObjectVersion {
        object_version_id: ObjectVersionId(id),
        object_id: id,
        name: format!("object-{id}"),
        object_type: "interface".to_string(),
        subtype: None,
    }
}

pub fn member(object_version: i64, snapshot: i64) -> Membership {
    Membership {
        object_version_id: ObjectVersionId(object_version),
        snapshot_id: SnapshotId(snapshot),
        object_id: object_version,
    }
}

pub fn uses(parent: i64, child: i64) -> ObjectDependency {
    ObjectDependency {
        parent: ObjectVersionId(parent),
        child: ObjectVersionId(child),
        dependency_type: "interface".to_string(),
        dependency_name: format!("ref-{child}"),
    }
}

pub fn snapshot_ids(snapshots: &[Snapshot]) -> Vec<SnapshotId> {
    snapshots.iter().map(|s| s.snapshot_id).collect()
}

pub fn object_ids(versions: &[ObjectVersion]) -> Vec<ObjectVersionId> {
    versions.iter().map(|v| v.object_version_id).collect()
}
