//! Batch atomicity and source batch ingestion.

mod common;

use common::{member, snapshot, temp_graph, uses, version};
use snapgraph::{
    Error, ObjectDependency, ObjectVersionId, SnapshotField, SnapshotFilter, SnapshotId,
    SourceBatch,
};

#[test]
fn malformed_edge_aborts_whole_batch() {
    let graph = temp_graph();
    let mut edges: Vec<ObjectDependency> = (1..=5).map(|i| uses(i, i + 1)).collect();
    edges[2].dependency_type = String::new();

    let err = graph.register_object_dependencies(&edges).unwrap_err();

    match err {
        Error::BatchAborted { index, source } => {
            assert_eq!(index, 2);
            assert!(matches!(*source, Error::ConstraintViolation(_)));
        }
        other => panic!("expected BatchAborted, got {other:?}"),
    }
    assert_eq!(graph.stats().unwrap().object_dependencies, 0);
}

#[test]
fn duplicate_key_aborts_snapshot_batch() {
    let graph = temp_graph();
    graph.register_snapshot(&snapshot(2, 2, false)).unwrap();

    let err = graph
        .register_snapshots(&[snapshot(1, 1, false), snapshot(2, 2, false), snapshot(3, 3, false)])
        .unwrap_err();

    assert!(matches!(err, Error::BatchAborted { index: 1, .. }));
    assert_eq!(graph.stats().unwrap().snapshots, 1);
}

#[test]
fn batch_file_round_trip_through_store() {
    let graph = temp_graph();
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("toolkit.json");
    let batch = SourceBatch {
        snapshots: vec![snapshot(7, 70, true)],
        object_versions: vec![version(70), version(71)],
        memberships: vec![member(70, 7), member(71, 7)],
        object_dependencies: vec![uses(70, 71)],
        ..SourceBatch::default()
    };
    std::fs::write(&path, serde_json::to_string_pretty(&batch).unwrap()).unwrap();

    let loaded = SourceBatch::load(&path).unwrap();
    let report = graph.ingest(&loaded).unwrap();

    assert_eq!(loaded, batch);
    assert_eq!(report.object_versions, 2);
    assert_eq!(report.memberships, 2);
    let stored = graph
        .get_snapshots(&SnapshotFilter::all().eq(SnapshotField::IsObjectsProcessed, true))
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].snapshot_id, SnapshotId(7));
    assert_eq!(
        graph.object_children(ObjectVersionId(70)).unwrap()[0].object_version_id,
        ObjectVersionId(71)
    );
}

#[test]
fn reingesting_same_snapshot_fails_without_touching_objects() {
    let graph = temp_graph();
    let batch = SourceBatch {
        snapshots: vec![snapshot(1, 1, false)],
        object_versions: vec![version(10)],
        memberships: vec![member(10, 1)],
        ..SourceBatch::default()
    };
    graph.ingest(&batch).unwrap();

    let err = graph.ingest(&batch).unwrap_err();

    assert!(matches!(err, Error::BatchAborted { index: 0, .. }));
    let stats = graph.stats().unwrap();
    assert_eq!(stats.object_versions, 1);
    assert_eq!(stats.memberships, 1);
}

#[test]
fn missing_batch_file_is_io_error() {
    let dir = tempfile::tempdir().expect("create temp dir");

    let err = SourceBatch::load(&dir.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}
