//! Direct relationship queries against a file-backed graph.

mod common;

use common::{depends, member, object_ids, snapshot, snapshot_ids, temp_graph, uses, version};
use rstest::rstest;
use snapgraph::{
    Direction, ObjectVersionField, ObjectVersionFilter, ObjectVersionId, SnapshotField,
    SnapshotFilter, SnapshotId,
};

// === Snapshot graph ===

#[test]
fn app_and_toolkit_scenario() {
    let graph = temp_graph();
    graph
        .register_snapshots(&[snapshot(1, 10, false), snapshot(2, 20, true)])
        .unwrap();
    graph.register_snapshot_dependency(&depends(1, 2)).unwrap();

    assert_eq!(
        snapshot_ids(&graph.snapshot_children(SnapshotId(1)).unwrap()),
        vec![SnapshotId(2)]
    );
    assert_eq!(
        snapshot_ids(&graph.snapshot_where_used(SnapshotId(2)).unwrap()),
        vec![SnapshotId(1)]
    );

    let level1 = graph.snapshot_levels(Direction::LeafFirst).unwrap();
    let level2 = graph.next_level(&level1).unwrap();
    assert_eq!(snapshot_ids(level1.items()), vec![SnapshotId(2)]);
    assert_eq!(snapshot_ids(level2.items()), vec![SnapshotId(1)]);

    let report = graph.remove_source(&[SnapshotId(1)]).unwrap();

    assert_eq!(report.snapshot_dependencies, 1);
    assert_eq!(report.cleanup.snapshots, 1);
    assert_eq!(graph.stats().unwrap().total(), 0);
}

#[test]
fn unknown_snapshot_has_no_relationships() {
    let graph = temp_graph();

    assert!(graph.snapshot_children(SnapshotId(99)).unwrap().is_empty());
    assert!(graph.snapshot_where_used(SnapshotId(99)).unwrap().is_empty());
    assert!(graph.members_of(SnapshotId(99)).unwrap().is_empty());
    assert!(graph.snapshots_of(ObjectVersionId(99)).unwrap().is_empty());
}

#[test]
fn children_skip_edges_to_missing_snapshots() {
    let graph = temp_graph();
    graph.register_snapshot(&snapshot(1, 10, false)).unwrap();
    graph
        .register_snapshot_dependencies(&[depends(1, 2), depends(1, 3)])
        .unwrap();
    graph.register_snapshot(&snapshot(3, 30, true)).unwrap();

    let children = graph.snapshot_children(SnapshotId(1)).unwrap();

    assert_eq!(snapshot_ids(&children), vec![SnapshotId(3)]);
}

#[rstest]
#[case::by_app(SnapshotFilter::all().eq(SnapshotField::AppId, 20_i64), vec![2, 3])]
#[case::toolkits(SnapshotFilter::all().eq(SnapshotField::IsToolkit, true), vec![3])]
#[case::id_set(SnapshotFilter::all().is_in(SnapshotField::SnapshotId, [1_i64, 3]), vec![1, 3])]
#[case::empty_set(SnapshotFilter::all().is_in(SnapshotField::SnapshotId, Vec::<i64>::new()), vec![])]
#[case::everything(SnapshotFilter::all(), vec![1, 2, 3])]
fn get_snapshots_by_filter(#[case] filter: SnapshotFilter, #[case] expected: Vec<i64>) {
    let graph = temp_graph();
    graph
        .register_snapshots(&[
            snapshot(1, 10, false),
            snapshot(2, 20, false),
            snapshot(3, 20, true),
        ])
        .unwrap();

    let found = graph.get_snapshots(&filter).unwrap();

    let expected: Vec<SnapshotId> = expected.into_iter().map(SnapshotId).collect();
    assert_eq!(snapshot_ids(&found), expected);
}

#[test]
fn filter_values_are_not_interpreted_as_sql() {
    let graph = temp_graph();
    graph.register_snapshot(&snapshot(1, 10, false)).unwrap();

    let found = graph
        .get_snapshots(&SnapshotFilter::all().eq(SnapshotField::SnapshotName, "x' OR '1'='1"))
        .unwrap();

    assert!(found.is_empty());
    assert_eq!(graph.stats().unwrap().snapshots, 1);
}

// === Object graph ===

fn seed_objects(graph: &snapgraph::SnapGraph) {
    graph
        .register_snapshots(&[snapshot(1, 10, false), snapshot(2, 20, true)])
        .unwrap();
    graph
        .register_object_versions(&[version(100), version(101), version(200)])
        .unwrap();
    graph
        .register_memberships(&[member(100, 1), member(101, 1), member(200, 2), member(101, 2)])
        .unwrap();
    graph
        .register_object_dependencies(&[uses(100, 101), uses(100, 200), uses(101, 200)])
        .unwrap();
}

#[test]
fn where_used_is_inverse_of_children() {
    let graph = temp_graph();
    seed_objects(&graph);

    let edges = graph.store().object_dependencies().list_all().unwrap();
    assert_eq!(edges.len(), 3);

    for edge in edges {
        let children = object_ids(&graph.object_children(edge.parent).unwrap());
        let users = object_ids(&graph.object_where_used(edge.child).unwrap());
        assert!(children.contains(&edge.child), "{edge:?} missing from children");
        assert!(users.contains(&edge.parent), "{edge:?} missing from where-used");
    }

    assert_eq!(
        object_ids(&graph.object_where_used(ObjectVersionId(200)).unwrap()),
        vec![ObjectVersionId(100), ObjectVersionId(101)]
    );
}

#[test]
fn members_and_snapshots_of_are_inverse() {
    let graph = temp_graph();
    seed_objects(&graph);

    assert_eq!(
        object_ids(&graph.members_of(SnapshotId(1)).unwrap()),
        vec![ObjectVersionId(100), ObjectVersionId(101)]
    );
    assert_eq!(
        snapshot_ids(&graph.snapshots_of(ObjectVersionId(101)).unwrap()),
        vec![SnapshotId(1), SnapshotId(2)]
    );
}

#[test]
fn object_versions_filtered_by_owning_snapshot_are_distinct() {
    let graph = temp_graph();
    seed_objects(&graph);

    let in_any = graph
        .get_object_versions(
            &ObjectVersionFilter::all().eq(ObjectVersionField::ObjectVersionId, ObjectVersionId(101)),
            Some(&SnapshotFilter::all()),
        )
        .unwrap();
    let in_toolkits = graph
        .get_object_versions(
            &ObjectVersionFilter::all(),
            Some(&SnapshotFilter::all().eq(SnapshotField::IsToolkit, true)),
        )
        .unwrap();

    assert_eq!(object_ids(&in_any), vec![ObjectVersionId(101)]);
    assert_eq!(
        object_ids(&in_toolkits),
        vec![ObjectVersionId(101), ObjectVersionId(200)]
    );
}

#[test]
fn cycles_are_reported_not_rejected() {
    let graph = temp_graph();
    graph
        .register_snapshots(&[snapshot(1, 1, true), snapshot(2, 2, true), snapshot(3, 3, false)])
        .unwrap();
    graph
        .register_snapshot_dependencies(&[depends(1, 2), depends(2, 1), depends(3, 1)])
        .unwrap();

    let cycles = graph.detect_snapshot_cycles().unwrap();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].members, vec![SnapshotId(1), SnapshotId(2)]);
    assert!(graph.detect_object_cycles().unwrap().is_empty());
}
