//! `snapgraph children` command implementation.

use colored::Colorize;
use snapgraph::{GraphConfig, ObjectVersionId, SnapGraph, SnapshotId};

use super::display::{print_object_versions, print_snapshots};

/// Run the children command.
///
/// With `object` set, `id` is an object version ID; otherwise a snapshot ID.
pub fn run(config: &GraphConfig, id: i64, object: bool) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    if object {
        let children = graph.object_children(ObjectVersionId(id))?;
        println!(
            "{} {} depends on {} object versions:",
            "Object version".cyan().bold(),
            id,
            children.len()
        );
        print_object_versions(&children, "(no dependencies)");
    } else {
        let children = graph.snapshot_children(SnapshotId(id))?;
        println!(
            "{} {} depends on {} snapshots:",
            "Snapshot".cyan().bold(),
            id,
            children.len()
        );
        print_snapshots(&children, "(no dependencies)");
    }

    Ok(())
}
