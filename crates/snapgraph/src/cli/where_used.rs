//! `snapgraph where-used` command implementation.

use colored::Colorize;
use snapgraph::{GraphConfig, ObjectVersionId, SnapGraph, SnapshotId};

use super::display::{print_object_versions, print_snapshots};

/// Run the where-used command.
pub fn run(config: &GraphConfig, id: i64, object: bool) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    if object {
        let users = graph.object_where_used(ObjectVersionId(id))?;
        println!(
            "{} {} is used by {} object versions:",
            "Object version".cyan().bold(),
            id,
            users.len()
        );
        print_object_versions(&users, "(not used by any object version)");
    } else {
        let users = graph.snapshot_where_used(SnapshotId(id))?;
        println!(
            "{} {} is used by {} snapshots:",
            "Snapshot".cyan().bold(),
            id,
            users.len()
        );
        print_snapshots(&users, "(not used by any snapshot)");
    }

    Ok(())
}
