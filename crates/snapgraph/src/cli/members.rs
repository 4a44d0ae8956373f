//! `snapgraph members` command implementation.

use colored::Colorize;
use snapgraph::{
    GraphConfig, ObjectVersionField, ObjectVersionFilter, SnapGraph, SnapshotField, SnapshotFilter,
    SnapshotId,
};

use super::display::print_object_versions;

/// Run the members command.
///
/// `object_type` narrows the listing to one object type.
pub fn run(
    config: &GraphConfig,
    snapshot: i64,
    object_type: Option<&str>,
) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    let members = match object_type {
        Some(object_type) => graph.get_object_versions(
            &ObjectVersionFilter::all().eq(ObjectVersionField::Type, object_type),
            Some(&SnapshotFilter::all().eq(SnapshotField::SnapshotId, SnapshotId(snapshot))),
        )?,
        None => graph.members_of(SnapshotId(snapshot))?,
    };

    println!(
        "{} {} has {} members:",
        "Snapshot".cyan().bold(),
        snapshot,
        members.len().to_string().green()
    );
    print_object_versions(&members, "(no members)");

    Ok(())
}
