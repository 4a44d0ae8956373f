//! `snapgraph remove` command implementation.

use colored::Colorize;
use snapgraph::{GraphConfig, RemovalReport, SnapGraph, SnapshotId};

use super::display::print_cleanup;

/// What to remove.
pub enum Target {
    /// Every snapshot of one application
    App(i64),
    /// Explicit snapshot IDs
    Snapshots(Vec<i64>),
}

/// Run the remove command.
pub fn run(config: &GraphConfig, target: Target) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    let report = match target {
        Target::App(app_id) => graph.remove_app(app_id)?,
        Target::Snapshots(ids) => {
            let ids: Vec<SnapshotId> = ids.into_iter().map(SnapshotId).collect();
            graph.remove_source(&ids)?
        }
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &RemovalReport) {
    if report.snapshots == 0 {
        println!("{}", "No matching snapshots.".yellow());
    } else {
        println!(
            "{} {} snapshots ({} memberships, {} snapshot dependencies)",
            "Removed".green().bold(),
            report.snapshots,
            report.memberships,
            report.snapshot_dependencies
        );
    }

    println!("  {}:", "Orphan cleanup".white().bold());
    print_cleanup(&report.cleanup);
}
