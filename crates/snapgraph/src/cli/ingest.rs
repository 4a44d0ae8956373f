//! `snapgraph ingest` command implementation.

use std::path::PathBuf;

use colored::Colorize;
use snapgraph::{GraphConfig, SnapGraph, SourceBatch};

/// Run the ingest command.
pub fn run(config: &GraphConfig, files: &[PathBuf]) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    for file in files {
        let batch = SourceBatch::load(file)?;
        if batch.is_empty() {
            println!("{} {} (empty batch)", "Skipped".yellow(), file.display());
            continue;
        }

        let report = graph.ingest(&batch)?;

        println!("{} {}", "Ingested".green().bold(), file.display());
        println!(
            "    {} snapshots, {} snapshot dependencies, {} memberships",
            report.snapshots, report.snapshot_dependencies, report.memberships
        );
        println!(
            "    {} object versions ({} already known), {} object dependencies ({} duplicates)",
            report.object_versions,
            report.object_versions_skipped,
            report.object_dependencies,
            report.object_dependencies_skipped
        );
    }

    graph.analyze()
}
