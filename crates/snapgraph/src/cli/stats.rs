//! `snapgraph stats` command implementation.

use colored::Colorize;
use snapgraph::{GraphConfig, SnapGraph};

use super::display::format_size;

/// Run the stats command.
pub fn run(config: &GraphConfig) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;
    let db_path = &config.database;

    let db_size_str = match std::fs::metadata(db_path) {
        Ok(meta) => format_size(meta.len()),
        Err(e) => {
            tracing::debug!(error = %e, "Failed to get database file size");
            "size unknown".to_string()
        }
    };

    let stats = graph.stats()?;

    println!("{}", "Snapgraph Statistics".cyan().bold());
    println!();
    println!(
        "  {}: {} ({})",
        "Database".white().bold(),
        db_path.display(),
        db_size_str
    );
    println!();

    let rows = [
        ("Snapshots", stats.snapshots),
        ("Snapshot dependencies", stats.snapshot_dependencies),
        ("Object versions", stats.object_versions),
        ("Object dependencies", stats.object_dependencies),
        ("Memberships", stats.memberships),
    ];
    for (name, count) in rows {
        println!("  {}: {}", name.white().bold(), count.to_string().green());
    }

    Ok(())
}
