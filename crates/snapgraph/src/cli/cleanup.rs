//! `snapgraph cleanup` command implementation.

use colored::Colorize;
use snapgraph::{GraphConfig, SnapGraph};

use super::display::print_cleanup;

/// Run the cleanup command.
pub fn run(config: &GraphConfig, vacuum: bool) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    let report = graph.run_orphan_cleanup()?;

    if report.total() == 0 {
        println!("{}", "Nothing to clean up.".green());
    } else {
        println!(
            "{} {} orphaned rows in {} passes:",
            "Removed".green().bold(),
            report.total(),
            report.passes
        );
        print_cleanup(&report);
    }

    if vacuum {
        graph.vacuum()?;
        println!("{}", "Database vacuumed.".dimmed());
    }

    Ok(())
}
