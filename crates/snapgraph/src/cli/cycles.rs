//! `snapgraph cycles` command implementation.

use std::fmt::Display;

use colored::Colorize;
use snapgraph::{Cycle, GraphConfig, SnapGraph};

/// Run the cycles command.
pub fn run(config: &GraphConfig) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;

    let snapshot_cycles = graph.detect_snapshot_cycles()?;
    let object_cycles = graph.detect_object_cycles()?;

    if snapshot_cycles.is_empty() && object_cycles.is_empty() {
        println!("{}", "No circular dependencies detected.".green());
        return Ok(());
    }

    print_cycles("snapshot", &snapshot_cycles);
    print_cycles("object version", &object_cycles);

    Ok(())
}

fn print_cycles<Id: Display>(kind: &str, cycles: &[Cycle<Id>]) {
    if cycles.is_empty() {
        return;
    }

    println!(
        "Found {} circular {kind} dependencies:",
        cycles.len().to_string().red().bold()
    );
    println!();

    for (i, cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);

        // a → b → c → a
        let mut path_str = cycle
            .members
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" → ");
        if let Some(first) = cycle.members.first() {
            path_str.push_str(" → ");
            path_str.push_str(&first.to_string());
        }

        println!("    {}", path_str.dimmed());
    }
    println!();
}
