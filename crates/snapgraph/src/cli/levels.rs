//! `snapgraph levels` command implementation.

use colored::Colorize;
use snapgraph::{Direction, GraphConfig, GraphSource, Level, LevelNode, SnapGraph, Store};

use super::display::{object_label, print_list, snapshot_label};

/// Run the levels command.
///
/// Walks the snapshot graph, or the object version graph with `objects`,
/// leaf-first unless `roots` is set.
pub fn run(config: &GraphConfig, roots: bool, objects: bool) -> Result<(), snapgraph::Error> {
    let graph = SnapGraph::open_with(config)?;
    let direction = if roots {
        Direction::RootFirst
    } else {
        Direction::LeafFirst
    };

    let (placed, total) = if objects {
        let first = graph.object_levels(direction)?;
        let total = graph.stats()?.object_versions;
        (walk(&graph, first, object_label)?, total)
    } else {
        let first = graph.snapshot_levels(direction)?;
        let total = graph.stats()?.snapshots;
        (walk(&graph, first, snapshot_label)?, total)
    };

    println!();
    println!(
        "  {}: {} of {}",
        "Placed".white().bold(),
        placed.to_string().green(),
        total
    );
    if placed < total {
        println!(
            "  {}: {} nodes are on or behind a cycle; run `snapgraph cycles`",
            "Warning".yellow().bold(),
            (total - placed).to_string().yellow()
        );
    }

    Ok(())
}

/// Print every non-empty level starting at `level`. Returns the number of
/// nodes placed.
fn walk<N: LevelNode>(
    graph: &SnapGraph,
    mut level: Level<N>,
    label: fn(&N) -> String,
) -> Result<usize, snapgraph::Error>
where
    Store: GraphSource<N>,
{
    while !level.is_terminal() {
        println!(
            "{} {} ({} items)",
            "Level".cyan().bold(),
            level.level(),
            level.items().len()
        );
        let labels: Vec<String> = level.items().iter().map(label).collect();
        print_list(&labels, "");
        level = graph.next_level(&level)?;
    }

    Ok(level.placed_count())
}
