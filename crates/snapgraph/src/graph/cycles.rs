//! Cycle detection with Tarjan's SCC algorithm.
//!
//! Cycles are not rejected at ingestion. They are reported here so callers
//! can see why a leveled traversal never places some nodes, and why the
//! orphan cleanup can leave a self-referencing cluster behind.

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use super::levels::{GraphView, LevelNode};
use crate::types::Cycle;

/// Find every strongly connected group of two or more nodes, plus self-loops.
///
/// Members of each cycle are sorted; cycles are ordered by their smallest member.
pub fn find_cycles<N: LevelNode>(graph: &GraphView<N>) -> Vec<Cycle<N::Id>> {
    let mut g: DiGraphMap<N::Id, ()> = DiGraphMap::new();
    for node in graph.nodes() {
        g.add_node(node.node_id());
    }
    for (parent, child) in graph.edges() {
        g.add_edge(parent, child, ());
    }

    let mut cycles: Vec<Cycle<N::Id>> = tarjan_scc(&g)
        .into_iter()
        .filter(|scc| scc.len() > 1 || g.contains_edge(scc[0], scc[0]))
        .map(|mut members| {
            members.sort_unstable();
            Cycle { members }
        })
        .collect();
    cycles.sort_by(|a, b| a.members.cmp(&b.members));

    tracing::debug!(
        node_count = g.node_count(),
        edge_count = g.edge_count(),
        cycle_count = cycles.len(),
        "Cycle detection complete"
    );

    cycles
}
