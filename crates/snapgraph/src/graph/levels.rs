//! Leveled breadth-first traversal.
//!
//! A [`Level`] is an immutable handle: the items of one level plus the set of
//! nodes already placed. [`Level::next`] builds a new handle for the following
//! level and leaves the current one untouched, so any number of callers can
//! explore the same graph from their own handles.
//!
//! - **Leaf-first**: level 1 holds nodes with no outgoing edge. Level N+1
//!   holds unplaced nodes whose dependencies are all placed.
//! - **Root-first**: level 1 holds nodes nothing depends on. Level N+1 holds
//!   unplaced children of level N whose parents are all placed.
//!
//! A level with no items is the terminal condition. Asking for the next level
//! after it is allowed and yields another empty level. Nodes on a cycle are
//! never placed.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::Result;
use crate::types::{ObjectVersion, ObjectVersionId, Snapshot, SnapshotId};

/// Where a traversal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Start from nodes that depend on nothing
    LeafFirst,
    /// Start from nodes nothing depends on
    RootFirst,
}

/// A graph node that can be placed in a level.
pub trait LevelNode: Clone {
    /// Node identity.
    type Id: Copy + Eq + Ord + Hash + Debug;

    /// This node's identity.
    fn node_id(&self) -> Self::Id;
}

impl LevelNode for Snapshot {
    type Id = SnapshotId;

    fn node_id(&self) -> SnapshotId {
        self.snapshot_id
    }
}

impl LevelNode for ObjectVersion {
    type Id = ObjectVersionId;

    fn node_id(&self) -> ObjectVersionId {
        self.object_version_id
    }
}

/// Point-in-time copy of one dependency graph.
///
/// Edges whose endpoints are not among the nodes are dropped: they are
/// orphans awaiting cleanup and take no part in traversal.
#[derive(Debug, Clone)]
pub struct GraphView<N: LevelNode> {
    nodes: Vec<N>,
    children: HashMap<N::Id, Vec<N::Id>>,
    parents: HashMap<N::Id, Vec<N::Id>>,
}

impl<N: LevelNode> GraphView<N> {
    /// Build a view from nodes and `(parent, child)` edges.
    pub fn new(nodes: Vec<N>, edges: impl IntoIterator<Item = (N::Id, N::Id)>) -> Self {
        let known: HashSet<N::Id> = nodes.iter().map(LevelNode::node_id).collect();
        let mut children: HashMap<N::Id, Vec<N::Id>> = HashMap::new();
        let mut parents: HashMap<N::Id, Vec<N::Id>> = HashMap::new();
        let mut seen: HashSet<(N::Id, N::Id)> = HashSet::new();

        for (parent, child) in edges {
            if !known.contains(&parent) || !known.contains(&child) {
                continue;
            }
            if seen.insert((parent, child)) {
                children.entry(parent).or_default().push(child);
                parents.entry(child).or_default().push(parent);
            }
        }

        Self {
            nodes,
            children,
            parents,
        }
    }

    /// All nodes, in store order.
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Direct dependencies of `id`.
    #[must_use]
    pub fn children(&self, id: N::Id) -> &[N::Id] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct dependents of `id`.
    #[must_use]
    pub fn parents(&self, id: N::Id) -> &[N::Id] {
        self.parents.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct `(parent, child)` edges between known nodes.
    pub fn edges(&self) -> impl Iterator<Item = (N::Id, N::Id)> + '_ {
        self.children
            .iter()
            .flat_map(|(&parent, kids)| kids.iter().map(move |&child| (parent, child)))
    }
}

/// Something a [`GraphView`] can be loaded from.
pub trait GraphSource<N: LevelNode> {
    /// Read the current nodes and edges.
    fn load_graph(&self) -> Result<GraphView<N>>;
}

/// One level of a leveled traversal.
#[derive(Debug, Clone)]
pub struct Level<N: LevelNode> {
    direction: Direction,
    level: u32,
    items: Vec<N>,
    placed: Arc<HashSet<N::Id>>,
}

impl<N: LevelNode> Level<N> {
    /// Compute level 1 from the current contents of `source`.
    pub fn first(source: &impl GraphSource<N>, direction: Direction) -> Result<Self> {
        let graph = source.load_graph()?;
        Ok(Self::first_in(&graph, direction))
    }

    /// Compute the following level from the current contents of `source`.
    ///
    /// `self` is not modified.
    pub fn next(&self, source: &impl GraphSource<N>) -> Result<Self> {
        let graph = source.load_graph()?;
        Ok(self.next_in(&graph))
    }

    /// Compute level 1 of `graph`.
    #[must_use]
    pub fn first_in(graph: &GraphView<N>, direction: Direction) -> Self {
        let items: Vec<N> = graph
            .nodes()
            .iter()
            .filter(|n| match direction {
                Direction::LeafFirst => graph.children(n.node_id()).is_empty(),
                Direction::RootFirst => graph.parents(n.node_id()).is_empty(),
            })
            .cloned()
            .collect();

        let placed: HashSet<N::Id> = items.iter().map(LevelNode::node_id).collect();
        let level = Self {
            direction,
            level: 1,
            items,
            placed: Arc::new(placed),
        };
        level.report(graph);
        level
    }

    /// Compute the level after this one in `graph`.
    #[must_use]
    pub fn next_in(&self, graph: &GraphView<N>) -> Self {
        let placed = &self.placed;
        let all_placed = |ids: &[N::Id]| ids.iter().all(|id| placed.contains(id));

        let items: Vec<N> = match self.direction {
            Direction::LeafFirst => graph
                .nodes()
                .iter()
                .filter(|n| {
                    let id = n.node_id();
                    !placed.contains(&id) && all_placed(graph.children(id))
                })
                .cloned()
                .collect(),
            Direction::RootFirst => {
                let candidates: HashSet<N::Id> = self
                    .items
                    .iter()
                    .flat_map(|n| graph.children(n.node_id()).iter().copied())
                    .collect();
                graph
                    .nodes()
                    .iter()
                    .filter(|n| {
                        let id = n.node_id();
                        candidates.contains(&id)
                            && !placed.contains(&id)
                            && all_placed(graph.parents(id))
                    })
                    .cloned()
                    .collect()
            }
        };

        let placed = if items.is_empty() {
            Arc::clone(&self.placed)
        } else {
            let mut next: HashSet<N::Id> = (*self.placed).clone();
            next.extend(items.iter().map(LevelNode::node_id));
            Arc::new(next)
        };

        let level = Self {
            direction: self.direction,
            level: self.level + 1,
            items,
            placed,
        };
        level.report(graph);
        level
    }

    fn report(&self, graph: &GraphView<N>) {
        trace!(
            direction = ?self.direction,
            level = self.level,
            items = self.items.len(),
            placed = self.placed.len(),
            "Computed traversal level"
        );

        if self.items.is_empty() {
            let unplaced = graph
                .nodes()
                .iter()
                .filter(|n| !self.placed.contains(&n.node_id()))
                .count();
            if unplaced > 0 {
                warn!(
                    direction = ?self.direction,
                    level = self.level,
                    unplaced,
                    "Traversal finished with unplaced nodes (dependency cycle?)"
                );
            }
        }
    }

    /// Nodes in this level.
    #[must_use]
    pub fn items(&self) -> &[N] {
        &self.items
    }

    /// 1-based level number.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Direction this traversal runs in.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if this level is empty, i.e. the traversal is finished.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of nodes placed in this and all earlier levels.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    /// Returns `true` if `id` was placed in this or an earlier level.
    #[must_use]
    pub fn is_placed(&self, id: N::Id) -> bool {
        self.placed.contains(&id)
    }
}

/// Drive a traversal to its terminal level, returning every non-empty level.
pub fn all_levels<N: LevelNode>(
    source: &impl GraphSource<N>,
    direction: Direction,
) -> Result<Vec<Level<N>>> {
    let mut levels = Vec::new();
    let mut current = Level::first(source, direction)?;
    while !current.is_terminal() {
        let next = current.next(source)?;
        levels.push(current);
        current = next;
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Node(i64);

    impl LevelNode for Node {
        type Id = i64;

        fn node_id(&self) -> i64 {
            self.0
        }
    }

    fn graph(nodes: &[i64], edges: &[(i64, i64)]) -> GraphView<Node> {
        GraphView::new(
            nodes.iter().copied().map(Node).collect(),
            edges.iter().copied(),
        )
    }

    fn ids(level: &Level<Node>) -> Vec<i64> {
        level.items().iter().map(|n| n.0).collect()
    }

    fn run(g: &GraphView<Node>, direction: Direction) -> Vec<Vec<i64>> {
        let mut out = Vec::new();
        let mut level = Level::first_in(g, direction);
        while !level.is_terminal() {
            out.push(ids(&level));
            level = level.next_in(g);
        }
        out
    }

    #[test]
    fn chain_leaf_first_and_root_first_are_mirrored() {
        // 1 -> 2 -> 3
        let g = graph(&[1, 2, 3], &[(1, 2), (2, 3)]);

        assert_eq!(run(&g, Direction::LeafFirst), vec![vec![3], vec![2], vec![1]]);
        assert_eq!(run(&g, Direction::RootFirst), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn terminal_level_still_increments() {
        let g = graph(&[1, 2], &[(1, 2)]);

        let l1 = Level::first_in(&g, Direction::LeafFirst);
        let l2 = l1.next_in(&g);
        let l3 = l2.next_in(&g);
        let l4 = l3.next_in(&g);

        assert_eq!(l3.level(), 3);
        assert!(l3.is_terminal());
        assert_eq!(l4.level(), 4);
        assert!(l4.is_terminal());
    }

    #[test]
    fn next_does_not_modify_current_handle() {
        let g = graph(&[1, 2], &[(1, 2)]);
        let l1 = Level::first_in(&g, Direction::LeafFirst);

        let a = l1.next_in(&g);
        let b = l1.next_in(&g);

        assert_eq!(l1.level(), 1);
        assert_eq!(ids(&l1), vec![2]);
        assert_eq!(l1.placed_count(), 1);
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn isolated_node_is_in_first_level_both_ways() {
        let g = graph(&[1, 2, 3], &[(1, 2)]);

        let leaves = Level::first_in(&g, Direction::LeafFirst);
        let roots = Level::first_in(&g, Direction::RootFirst);

        assert!(ids(&leaves).contains(&3));
        assert!(ids(&roots).contains(&3));
    }

    #[test]
    fn diamond_waits_for_all_dependencies() {
        // 1 -> 2 -> 4, 1 -> 3 -> 4, and 1 -> 4 directly
        let g = graph(&[1, 2, 3, 4], &[(1, 2), (1, 3), (2, 4), (3, 4), (1, 4)]);

        assert_eq!(
            run(&g, Direction::LeafFirst),
            vec![vec![4], vec![2, 3], vec![1]]
        );
        assert_eq!(
            run(&g, Direction::RootFirst),
            vec![vec![1], vec![2, 3], vec![4]]
        );
    }

    #[test]
    fn root_first_places_shared_child_after_its_deepest_parent() {
        // 1 -> 2 -> 3, 1 -> 3
        let g = graph(&[1, 2, 3], &[(1, 2), (2, 3), (1, 3)]);

        assert_eq!(run(&g, Direction::RootFirst), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn cycle_members_are_never_placed() {
        // 1 -> 2 -> 1, 3 -> 1
        let g = graph(&[1, 2, 3, 4], &[(1, 2), (2, 1), (3, 1)]);

        let levels = run(&g, Direction::LeafFirst);

        assert_eq!(levels, vec![vec![4]]);
    }

    #[test]
    fn edges_to_unknown_nodes_are_ignored() {
        let g = graph(&[1, 2], &[(1, 99), (98, 2)]);

        assert!(g.children(1).is_empty());
        assert!(g.parents(2).is_empty());
        assert_eq!(run(&g, Direction::LeafFirst), vec![vec![1, 2]]);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let g = graph(&[1, 2], &[(1, 2), (1, 2)]);

        assert_eq!(g.children(1), &[2]);
        assert_eq!(g.edges().count(), 1);
    }
}
