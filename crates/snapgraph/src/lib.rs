//! # Snapgraph: Two-Tier Dependency Graph Engine
//!
//! Snapgraph tracks dependencies across ingested application archives at two
//! levels: snapshots that depend on other snapshots (an application using a
//! shared toolkit), and versioned objects inside those snapshots that depend
//! on other objects. The graph lives in `SQLite`.
//!
//! ## Design Philosophy
//!
//! - **Fixed shapes** - Exactly two graphs and one cross-link, not a general graph database
//! - **Typed filters** - Predicates are field enums plus bound values, never SQL text
//! - **Explicit cleanup** - Rows disappear by caller filter or by the orphan cascade, nothing else
//! - **Immutable traversal** - A [`Level`] handle is a value; stepping it yields a new one
//!
//! ## Quick Start
//!
//! ```no_run
//! use snapgraph::{Direction, SnapGraph, SourceBatch};
//! use std::path::Path;
//!
//! let graph = SnapGraph::open(Path::new(".snapgraph/graph.db"))?;
//!
//! let batch = SourceBatch::load(Path::new("app.json"))?;
//! graph.ingest(&batch)?;
//!
//! let mut level = graph.snapshot_levels(Direction::LeafFirst)?;
//! while !level.is_terminal() {
//!     println!("level {}: {} snapshots", level.level(), level.items().len());
//!     level = graph.next_level(&level)?;
//! }
//! # Ok::<(), snapgraph::Error>(())
//! ```
//!
//! ## Consistency
//!
//! Reads are not coordinated with writes. Each call sees the store as it is
//! when the call runs, so a traversal stepped level by level while another
//! caller ingests can yield levels that match no single point in time.

mod cleanup;
mod config;
mod db;
mod error;
mod filter;
mod graph;
mod ingest;
mod types;

pub use cleanup::{CleanupReport, CleanupStep};
pub use config::{GraphConfig, DEFAULT_CONFIG_FILE, DEFAULT_DATABASE};
pub use db::{Record, Repository, Store};
pub use error::{Error, Result};
pub use filter::{
    Field, Filter, FilterTerm, MembershipField, MembershipFilter, ObjectDependencyField,
    ObjectDependencyFilter, ObjectVersionField, ObjectVersionFilter, SnapshotDependencyField,
    SnapshotDependencyFilter, SnapshotField, SnapshotFilter, Value,
};
pub use graph::{
    all_levels, find_cycles, Direction, GraphSource, GraphView, Level, LevelNode, ObjectGraphOps,
    SnapshotGraphOps,
};
pub use ingest::{IngestReport, RemovalReport, SourceBatch};
pub use types::{
    Cycle, Membership, ObjectDependency, ObjectVersion, ObjectVersionId, Snapshot,
    SnapshotDependency, SnapshotId, SnapshotUpdate, StoreStats,
};

use std::path::Path;

/// Dependency graph engine.
///
/// `SnapGraph` is the single entry point for writes (register, remove,
/// cleanup) and reads (direct relationships, leveled traversal, cycles).
/// It owns a [`Store`]; every operation acquires the store's connection for
/// its own duration only, so a `SnapGraph` can be shared across threads.
pub struct SnapGraph {
    store: Store,
}

#[allow(clippy::missing_errors_doc)]
impl SnapGraph {
    /// Open or create the graph database at `path` with default settings.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_store(Store::open(path)?))
    }

    /// Open or create the graph database described by `config`.
    pub fn open_with(config: &GraphConfig) -> Result<Self> {
        Ok(Self::from_store(Store::open_with(config)?))
    }

    /// Open a private in-memory graph.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_store(Store::open_in_memory()?))
    }

    /// Wrap an already opened store.
    #[must_use]
    pub fn from_store(store: Store) -> Self {
        Self { store }
    }

    /// The underlying store, for direct repository access.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    // === Snapshots ===

    /// Register one snapshot.
    pub fn register_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.store.snapshots().insert(snapshot)
    }

    /// Register snapshots atomically.
    pub fn register_snapshots(&self, snapshots: &[Snapshot]) -> Result<usize> {
        self.store.snapshots().insert_many(snapshots)
    }

    /// Apply a partial update to an existing snapshot.
    ///
    /// Fails with [`Error::NotFound`] if the snapshot does not exist.
    pub fn update_snapshot(&self, id: SnapshotId, update: &SnapshotUpdate) -> Result<()> {
        self.store.update_snapshot(id, update)
    }

    // === Object versions ===

    /// Register one object version.
    pub fn register_object_version(&self, version: &ObjectVersion) -> Result<()> {
        self.store.object_versions().insert(version)
    }

    /// Register object versions atomically.
    pub fn register_object_versions(&self, versions: &[ObjectVersion]) -> Result<usize> {
        self.store.object_versions().insert_many(versions)
    }

    // === Edges ===

    /// Register one object dependency edge.
    pub fn register_object_dependency(&self, edge: &ObjectDependency) -> Result<()> {
        self.store.object_dependencies().insert(edge)
    }

    /// Register object dependency edges atomically.
    ///
    /// If any edge is rejected, none are committed and the error is
    /// [`Error::BatchAborted`] naming the rejected edge.
    pub fn register_object_dependencies(&self, edges: &[ObjectDependency]) -> Result<usize> {
        self.store.object_dependencies().insert_many(edges)
    }

    /// Register one snapshot dependency edge.
    pub fn register_snapshot_dependency(&self, edge: &SnapshotDependency) -> Result<()> {
        self.store.snapshot_dependencies().insert(edge)
    }

    /// Register snapshot dependency edges atomically.
    pub fn register_snapshot_dependencies(&self, edges: &[SnapshotDependency]) -> Result<usize> {
        self.store.snapshot_dependencies().insert_many(edges)
    }

    /// Register one membership link.
    pub fn register_membership(&self, link: &Membership) -> Result<()> {
        self.store.memberships().insert(link)
    }

    /// Register membership links atomically.
    pub fn register_memberships(&self, links: &[Membership]) -> Result<usize> {
        self.store.memberships().insert_many(links)
    }

    // === Removal ===

    /// Delete snapshots matching `filter`. Returns the number deleted.
    ///
    /// Nothing referencing the deleted rows is touched; run
    /// [`run_orphan_cleanup`](Self::run_orphan_cleanup) to sweep it.
    pub fn remove_snapshots(&self, filter: &SnapshotFilter) -> Result<usize> {
        self.store.snapshots().delete_where(filter)
    }

    /// Delete object versions matching `filter`.
    pub fn remove_object_versions(&self, filter: &ObjectVersionFilter) -> Result<usize> {
        self.store.object_versions().delete_where(filter)
    }

    /// Delete object dependency edges matching `filter`.
    pub fn remove_object_dependencies(&self, filter: &ObjectDependencyFilter) -> Result<usize> {
        self.store.object_dependencies().delete_where(filter)
    }

    /// Delete snapshot dependency edges matching `filter`.
    pub fn remove_snapshot_dependencies(
        &self,
        filter: &SnapshotDependencyFilter,
    ) -> Result<usize> {
        self.store.snapshot_dependencies().delete_where(filter)
    }

    /// Delete membership links matching `filter`.
    pub fn remove_memberships(&self, filter: &MembershipFilter) -> Result<usize> {
        self.store.memberships().delete_where(filter)
    }

    /// Sweep orphaned rows from all five relations.
    ///
    /// Safe to re-run at any time; on a clean store it deletes nothing.
    pub fn run_orphan_cleanup(&self) -> Result<CleanupReport> {
        cleanup::run_orphan_cleanup(&self.store)
    }

    // === Direct relationships ===

    /// Snapshots matching `filter`.
    pub fn get_snapshots(&self, filter: &SnapshotFilter) -> Result<Vec<Snapshot>> {
        self.store.get_snapshots(filter)
    }

    /// Distinct object versions matching `filter`, optionally restricted to
    /// those belonging to a snapshot matching `snapshot_filter`.
    pub fn get_object_versions(
        &self,
        filter: &ObjectVersionFilter,
        snapshot_filter: Option<&SnapshotFilter>,
    ) -> Result<Vec<ObjectVersion>> {
        self.store.get_object_versions(filter, snapshot_filter)
    }

    /// Snapshots `id` directly depends on.
    pub fn snapshot_children(&self, id: SnapshotId) -> Result<Vec<Snapshot>> {
        self.store.snapshot_children(id)
    }

    /// Snapshots that directly depend on `id`.
    pub fn snapshot_where_used(&self, id: SnapshotId) -> Result<Vec<Snapshot>> {
        self.store.snapshot_where_used(id)
    }

    /// Object versions `id` directly depends on.
    pub fn object_children(&self, id: ObjectVersionId) -> Result<Vec<ObjectVersion>> {
        self.store.object_children(id)
    }

    /// Object versions that directly depend on `id`.
    pub fn object_where_used(&self, id: ObjectVersionId) -> Result<Vec<ObjectVersion>> {
        self.store.object_where_used(id)
    }

    /// Object versions belonging to snapshot `id`.
    pub fn members_of(&self, id: SnapshotId) -> Result<Vec<ObjectVersion>> {
        self.store.members_of(id)
    }

    /// Snapshots object version `id` belongs to.
    pub fn snapshots_of(&self, id: ObjectVersionId) -> Result<Vec<Snapshot>> {
        self.store.snapshots_of(id)
    }

    // === Leveled traversal ===

    /// First level of the snapshot graph.
    pub fn snapshot_levels(&self, direction: Direction) -> Result<Level<Snapshot>> {
        Level::first(&self.store, direction)
    }

    /// First level of the object version graph.
    pub fn object_levels(&self, direction: Direction) -> Result<Level<ObjectVersion>> {
        Level::first(&self.store, direction)
    }

    /// Level following `level`, computed from the store's current contents.
    ///
    /// `level` itself is left unchanged. Past the last populated level this
    /// keeps returning empty levels with increasing numbers.
    pub fn next_level<N: LevelNode>(&self, level: &Level<N>) -> Result<Level<N>>
    where
        Store: GraphSource<N>,
    {
        level.next(&self.store)
    }

    // === Analysis ===

    /// Groups of snapshots that depend on each other in a cycle.
    pub fn detect_snapshot_cycles(&self) -> Result<Vec<Cycle<SnapshotId>>> {
        self.store.detect_snapshot_cycles()
    }

    /// Groups of object versions that depend on each other in a cycle.
    pub fn detect_object_cycles(&self) -> Result<Vec<Cycle<ObjectVersionId>>> {
        self.store.detect_object_cycles()
    }

    // === Database ===

    /// Row counts for every relation.
    pub fn stats(&self) -> Result<StoreStats> {
        self.store.stats()
    }

    /// Refresh query planner statistics.
    pub fn analyze(&self) -> Result<()> {
        self.store.analyze()
    }

    /// Vacuum the database to reclaim space.
    pub fn vacuum(&self) -> Result<()> {
        self.store.vacuum()
    }
}
