//! Graph operations over the two dependency graphs.
//!
//! This module provides traits and implementations for:
//! - Snapshot-level queries (which toolkits does this app use? who uses this toolkit?)
//! - Object-level queries (what does this object need? where is it used?)
//! - Membership queries linking the two graphs
//! - Leveled breadth-first traversal from leaves or roots
//! - Cycle reporting
//!
//! ## Design
//!
//! - Traits define the operations (`SnapshotGraphOps`, `ObjectGraphOps`)
//! - `Store` implements them with SQL joins for direct relationships
//! - Traversal and cycle detection work on a [`GraphView`] loaded fresh from
//!   the store on every call
//!
//! ## Consistency
//!
//! Reads are not coordinated with concurrent writes. Each call sees whatever
//! the store holds when it runs; a traversal driven level by level while
//! ingestion is running can produce levels that match no single point in time.

mod cycles;
mod levels;

pub use cycles::find_cycles;
pub use levels::{all_levels, Direction, GraphSource, GraphView, Level, LevelNode};

use crate::error::Result;
use crate::filter::{ObjectVersionFilter, SnapshotFilter};
use crate::types::{Cycle, ObjectVersion, ObjectVersionId, Snapshot, SnapshotId};

/// Operations on the snapshot-level dependency graph.
///
/// All relationship queries return an empty list, not an error, when the
/// snapshot has no relationships (or does not exist).
pub trait SnapshotGraphOps: Send + Sync {
    /// Snapshots matching `filter`.
    fn get_snapshots(&self, filter: &SnapshotFilter) -> Result<Vec<Snapshot>>;

    /// Snapshots the given snapshot directly depends on.
    fn snapshot_children(&self, id: SnapshotId) -> Result<Vec<Snapshot>>;

    /// Snapshots that directly depend on the given snapshot.
    fn snapshot_where_used(&self, id: SnapshotId) -> Result<Vec<Snapshot>>;

    /// Object versions belonging to the given snapshot.
    fn members_of(&self, id: SnapshotId) -> Result<Vec<ObjectVersion>>;

    /// Groups of snapshots that depend on each other in a cycle.
    fn detect_snapshot_cycles(&self) -> Result<Vec<Cycle<SnapshotId>>>;
}

/// Operations on the object-level dependency graph.
pub trait ObjectGraphOps: Send + Sync {
    /// Distinct object versions matching `filter` and, if given, owned by a
    /// snapshot matching `snapshot_filter`.
    fn get_object_versions(
        &self,
        filter: &ObjectVersionFilter,
        snapshot_filter: Option<&SnapshotFilter>,
    ) -> Result<Vec<ObjectVersion>>;

    /// Object versions the given object version directly depends on.
    fn object_children(&self, id: ObjectVersionId) -> Result<Vec<ObjectVersion>>;

    /// Object versions that directly depend on the given object version.
    fn object_where_used(&self, id: ObjectVersionId) -> Result<Vec<ObjectVersion>>;

    /// Snapshots the given object version belongs to.
    fn snapshots_of(&self, id: ObjectVersionId) -> Result<Vec<Snapshot>>;

    /// Groups of object versions that depend on each other in a cycle.
    fn detect_object_cycles(&self) -> Result<Vec<Cycle<ObjectVersionId>>>;
}
