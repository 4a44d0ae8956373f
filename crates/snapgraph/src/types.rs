//! Domain types for the snapshot/object dependency graph.
//!
//! These types mirror the five stored relations:
//! - **Nodes**: `Snapshot`, `ObjectVersion`
//! - **Edges**: `SnapshotDependency`, `ObjectDependency`
//! - **Cross-link**: `Membership` (an object version belonging to a snapshot)
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Node IDs | Newtypes over i64 | Snapshot and object version IDs can't be swapped |
//! | Natural keys | No surrogate IDs in the API | Rows are identified by what they describe |
//! | Serde names | camelCase | Matches the records emitted by the archive parser |

use serde::{Deserialize, Serialize};

// ============================================================================
// Strongly-typed ID wrappers
// ============================================================================

/// A strongly-typed snapshot ID to prevent mixing with object version IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotId(pub i64);

impl SnapshotId {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for SnapshotId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strongly-typed object version ID to prevent mixing with snapshot IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectVersionId(pub i64);

impl ObjectVersionId {
    /// Extract the raw i64 value.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl From<i64> for ObjectVersionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ObjectVersionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// One ingested application or toolkit snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Natural key
    pub snapshot_id: SnapshotId,
    /// Application this snapshot belongs to
    pub app_id: i64,
    /// Branch of the application
    pub branch_id: i64,
    /// Human-readable snapshot name
    pub snapshot_name: String,
    /// Human-readable branch name
    pub branch_name: String,
    /// Short application code
    pub app_short_name: String,
    /// Full application name
    pub app_name: String,
    /// Shared toolkit snapshots exist only to be depended upon
    #[serde(default)]
    pub is_toolkit: bool,
    /// Set once all of the snapshot's objects have been ingested
    #[serde(default)]
    pub is_objects_processed: bool,
}

/// Partial update applied to an existing snapshot.
///
/// `None` fields are left untouched. The natural key and application
/// identifiers are not updatable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUpdate {
    /// New snapshot name
    pub snapshot_name: Option<String>,
    /// New branch name
    pub branch_name: Option<String>,
    /// New short application code
    pub app_short_name: Option<String>,
    /// New application name
    pub app_name: Option<String>,
    /// New toolkit flag
    pub is_toolkit: Option<bool>,
    /// New objects-processed flag
    pub is_objects_processed: Option<bool>,
}

impl SnapshotUpdate {
    /// Update that only marks the snapshot's objects as processed.
    #[must_use]
    pub fn objects_processed() -> Self {
        Self {
            is_objects_processed: Some(true),
            ..Self::default()
        }
    }

    /// Returns `true` if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot_name.is_none()
            && self.branch_name.is_none()
            && self.app_short_name.is_none()
            && self.app_name.is_none()
            && self.is_toolkit.is_none()
            && self.is_objects_processed.is_none()
    }
}

/// One versioned entity found inside any snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectVersion {
    /// Natural key
    pub object_version_id: ObjectVersionId,
    /// Source object this is a version of
    pub object_id: i64,
    /// Object name
    pub name: String,
    /// Object type (e.g. "interface", "process model")
    #[serde(rename = "type")]
    pub object_type: String,
    /// Optional finer-grained type
    #[serde(default)]
    pub subtype: Option<String>,
}

// ============================================================================
// Edges
// ============================================================================

/// Directed edge: object version `parent` requires object version `child`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDependency {
    /// Depending object version
    #[serde(rename = "parentObjectVersionId")]
    pub parent: ObjectVersionId,
    /// Required object version
    #[serde(rename = "childObjectVersionId")]
    pub child: ObjectVersionId,
    /// Kind of reference (must be non-empty)
    pub dependency_type: String,
    /// Name under which the child is referenced
    pub dependency_name: String,
}

/// Directed edge: snapshot `parent` requires snapshot `child`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDependency {
    /// Depending snapshot
    #[serde(rename = "parentSnapshotId")]
    pub parent: SnapshotId,
    /// Required snapshot (typically a toolkit)
    #[serde(rename = "childSnapshotId")]
    pub child: SnapshotId,
    /// Ordering rank among the parent's dependencies
    pub rank: i64,
    /// Identifier of the dependency declaration
    pub dependency_id: i64,
}

/// Membership: object version `object_version_id` belongs to snapshot `snapshot_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Member object version
    pub object_version_id: ObjectVersionId,
    /// Owning snapshot
    pub snapshot_id: SnapshotId,
    /// Source object the version was produced from
    pub object_id: i64,
}

// ============================================================================
// Results
// ============================================================================

/// A strongly connected group of nodes that can never be placed in a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cycle<Id> {
    /// Nodes in the cycle, sorted by ID
    pub members: Vec<Id>,
}

/// Row counts per relation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Rows in `snapshots`
    pub snapshots: usize,
    /// Rows in `object_versions`
    pub object_versions: usize,
    /// Rows in `object_deps`
    pub object_dependencies: usize,
    /// Rows in `snapshot_deps`
    pub snapshot_dependencies: usize,
    /// Rows in `memberships`
    pub memberships: usize,
}

impl StoreStats {
    /// Total row count across all relations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.snapshots
            + self.object_versions
            + self.object_dependencies
            + self.snapshot_dependencies
            + self.memberships
    }
}
