//! Ingestion and removal of whole source files.
//!
//! The archive parser hands over one [`SourceBatch`] per source file. Each
//! record kind is written in its own batched transaction, so a failure part
//! way through leaves the earlier kinds committed; `remove_source` with the
//! batch's snapshot IDs undoes a partial ingest.
//!
//! Object versions can be shared between source files. Versions already in
//! the store are skipped rather than rejected, and object dependency edges
//! already present (or repeated within the batch) are not written twice.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cleanup::CleanupReport;
use crate::error::{Error, Result};
use crate::filter::{
    MembershipField, MembershipFilter, ObjectDependencyField, ObjectDependencyFilter,
    ObjectVersionField, ObjectVersionFilter, SnapshotDependencyField, SnapshotDependencyFilter,
    SnapshotField, SnapshotFilter,
};
use crate::types::{
    Membership, ObjectDependency, ObjectVersion, ObjectVersionId, Snapshot, SnapshotDependency,
    SnapshotId, SnapshotUpdate,
};
use crate::SnapGraph;

/// Upper bound on IDs bound into a single `IN (...)` lookup.
const LOOKUP_CHUNK: usize = 500;

/// Pre-extracted records of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceBatch {
    /// Snapshots the file contains
    pub snapshots: Vec<Snapshot>,
    /// Dependencies of those snapshots on other snapshots
    pub snapshot_dependencies: Vec<SnapshotDependency>,
    /// Object versions found in the file
    pub object_versions: Vec<ObjectVersion>,
    /// Which snapshot each object version belongs to
    pub memberships: Vec<Membership>,
    /// Dependencies between object versions
    pub object_dependencies: Vec<ObjectDependency>,
}

impl SourceBatch {
    /// Decode a batch from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidInput(e.to_string()))
    }

    /// Read and decode a JSON batch file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))
    }

    /// IDs of the snapshots this batch introduces.
    #[must_use]
    pub fn snapshot_ids(&self) -> Vec<SnapshotId> {
        self.snapshots.iter().map(|s| s.snapshot_id).collect()
    }

    /// Returns `true` if the batch carries no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
            && self.snapshot_dependencies.is_empty()
            && self.object_versions.is_empty()
            && self.memberships.is_empty()
            && self.object_dependencies.is_empty()
    }
}

/// Rows written by one [`SnapGraph::ingest`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Snapshots inserted
    pub snapshots: usize,
    /// Snapshot dependencies inserted
    pub snapshot_dependencies: usize,
    /// Object versions inserted
    pub object_versions: usize,
    /// Object versions already present and skipped
    pub object_versions_skipped: usize,
    /// Memberships inserted
    pub memberships: usize,
    /// Object dependencies inserted
    pub object_dependencies: usize,
    /// Object dependencies already present and skipped
    pub object_dependencies_skipped: usize,
}

/// Rows deleted by one [`SnapGraph::remove_source`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalReport {
    /// Memberships of the removed snapshots
    pub memberships: usize,
    /// Outgoing dependencies of the removed snapshots
    pub snapshot_dependencies: usize,
    /// Snapshots removed
    pub snapshots: usize,
    /// What the follow-up orphan cleanup swept
    pub cleanup: CleanupReport,
}

impl RemovalReport {
    /// Total rows deleted, including the cleanup.
    #[must_use]
    pub fn total(&self) -> usize {
        self.memberships + self.snapshot_dependencies + self.snapshots + self.cleanup.total()
    }
}

type EdgeKey = (ObjectVersionId, ObjectVersionId, String, String);

fn edge_key(edge: &ObjectDependency) -> EdgeKey {
    (
        edge.parent,
        edge.child,
        edge.dependency_type.clone(),
        edge.dependency_name.clone(),
    )
}

#[allow(clippy::missing_errors_doc)]
impl SnapGraph {
    /// Write every record of `batch`, then mark its snapshots as processed.
    ///
    /// Kinds are written in dependency order: snapshots, snapshot
    /// dependencies, object versions, memberships, object dependencies.
    pub fn ingest(&self, batch: &SourceBatch) -> Result<IngestReport> {
        let mut report = IngestReport {
            snapshots: self.register_snapshots(&batch.snapshots)?,
            snapshot_dependencies: self
                .register_snapshot_dependencies(&batch.snapshot_dependencies)?,
            ..IngestReport::default()
        };

        let versions = self.unseen_object_versions(&batch.object_versions)?;
        report.object_versions_skipped = batch.object_versions.len() - versions.len();
        report.object_versions = self.register_object_versions(&versions)?;

        report.memberships = self.register_memberships(&batch.memberships)?;

        let edges = self.unseen_object_dependencies(&batch.object_dependencies)?;
        report.object_dependencies_skipped = batch.object_dependencies.len() - edges.len();
        report.object_dependencies = self.register_object_dependencies(&edges)?;

        let processed = SnapshotUpdate::objects_processed();
        for id in batch.snapshot_ids() {
            self.update_snapshot(id, &processed)?;
        }

        info!(
            snapshots = report.snapshots,
            snapshot_dependencies = report.snapshot_dependencies,
            object_versions = report.object_versions,
            object_versions_skipped = report.object_versions_skipped,
            memberships = report.memberships,
            object_dependencies = report.object_dependencies,
            object_dependencies_skipped = report.object_dependencies_skipped,
            "Ingested source batch"
        );

        Ok(report)
    }

    /// Remove the records a source file introduced, then sweep orphans.
    ///
    /// Deletes the snapshots' memberships, their outgoing snapshot
    /// dependencies and the snapshots themselves by explicit filter. The
    /// orphan cleanup then removes object versions no longer in any
    /// snapshot, their edges, and toolkits nothing depends on any more.
    pub fn remove_source(&self, snapshot_ids: &[SnapshotId]) -> Result<RemovalReport> {
        let ids = snapshot_ids.iter().copied();

        let memberships = self.remove_memberships(
            &MembershipFilter::all().is_in(MembershipField::SnapshotId, ids.clone()),
        )?;
        let snapshot_dependencies = self.remove_snapshot_dependencies(
            &SnapshotDependencyFilter::all().is_in(SnapshotDependencyField::Parent, ids.clone()),
        )?;
        let snapshots =
            self.remove_snapshots(&SnapshotFilter::all().is_in(SnapshotField::SnapshotId, ids))?;
        let cleanup = self.run_orphan_cleanup()?;

        let report = RemovalReport {
            memberships,
            snapshot_dependencies,
            snapshots,
            cleanup,
        };
        info!(
            requested = snapshot_ids.len(),
            snapshots = report.snapshots,
            total = report.total(),
            "Removed source"
        );

        Ok(report)
    }

    /// Remove every snapshot of application `app_id` as one source.
    pub fn remove_app(&self, app_id: i64) -> Result<RemovalReport> {
        let ids: Vec<SnapshotId> = self
            .get_snapshots(&SnapshotFilter::all().eq(SnapshotField::AppId, app_id))?
            .iter()
            .map(|s| s.snapshot_id)
            .collect();

        debug!(app_id, snapshots = ids.len(), "Removing application");
        self.remove_source(&ids)
    }

    fn unseen_object_versions(&self, versions: &[ObjectVersion]) -> Result<Vec<ObjectVersion>> {
        let ids: Vec<ObjectVersionId> = versions.iter().map(|v| v.object_version_id).collect();

        let mut known = HashSet::new();
        for chunk in ids.chunks(LOOKUP_CHUNK) {
            let filter = ObjectVersionFilter::all()
                .is_in(ObjectVersionField::ObjectVersionId, chunk.iter().copied());
            known.extend(
                self.store()
                    .object_versions()
                    .list_where(&filter)?
                    .into_iter()
                    .map(|v| v.object_version_id),
            );
        }

        Ok(versions
            .iter()
            .filter(|v| known.insert(v.object_version_id))
            .cloned()
            .collect())
    }

    fn unseen_object_dependencies(
        &self,
        edges: &[ObjectDependency],
    ) -> Result<Vec<ObjectDependency>> {
        let mut parents: Vec<ObjectVersionId> = edges.iter().map(|e| e.parent).collect();
        parents.sort_unstable();
        parents.dedup();

        let mut known: HashSet<EdgeKey> = HashSet::new();
        for chunk in parents.chunks(LOOKUP_CHUNK) {
            let filter = ObjectDependencyFilter::all()
                .is_in(ObjectDependencyField::Parent, chunk.iter().copied());
            known.extend(
                self.store()
                    .object_dependencies()
                    .list_where(&filter)?
                    .iter()
                    .map(edge_key),
            );
        }

        Ok(edges
            .iter()
            .filter(|e| known.insert(edge_key(e)))
            .cloned()
            .collect())
    }
}
