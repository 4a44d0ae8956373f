//! Orphan cascade cleanup.
//!
//! Each relation's orphan predicate depends on relations swept before it, so
//! the steps always run in this order:
//!
//! 1. memberships whose snapshot is gone
//! 2. object versions with no membership left
//! 3. object dependencies whose parent object version is gone
//! 4. snapshot dependencies whose parent snapshot is gone
//! 5. toolkit snapshots nothing depends on any more
//!
//! Step 5 can orphan rows that steps 1 and 4 check (the toolkit's own
//! memberships and outgoing edges), so the sequence is repeated until a full
//! pass deletes nothing. The steps are not wrapped in one transaction; a
//! failure aborts the remaining steps and re-running the cleanup finishes
//! the job.

use serde::Serialize;
use tracing::{debug, info};

use crate::db::Store;
use crate::error::Result;

/// One step of the cleanup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupStep {
    /// Memberships whose snapshot no longer exists
    Memberships,
    /// Object versions that belong to no snapshot
    ObjectVersions,
    /// Object dependencies whose parent no longer exists
    ObjectDependencies,
    /// Snapshot dependencies whose parent no longer exists
    SnapshotDependencies,
    /// Toolkit snapshots with no remaining dependents
    Snapshots,
}

impl CleanupStep {
    /// The steps in the order they must run.
    pub const ORDER: [Self; 5] = [
        Self::Memberships,
        Self::ObjectVersions,
        Self::ObjectDependencies,
        Self::SnapshotDependencies,
        Self::Snapshots,
    ];

    /// Name of the relation this step sweeps.
    #[must_use]
    pub fn relation(self) -> &'static str {
        match self {
            Self::Memberships => "memberships",
            Self::ObjectVersions => "object_versions",
            Self::ObjectDependencies => "object_deps",
            Self::SnapshotDependencies => "snapshot_deps",
            Self::Snapshots => "snapshots",
        }
    }

    fn run(self, store: &Store) -> Result<usize> {
        match self {
            Self::Memberships => store.memberships().delete_orphaned(),
            Self::ObjectVersions => store.object_versions().delete_orphaned(),
            Self::ObjectDependencies => store.object_dependencies().delete_orphaned(),
            Self::SnapshotDependencies => store.snapshot_dependencies().delete_orphaned(),
            Self::Snapshots => store.snapshots().delete_orphaned(),
        }
    }
}

/// Rows deleted by one cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Memberships deleted
    pub memberships: usize,
    /// Object versions deleted
    pub object_versions: usize,
    /// Object dependencies deleted
    pub object_dependencies: usize,
    /// Snapshot dependencies deleted
    pub snapshot_dependencies: usize,
    /// Toolkit snapshots deleted
    pub snapshots: usize,
    /// Full passes over the sequence, including the final pass that deleted nothing
    pub passes: usize,
}

impl CleanupReport {
    /// Total rows deleted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.memberships
            + self.object_versions
            + self.object_dependencies
            + self.snapshot_dependencies
            + self.snapshots
    }

    /// Rows deleted by `step`.
    #[must_use]
    pub fn deleted_by(&self, step: CleanupStep) -> usize {
        match step {
            CleanupStep::Memberships => self.memberships,
            CleanupStep::ObjectVersions => self.object_versions,
            CleanupStep::ObjectDependencies => self.object_dependencies,
            CleanupStep::SnapshotDependencies => self.snapshot_dependencies,
            CleanupStep::Snapshots => self.snapshots,
        }
    }

    fn record(&mut self, step: CleanupStep, deleted: usize) {
        let slot = match step {
            CleanupStep::Memberships => &mut self.memberships,
            CleanupStep::ObjectVersions => &mut self.object_versions,
            CleanupStep::ObjectDependencies => &mut self.object_dependencies,
            CleanupStep::SnapshotDependencies => &mut self.snapshot_dependencies,
            CleanupStep::Snapshots => &mut self.snapshots,
        };
        *slot += deleted;
    }
}

/// Sweep orphaned rows from every relation until nothing is left to sweep.
pub(crate) fn run_orphan_cleanup(store: &Store) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    loop {
        report.passes += 1;
        let mut deleted_this_pass = 0;

        for step in CleanupStep::ORDER {
            let deleted = step.run(store)?;
            debug!(
                pass = report.passes,
                relation = step.relation(),
                deleted,
                "Cleanup step complete"
            );
            report.record(step, deleted);
            deleted_this_pass += deleted;
        }

        if deleted_this_pass == 0 {
            break;
        }
    }

    info!(
        memberships = report.memberships,
        object_versions = report.object_versions,
        object_dependencies = report.object_dependencies,
        snapshot_dependencies = report.snapshot_dependencies,
        snapshots = report.snapshots,
        passes = report.passes,
        "Orphan cleanup complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{SnapshotField, SnapshotFilter};
    use crate::types::{
        Membership, ObjectDependency, ObjectVersion, ObjectVersionId, Snapshot,
        SnapshotDependency, SnapshotId,
    };

    fn snapshot(id: i64, is_toolkit: bool) -> Snapshot {
        Snapshot {
            snapshot_id: SnapshotId(id),
            app_id: id,
            branch_id: 1,
            snapshot_name: format!("snap-{id}"),
            branch_name: "main".to_string(),
            app_short_name: format!("S{id}"),
            app_name: format!("Snapshot {id}"),
            is_toolkit,
            is_objects_processed: true,
        }
    }

    fn depends(parent: i64, child: i64) -> SnapshotDependency {
        SnapshotDependency {
            parent: SnapshotId(parent),
            child: SnapshotId(child),
            rank: 1,
            dependency_id: parent * 10 + child,
        }
    }

    fn object_in(store: &Store, ov: i64, snapshot: i64) {
        store
            .object_versions()
            .insert(&ObjectVersion {
                object_version_id: ObjectVersionId(ov),
                object_id: ov,
                name: format!("obj-{ov}"),
                object_type: "rule".to_string(),
                subtype: None,
            })
            .unwrap();
        store
            .memberships()
            .insert(&Membership {
                object_version_id: ObjectVersionId(ov),
                snapshot_id: SnapshotId(snapshot),
                object_id: ov,
            })
            .unwrap();
    }

    #[test]
    fn clean_store_needs_one_pass() {
        let store = Store::open_in_memory().unwrap();
        store.snapshots().insert(&snapshot(1, false)).unwrap();

        let report = run_orphan_cleanup(&store).unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn orphaned_toolkit_members_are_swept_in_the_same_run() {
        let store = Store::open_in_memory().unwrap();
        // 1 (app) -> 2 (toolkit); object 20 lives in the toolkit
        store
            .snapshots()
            .insert_many(&[snapshot(1, false), snapshot(2, true)])
            .unwrap();
        store.snapshot_dependencies().insert(&depends(1, 2)).unwrap();
        object_in(&store, 20, 2);

        store
            .snapshots()
            .delete_where(&SnapshotFilter::all().eq(SnapshotField::SnapshotId, 1_i64))
            .unwrap();
        let report = run_orphan_cleanup(&store).unwrap();

        assert_eq!(report.snapshot_dependencies, 1);
        assert_eq!(report.snapshots, 1);
        assert_eq!(report.memberships, 1);
        assert_eq!(report.object_versions, 1);
        assert_eq!(store.stats().unwrap().total(), 0);

        let again = run_orphan_cleanup(&store).unwrap();
        assert_eq!(again.total(), 0);
    }

    #[test]
    fn toolkit_chain_is_swept_transitively() {
        let store = Store::open_in_memory().unwrap();
        // 1 (app) -> 2 (toolkit) -> 3 (toolkit)
        store
            .snapshots()
            .insert_many(&[snapshot(2, true), snapshot(3, true)])
            .unwrap();
        store
            .snapshot_dependencies()
            .insert_many(&[depends(1, 2), depends(2, 3)])
            .unwrap();

        let report = run_orphan_cleanup(&store).unwrap();

        assert_eq!(report.snapshots, 2);
        assert_eq!(report.snapshot_dependencies, 2);
        assert!(report.passes >= 3);
        assert_eq!(store.stats().unwrap().total(), 0);
    }

    #[test]
    fn edges_of_removed_objects_are_swept() {
        let store = Store::open_in_memory().unwrap();
        store.snapshots().insert(&snapshot(1, false)).unwrap();
        object_in(&store, 10, 1);
        store
            .object_dependencies()
            .insert_many(&[
                ObjectDependency {
                    parent: ObjectVersionId(10),
                    child: ObjectVersionId(11),
                    dependency_type: "rule".to_string(),
                    dependency_name: "a".to_string(),
                },
                ObjectDependency {
                    parent: ObjectVersionId(11),
                    child: ObjectVersionId(10),
                    dependency_type: "rule".to_string(),
                    dependency_name: "b".to_string(),
                },
            ])
            .unwrap();

        let report = run_orphan_cleanup(&store).unwrap();

        assert_eq!(report.object_dependencies, 1);
        assert_eq!(report.deleted_by(CleanupStep::ObjectDependencies), 1);
        assert_eq!(store.object_dependencies().list_all().unwrap().len(), 1);
    }

    #[test]
    fn mutually_dependent_toolkits_are_left_behind() {
        let store = Store::open_in_memory().unwrap();
        store
            .snapshots()
            .insert_many(&[snapshot(1, true), snapshot(2, true)])
            .unwrap();
        store
            .snapshot_dependencies()
            .insert_many(&[depends(1, 2), depends(2, 1)])
            .unwrap();

        let report = run_orphan_cleanup(&store).unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(store.stats().unwrap().snapshots, 2);
    }
}
