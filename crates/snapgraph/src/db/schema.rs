//! Database schema definition for the graph store.
//!
//! No foreign keys: rows may outlive the rows they reference until the orphan
//! cleanup sweeps them, and removal by filter never cascades implicitly.

/// Database schema definition.
pub(crate) const SCHEMA: &str = r"
-- Ingested application and toolkit snapshots
CREATE TABLE IF NOT EXISTS snapshots (
    snapshot_id INTEGER PRIMARY KEY,
    app_id INTEGER NOT NULL,
    branch_id INTEGER NOT NULL,
    snapshot_name TEXT NOT NULL,
    branch_name TEXT NOT NULL,
    app_short_name TEXT NOT NULL,
    app_name TEXT NOT NULL,
    is_toolkit INTEGER NOT NULL DEFAULT 0,
    is_objects_processed INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_snapshots_app ON snapshots(app_id);
CREATE INDEX IF NOT EXISTS idx_snapshots_toolkit ON snapshots(is_toolkit) WHERE is_toolkit = 1;

-- Versioned entities found inside snapshots
CREATE TABLE IF NOT EXISTS object_versions (
    object_version_id INTEGER PRIMARY KEY,
    object_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    subtype TEXT
);

CREATE INDEX IF NOT EXISTS idx_object_versions_object ON object_versions(object_id);

-- Object version -> object version edges
-- Duplicates are permitted; ingestion should avoid them.
CREATE TABLE IF NOT EXISTS object_deps (
    parent_object_version_id INTEGER NOT NULL,
    child_object_version_id INTEGER NOT NULL,
    dependency_type TEXT NOT NULL CHECK (length(dependency_type) > 0),
    dependency_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_object_deps_parent ON object_deps(parent_object_version_id);
CREATE INDEX IF NOT EXISTS idx_object_deps_child ON object_deps(child_object_version_id);

-- Snapshot -> snapshot edges (e.g. toolkit usage)
CREATE TABLE IF NOT EXISTS snapshot_deps (
    parent_snapshot_id INTEGER NOT NULL,
    child_snapshot_id INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    dependency_id INTEGER NOT NULL,
    UNIQUE (parent_snapshot_id, child_snapshot_id, dependency_id)
);

CREATE INDEX IF NOT EXISTS idx_snapshot_deps_child ON snapshot_deps(child_snapshot_id);

-- Object version membership in snapshots (the only cross-link between the graphs)
CREATE TABLE IF NOT EXISTS memberships (
    object_version_id INTEGER NOT NULL,
    snapshot_id INTEGER NOT NULL,
    object_id INTEGER NOT NULL,
    PRIMARY KEY (object_version_id, snapshot_id)
);

CREATE INDEX IF NOT EXISTS idx_memberships_snapshot ON memberships(snapshot_id);
";
