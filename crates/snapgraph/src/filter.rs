//! Typed row filters.
//!
//! A [`Filter`] maps fields of one relation to either an equality term or a
//! membership-set term. Terms combine with AND; an empty filter matches every
//! row. Column names come only from the per-relation field enums and values
//! are always bound as statement parameters, so no caller-supplied text ever
//! reaches the SQL string.

use rusqlite::types::{ToSql, ToSqlOutput};

use crate::types::{ObjectVersionId, SnapshotId};

/// A single comparable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integer value (IDs, ranks)
    Int(i64),
    /// Text value (names, types)
    Text(String),
    /// Boolean flag
    Bool(bool),
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Int(v) => v.to_sql(),
            Self::Text(v) => v.to_sql(),
            Self::Bool(v) => v.to_sql(),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<SnapshotId> for Value {
    fn from(v: SnapshotId) -> Self {
        Self::Int(v.as_i64())
    }
}

impl From<ObjectVersionId> for Value {
    fn from(v: ObjectVersionId) -> Self {
        Self::Int(v.as_i64())
    }
}

/// How a field is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTerm {
    /// Field equals the value
    Eq(Value),
    /// Field equals one of the values; an empty set matches nothing
    In(Vec<Value>),
}

/// A filterable column of one relation.
pub trait Field: Copy + Eq + std::fmt::Debug {
    /// Column name in the backing table.
    fn column(self) -> &'static str;
}

/// AND-combined set of field terms for one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<F: Field> {
    terms: Vec<(F, FilterTerm)>,
}

impl<F: Field> Default for Filter<F> {
    fn default() -> Self {
        Self { terms: Vec::new() }
    }
}

impl<F: Field> Filter<F> {
    /// Filter matching every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `field == value`, replacing any earlier term on the same field.
    #[must_use]
    pub fn eq(self, field: F, value: impl Into<Value>) -> Self {
        self.with(field, FilterTerm::Eq(value.into()))
    }

    /// Require `field` to be one of `values`, replacing any earlier term on the same field.
    #[must_use]
    pub fn is_in<V: Into<Value>>(self, field: F, values: impl IntoIterator<Item = V>) -> Self {
        self.with(
            field,
            FilterTerm::In(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Set the term for `field`.
    #[must_use]
    pub fn with(mut self, field: F, term: FilterTerm) -> Self {
        if let Some(slot) = self.terms.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = term;
        } else {
            self.terms.push((field, term));
        }
        self
    }

    /// Returns `true` if this filter matches every row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The terms in insertion order.
    #[must_use]
    pub fn terms(&self) -> &[(F, FilterTerm)] {
        &self.terms
    }

    /// Render as a boolean SQL expression with `?` placeholders.
    ///
    /// `alias` qualifies column names (e.g. `Some("s")` yields `s.app_id`).
    /// Parameters are appended to `params` in placeholder order.
    pub(crate) fn to_sql(&self, alias: Option<&str>, params: &mut Vec<Value>) -> String {
        if self.terms.is_empty() {
            return "1".to_string();
        }

        let clauses: Vec<String> = self
            .terms
            .iter()
            .map(|(field, term)| {
                let column = match alias {
                    Some(a) => format!("{a}.{}", field.column()),
                    None => field.column().to_string(),
                };
                match term {
                    FilterTerm::Eq(v) => {
                        params.push(v.clone());
                        format!("{column} = ?")
                    }
                    FilterTerm::In(values) if values.is_empty() => "0".to_string(),
                    FilterTerm::In(values) => {
                        params.extend(values.iter().cloned());
                        let placeholders = vec!["?"; values.len()].join(", ");
                        format!("{column} IN ({placeholders})")
                    }
                }
            })
            .collect();

        clauses.join(" AND ")
    }
}

/// Filterable columns of `snapshots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SnapshotField {
    SnapshotId,
    AppId,
    BranchId,
    SnapshotName,
    BranchName,
    AppShortName,
    AppName,
    IsToolkit,
    IsObjectsProcessed,
}

impl Field for SnapshotField {
    fn column(self) -> &'static str {
        match self {
            Self::SnapshotId => "snapshot_id",
            Self::AppId => "app_id",
            Self::BranchId => "branch_id",
            Self::SnapshotName => "snapshot_name",
            Self::BranchName => "branch_name",
            Self::AppShortName => "app_short_name",
            Self::AppName => "app_name",
            Self::IsToolkit => "is_toolkit",
            Self::IsObjectsProcessed => "is_objects_processed",
        }
    }
}

/// Filterable columns of `object_versions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ObjectVersionField {
    ObjectVersionId,
    ObjectId,
    Name,
    Type,
    Subtype,
}

impl Field for ObjectVersionField {
    fn column(self) -> &'static str {
        match self {
            Self::ObjectVersionId => "object_version_id",
            Self::ObjectId => "object_id",
            Self::Name => "name",
            Self::Type => "type",
            Self::Subtype => "subtype",
        }
    }
}

/// Filterable columns of `object_deps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ObjectDependencyField {
    Parent,
    Child,
    DependencyType,
    DependencyName,
}

impl Field for ObjectDependencyField {
    fn column(self) -> &'static str {
        match self {
            Self::Parent => "parent_object_version_id",
            Self::Child => "child_object_version_id",
            Self::DependencyType => "dependency_type",
            Self::DependencyName => "dependency_name",
        }
    }
}

/// Filterable columns of `snapshot_deps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SnapshotDependencyField {
    Parent,
    Child,
    Rank,
    DependencyId,
}

impl Field for SnapshotDependencyField {
    fn column(self) -> &'static str {
        match self {
            Self::Parent => "parent_snapshot_id",
            Self::Child => "child_snapshot_id",
            Self::Rank => "rank",
            Self::DependencyId => "dependency_id",
        }
    }
}

/// Filterable columns of `memberships`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MembershipField {
    ObjectVersionId,
    SnapshotId,
    ObjectId,
}

impl Field for MembershipField {
    fn column(self) -> &'static str {
        match self {
            Self::ObjectVersionId => "object_version_id",
            Self::SnapshotId => "snapshot_id",
            Self::ObjectId => "object_id",
        }
    }
}

/// Filter over snapshots.
pub type SnapshotFilter = Filter<SnapshotField>;
/// Filter over object versions.
pub type ObjectVersionFilter = Filter<ObjectVersionField>;
/// Filter over object dependency edges.
pub type ObjectDependencyFilter = Filter<ObjectDependencyField>;
/// Filter over snapshot dependency edges.
pub type SnapshotDependencyFilter = Filter<SnapshotDependencyField>;
/// Filter over memberships.
pub type MembershipFilter = Filter<MembershipField>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_filter_renders_as_true() {
        let mut params = Vec::new();

        let sql = SnapshotFilter::all().to_sql(None, &mut params);

        assert_eq!(sql, "1");
        assert!(params.is_empty());
    }

    #[test]
    fn terms_combine_with_and_in_order() {
        let mut params = Vec::new();
        let filter = SnapshotFilter::all()
            .eq(SnapshotField::AppId, 7)
            .is_in(SnapshotField::BranchId, [1_i64, 2]);

        let sql = filter.to_sql(Some("s"), &mut params);

        assert_eq!(sql, "s.app_id = ? AND s.branch_id IN (?, ?)");
        assert_eq!(params, vec![Value::Int(7), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn empty_membership_set_matches_nothing() {
        let mut params = Vec::new();
        let filter = SnapshotFilter::all().is_in(SnapshotField::SnapshotId, Vec::<i64>::new());

        let sql = filter.to_sql(None, &mut params);

        assert_eq!(sql, "0");
        assert!(params.is_empty());
    }

    #[test]
    fn later_term_replaces_earlier_term_on_same_field() {
        let filter = ObjectVersionFilter::all()
            .eq(ObjectVersionField::Name, "old")
            .eq(ObjectVersionField::Name, "new");

        assert_eq!(filter.terms().len(), 1);
        assert_eq!(
            filter.terms()[0].1,
            FilterTerm::Eq(Value::Text("new".to_string()))
        );
    }

    #[test]
    fn values_never_appear_in_sql_text() {
        let mut params = Vec::new();
        let hostile = "x' OR '1'='1";
        let filter = ObjectVersionFilter::all().eq(ObjectVersionField::Name, hostile);

        let sql = filter.to_sql(None, &mut params);

        assert!(!sql.contains(hostile));
        assert_eq!(params, vec![Value::Text(hostile.to_string())]);
    }

    #[rstest]
    #[case::parent(ObjectDependencyField::Parent, "parent_object_version_id")]
    #[case::child(ObjectDependencyField::Child, "child_object_version_id")]
    #[case::dep_type(ObjectDependencyField::DependencyType, "dependency_type")]
    #[case::dep_name(ObjectDependencyField::DependencyName, "dependency_name")]
    fn object_dependency_fields_map_to_columns(
        #[case] field: ObjectDependencyField,
        #[case] expected: &str,
    ) {
        assert_eq!(field.column(), expected);
    }
}
