//! Generic typed accessor over one relation.
//!
//! Each relation implements [`Record`] in its own module (`snapshots`,
//! `object_versions`, ...). [`Repository`] turns those definitions into the
//! uniform insert / list / delete surface. Every call acquires the store's
//! connection for its own duration only.

use std::marker::PhantomData;

use rusqlite::{params_from_iter, Row, Statement};
use tracing::debug;

use super::Store;
use crate::error::{Error, Result};
use crate::filter::{Field, Filter};

/// A row type stored in one relation.
pub trait Record: Sized {
    /// Filterable columns of the relation.
    type Field: Field;

    /// Table name.
    const TABLE: &'static str;

    /// Column list, in the order `from_row` reads them.
    const COLUMNS: &'static str;

    /// Column the relation is naturally ordered by.
    const ORDER_BY: &'static str;

    /// Parameterized insert statement.
    const INSERT: &'static str;

    /// Set-based delete of rows violating the relation's reference invariant.
    const DELETE_ORPHANED: &'static str;

    /// Convert a row selected with `COLUMNS`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Execute the prepared `INSERT` statement for this record.
    fn execute_insert(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<usize>;
}

/// Typed accessor for the relation backing `R`.
pub struct Repository<'a, R: Record> {
    store: &'a Store,
    _record: PhantomData<fn() -> R>,
}

impl<'a, R: Record> Repository<'a, R> {
    pub(crate) fn new(store: &'a Store) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Insert one record.
    pub fn insert(&self, record: &R) -> Result<()> {
        let conn = self.store.connection()?;
        let mut stmt = conn.prepare_cached(R::INSERT)?;
        record.execute_insert(&mut stmt)?;
        Ok(())
    }

    /// Insert all records in one transaction.
    ///
    /// If any insert fails, nothing is committed and the failure is returned
    /// as [`Error::BatchAborted`] naming the failing record's position.
    pub fn insert_many(&self, records: &[R]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.store.connection()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(R::INSERT)?;
            for (index, record) in records.iter().enumerate() {
                if let Err(e) = record.execute_insert(&mut stmt) {
                    debug!(
                        table = R::TABLE,
                        index,
                        batch = records.len(),
                        error = %e,
                        "Batch insert failed, rolling back"
                    );
                    return Err(Error::batch_aborted(index, e.into()));
                }
            }
        }
        tx.commit()?;

        debug!(table = R::TABLE, rows = records.len(), "Batch inserted");
        Ok(records.len())
    }

    /// All rows in natural order.
    pub fn list_all(&self) -> Result<Vec<R>> {
        self.list_where(&Filter::all())
    }

    /// Rows matching `filter`, in natural order.
    pub fn list_where(&self, filter: &Filter<R::Field>) -> Result<Vec<R>> {
        let mut params = Vec::new();
        let predicate = filter.to_sql(None, &mut params);
        let sql = format!(
            "SELECT {} FROM {} WHERE {predicate} ORDER BY {}",
            R::COLUMNS,
            R::TABLE,
            R::ORDER_BY
        );

        let conn = self.store.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), R::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// First row matching `filter` in natural order, if any.
    pub fn find_one_where(&self, filter: &Filter<R::Field>) -> Result<Option<R>> {
        let mut params = Vec::new();
        let predicate = filter.to_sql(None, &mut params);
        let sql = format!(
            "SELECT {} FROM {} WHERE {predicate} ORDER BY {} LIMIT 1",
            R::COLUMNS,
            R::TABLE,
            R::ORDER_BY
        );

        let conn = self.store.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(params_from_iter(params.iter()), R::from_row)?;
        let first = rows.next().transpose()?;

        Ok(first)
    }

    /// Number of rows matching `filter`.
    pub fn count_where(&self, filter: &Filter<R::Field>) -> Result<usize> {
        let mut params = Vec::new();
        let predicate = filter.to_sql(None, &mut params);
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {predicate}", R::TABLE);

        let conn = self.store.connection()?;
        let count: i64 = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Delete rows matching `filter`. Returns the number of rows deleted.
    pub fn delete_where(&self, filter: &Filter<R::Field>) -> Result<usize> {
        let mut params = Vec::new();
        let predicate = filter.to_sql(None, &mut params);
        let sql = format!("DELETE FROM {} WHERE {predicate}", R::TABLE);

        let conn = self.store.connection()?;
        let deleted = conn.execute(&sql, params_from_iter(params.iter()))?;

        debug!(table = R::TABLE, deleted, "Deleted by filter");
        Ok(deleted)
    }

    /// Delete rows whose required referenced row no longer exists.
    ///
    /// Runs as a single statement; calling it on an already-clean relation
    /// deletes nothing.
    pub fn delete_orphaned(&self) -> Result<usize> {
        let conn = self.store.connection()?;
        let deleted = conn.execute(R::DELETE_ORPHANED, [])?;

        debug!(table = R::TABLE, deleted, "Deleted orphaned rows");
        Ok(deleted)
    }
}
