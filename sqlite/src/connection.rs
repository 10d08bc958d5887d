//! Executing composed reads on a [`rusqlite`] connection
//!
//! ```
//! use canopy_sqlite::connection::Db;
//! use canopy_sqlite::{Record, SQLiteValue};
//! use canopy_core::SQL;
//!
//! let conn = rusqlite::Connection::open_in_memory()?;
//! let db = Db::new(&conn);
//! let rows: Vec<Record> = db.all(&SQL::raw("SELECT 1 AS one"))?;
//! assert_eq!(rows[0].get("one"), Some(&SQLiteValue::Integer(1)));
//! # Ok::<(), canopy_core::CanopyError>(())
//! ```

use std::sync::Arc;

use canopy_core::error::Result;
use canopy_core::{Composer, HierarchyRetriever, SQL, Selection, ToSQL, canopy_trace_query};
use rusqlite::{Connection, params_from_iter};

use crate::SqliteQuery;
use crate::record::FromSqliteRow;
use crate::values::SQLiteValue;

/// A borrowed connection that runs canopy statements.
#[derive(Clone, Copy, Debug)]
pub struct Db<'c> {
    conn: &'c Connection,
}

impl<'c> Db<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn conn(&self) -> &'c Connection {
        self.conn
    }

    /// Runs `sql` and converts every row
    pub fn all<T: FromSqliteRow>(&self, sql: &SQL<'_, SQLiteValue>) -> Result<Vec<T>> {
        canopy_core::canopy_profile_function!();
        let (sql_str, params) = sql.build();
        canopy_trace_query!(&sql_str, params.len());

        let mut stmt = self.conn.prepare(&sql_str)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(params))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(T::from_row(row, &columns)?);
        }
        Ok(out)
    }

    /// Runs a composed flat read
    pub fn select<T: FromSqliteRow>(&self, query: &SqliteQuery) -> Result<Vec<T>> {
        self.all(&query.to_sql())
    }

    /// Runs a hierarchical read. Never returns more than the retriever's
    /// row cap, whatever the statement produced.
    pub fn retrieve<T, C, X>(
        &self,
        retriever: &HierarchyRetriever,
        composer: &Composer<SqliteQuery, C, X>,
        criteria: &C,
        context: &X,
        selection: Selection<'_>,
    ) -> Result<Vec<T>>
    where
        T: FromSqliteRow,
        C: 'static,
        X: 'static,
    {
        let sql = retriever.build(composer, criteria, context, selection)?;
        let mut rows = self.all(&sql)?;
        rows.truncate(retriever.row_cap());
        Ok(rows)
    }
}

impl<'c> From<&'c Connection> for Db<'c> {
    fn from(conn: &'c Connection) -> Self {
        Self::new(conn)
    }
}
