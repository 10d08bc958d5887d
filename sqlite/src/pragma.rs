//! Schema introspection through SQLite PRAGMA statements
//!
//! Builds [`EntitySchema`]s straight from a live connection so endpoints can be
//! set up without a hand-written schema description.
//!
//! ```
//! use canopy_sqlite::pragma::Pragma;
//! use canopy_core::ToSQL;
//!
//! let pragma = Pragma::table_info("categories");
//! assert_eq!(pragma.to_sql().sql(), r#"PRAGMA table_info("categories")"#);
//! ```

use std::borrow::Cow;

use canopy_core::{Catalog, EntitySchema, FieldDescriptor, SQL, ToSQL};

use crate::values::SQLiteValue;

/// The introspection pragmas used to describe a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pragma<'a> {
    /// Columns of one table
    ///
    /// [SQLite Documentation](https://sqlite.org/pragma.html#pragma_table_info)
    TableInfo(Cow<'a, str>),
    /// Tables and views of every attached schema
    ///
    /// [SQLite Documentation](https://sqlite.org/pragma.html#pragma_table_list)
    TableList,
}

impl<'a> Pragma<'a> {
    pub fn table_info(table: impl Into<Cow<'a, str>>) -> Self {
        Self::TableInfo(table.into())
    }

    pub fn table_list() -> Self {
        Self::TableList
    }
}

impl<'a> ToSQL<'a, SQLiteValue> for Pragma<'a> {
    fn to_sql(&self) -> SQL<'a, SQLiteValue> {
        match self {
            Pragma::TableInfo(table) => {
                SQL::raw(format!("PRAGMA table_info(\"{}\")", table.replace('"', "\"\"")))
            }
            Pragma::TableList => SQL::raw("PRAGMA table_list"),
        }
    }
}

#[cfg(feature = "rusqlite")]
mod introspect {
    use canopy_core::error::{CanopyError, Result};
    use rusqlite::Connection;

    use super::*;

    /// Describes `table` from `PRAGMA table_info`.
    ///
    /// Fails with [`CanopyError::UnknownEntity`] when the table does not exist.
    pub fn table_info(conn: &Connection, table: &str) -> Result<EntitySchema> {
        let sql = Pragma::table_info(table).to_sql().sql();
        canopy_core::canopy_trace_query!(&sql, 0);

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut schema = EntitySchema::new(table);
        let mut empty = true;
        while let Some(row) = rows.next()? {
            empty = false;
            let name: String = row.get("name")?;
            let sql_type: String = row.get("type")?;
            let not_null: i64 = row.get("notnull")?;
            let pk: i64 = row.get("pk")?;

            let mut field = FieldDescriptor::new(name, sql_type);
            if pk > 0 {
                field = field.primary_key();
            }
            if not_null != 0 {
                field = field.not_null();
            }
            schema = schema.field(field);
        }

        if empty {
            return Err(CanopyError::UnknownEntity(table.to_string()));
        }
        Ok(schema)
    }

    /// User tables of the main schema, in the order SQLite lists them
    pub fn tables(conn: &Connection) -> Result<Vec<String>> {
        let sql = Pragma::table_list().to_sql().sql();
        canopy_core::canopy_trace_query!(&sql, 0);

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut tables = Vec::new();
        while let Some(row) = rows.next()? {
            let schema: String = row.get("schema")?;
            let kind: String = row.get("type")?;
            let name: String = row.get("name")?;
            if schema == "main" && kind == "table" && !name.starts_with("sqlite_") {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    /// A catalog of the named tables
    pub fn catalog<S: AsRef<str>>(conn: &Connection, tables: &[S]) -> Result<Catalog> {
        tables
            .iter()
            .map(|table| table_info(conn, table.as_ref()))
            .collect()
    }

    /// A catalog of every user table
    pub fn catalog_all(conn: &Connection) -> Result<Catalog> {
        catalog(conn, &tables(conn)?)
    }
}

#[cfg(feature = "rusqlite")]
pub use introspect::{catalog, catalog_all, table_info, tables};
