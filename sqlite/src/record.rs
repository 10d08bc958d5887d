//! Rows as they come back from a read: dynamic records and option projections

use std::sync::Arc;

use canopy_core::TreeNode;
use canopy_core::error::{CanopyError, Result};
use canopy_core::mapping::MappingField;

use crate::values::SQLiteValue;

/// A row keyed by column name.
///
/// Column names are shared by every record of one result set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<SQLiteValue>,
}

impl Record {
    /// Pairs `columns` with `values`; extra values or columns are dropped.
    pub fn new(columns: Arc<[String]>, mut values: Vec<SQLiteValue>) -> Self {
        values.truncate(columns.len());
        values.resize(columns.len(), SQLiteValue::Null);
        Self { columns, values }
    }

    /// Builds a record from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SQLiteValue>,
    {
        let (columns, values): (Vec<String>, Vec<SQLiteValue>) = pairs
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .unzip();
        Self::new(columns.into(), values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SQLiteValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value of `column`, matched the way SQLite matches names
    pub fn get(&self, column: &str) -> Option<&SQLiteValue> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .map(|index| &self.values[index])
    }

    /// Reads `column` as `T`; a missing column is a mapping error.
    pub fn get_as<'r, T>(&'r self, column: &str) -> Result<T>
    where
        T: TryFrom<&'r SQLiteValue, Error = CanopyError>,
    {
        let value = self
            .get(column)
            .ok_or_else(|| CanopyError::Mapping(format!("no column `{column}` in row")))?;
        T::try_from(value)
    }

    /// The tree key held in `column`
    pub fn key(&self, column: &str) -> Option<String> {
        self.get(column).and_then(SQLiteValue::key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SQLiteValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Removes `column`, returning its value
    pub fn take(&mut self, column: &str) -> SQLiteValue {
        match self
            .columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
        {
            Some(index) => std::mem::take(&mut self.values[index]),
            None => SQLiteValue::Null,
        }
    }
}

/// Serializes as a map in column order.
#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// A label/value projection of a row, as used by select inputs.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptionItem {
    pub label: SQLiteValue,
    pub value: SQLiteValue,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "SQLiteValue::is_null"))]
    pub description: SQLiteValue,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub id: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub parent_id: Option<String>,
}

impl OptionItem {
    /// Reads the logical field columns of a mapped row
    pub fn from_record(mut record: Record) -> Self {
        Self {
            id: record.key(MappingField::Id.as_str()),
            parent_id: record.key(MappingField::ParentId.as_str()),
            label: record.take(MappingField::Label.as_str()),
            value: record.take(MappingField::Value.as_str()),
            description: record.take(MappingField::Description.as_str()),
        }
    }
}

impl From<Record> for OptionItem {
    fn from(record: Record) -> Self {
        Self::from_record(record)
    }
}

/// An option with its nested children.
pub type TreeOptionItem = TreeNode<OptionItem>;

/// Converts a result row into a value.
#[cfg(feature = "rusqlite")]
pub trait FromSqliteRow: Sized {
    /// `columns` are the result set's column names, in row order.
    fn from_row(row: &rusqlite::Row<'_>, columns: &Arc<[String]>) -> Result<Self>;
}

#[cfg(feature = "rusqlite")]
impl FromSqliteRow for Record {
    fn from_row(row: &rusqlite::Row<'_>, columns: &Arc<[String]>) -> Result<Self> {
        let values = (0..columns.len())
            .map(|index| row.get::<_, SQLiteValue>(index))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Record {
            columns: Arc::clone(columns),
            values,
        })
    }
}

#[cfg(feature = "rusqlite")]
impl FromSqliteRow for OptionItem {
    fn from_row(row: &rusqlite::Row<'_>, columns: &Arc<[String]>) -> Result<Self> {
        Record::from_row(row, columns).map(OptionItem::from_record)
    }
}

#[cfg(feature = "rusqlite")]
impl FromSqliteRow for SQLiteValue {
    fn from_row(row: &rusqlite::Row<'_>, _: &Arc<[String]>) -> Result<Self> {
        Ok(row.get(0)?)
    }
}
