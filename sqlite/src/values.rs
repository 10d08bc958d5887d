//! The SQLite parameter and column value type

use std::borrow::Cow;
use std::fmt;

use canopy_core::error::CanopyError;
use canopy_core::{Dialect, SQL, SQLParam, ToSQL};

/// An owned SQLite value, one variant per storage class.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SQLiteValue {
    /// Integer value (i64)
    Integer(i64),
    /// Real value (f64)
    Real(f64),
    /// Text value
    Text(String),
    /// Blob value
    Blob(Box<[u8]>),
    /// NULL value
    #[default]
    Null,
}

impl SQLiteValue {
    /// Returns true if this value is NULL.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, SQLiteValue::Null)
    }

    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            SQLiteValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            SQLiteValue::Real(value) => Some(*value),
            SQLiteValue::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SQLiteValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            SQLiteValue::Blob(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    /// The value as a tree key. NULL, blobs and empty text have none.
    pub fn key(&self) -> Option<String> {
        match self {
            SQLiteValue::Integer(value) => Some(value.to_string()),
            SQLiteValue::Real(value) => Some(value.to_string()),
            SQLiteValue::Text(value) if !value.is_empty() => Some(value.clone()),
            _ => None,
        }
    }

    const fn storage_class(&self) -> &'static str {
        match self {
            SQLiteValue::Integer(_) => "INTEGER",
            SQLiteValue::Real(_) => "REAL",
            SQLiteValue::Text(_) => "TEXT",
            SQLiteValue::Blob(_) => "BLOB",
            SQLiteValue::Null => "NULL",
        }
    }
}

impl fmt::Display for SQLiteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SQLiteValue::Integer(i) => write!(f, "{i}"),
            SQLiteValue::Real(r) => write!(f, "{r}"),
            SQLiteValue::Text(s) => f.write_str(s),
            SQLiteValue::Blob(b) => f.write_str(&String::from_utf8_lossy(b)),
            SQLiteValue::Null => Ok(()),
        }
    }
}

impl SQLParam for SQLiteValue {
    const DIALECT: Dialect = Dialect::SQLite;
}

impl<'a> From<SQLiteValue> for SQL<'a, SQLiteValue> {
    fn from(value: SQLiteValue) -> Self {
        SQL::value(value)
    }
}

impl<'a> ToSQL<'a, SQLiteValue> for SQLiteValue {
    fn to_sql(&self) -> SQL<'a, SQLiteValue> {
        SQL::value(self.clone())
    }

    fn into_sql(self) -> SQL<'a, SQLiteValue> {
        SQL::value(self)
    }
}

impl From<SQLiteValue> for Cow<'_, SQLiteValue> {
    fn from(value: SQLiteValue) -> Self {
        Cow::Owned(value)
    }
}

impl<'a> From<&'a SQLiteValue> for Cow<'a, SQLiteValue> {
    fn from(value: &'a SQLiteValue) -> Self {
        Cow::Borrowed(value)
    }
}

//------------------------------------------------------------------------------
// From<T> implementations
//------------------------------------------------------------------------------

macro_rules! impl_from_int_for_sqlite_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SQLiteValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    SQLiteValue::Integer(value as i64)
                }
            }
        )*
    };
}

macro_rules! impl_from_float_for_sqlite_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SQLiteValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    SQLiteValue::Real(value as f64)
                }
            }
        )*
    };
}

impl_from_int_for_sqlite_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_from_float_for_sqlite_value!(f32, f64);

impl From<bool> for SQLiteValue {
    fn from(value: bool) -> Self {
        SQLiteValue::Integer(i64::from(value))
    }
}

impl From<&str> for SQLiteValue {
    fn from(value: &str) -> Self {
        SQLiteValue::Text(value.to_string())
    }
}

impl From<String> for SQLiteValue {
    fn from(value: String) -> Self {
        SQLiteValue::Text(value)
    }
}

impl From<Vec<u8>> for SQLiteValue {
    fn from(value: Vec<u8>) -> Self {
        SQLiteValue::Blob(value.into_boxed_slice())
    }
}

impl From<&[u8]> for SQLiteValue {
    fn from(value: &[u8]) -> Self {
        SQLiteValue::Blob(value.into())
    }
}

impl<T: Into<SQLiteValue>> From<Option<T>> for SQLiteValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SQLiteValue::Null, Into::into)
    }
}

//------------------------------------------------------------------------------
// TryFrom<SQLiteValue> implementations
//------------------------------------------------------------------------------

fn mismatch(value: &SQLiteValue, target: &str) -> CanopyError {
    CanopyError::Mapping(format!(
        "cannot read {} value as {target}",
        value.storage_class()
    ))
}

macro_rules! impl_try_from_sqlite_value {
    ($($ty:ty => |$value:ident| $convert:expr),* $(,)?) => {
        $(
            impl TryFrom<&SQLiteValue> for $ty {
                type Error = CanopyError;

                #[inline]
                fn try_from($value: &SQLiteValue) -> Result<Self, Self::Error> {
                    $convert.ok_or_else(|| mismatch($value, stringify!($ty)))
                }
            }

            impl TryFrom<SQLiteValue> for $ty {
                type Error = CanopyError;

                #[inline]
                fn try_from(value: SQLiteValue) -> Result<Self, Self::Error> {
                    <$ty>::try_from(&value)
                }
            }
        )*
    };
}

impl_try_from_sqlite_value!(
    i64 => |value| value.as_i64(),
    f64 => |value| value.as_f64(),
    bool => |value| value.as_i64().map(|i| i != 0),
    String => |value| value.as_str().map(str::to_string),
    Vec<u8> => |value| value.as_bytes().map(<[u8]>::to_vec),
);

//------------------------------------------------------------------------------
// rusqlite implementations
//------------------------------------------------------------------------------

#[cfg(feature = "rusqlite")]
impl rusqlite::ToSql for SQLiteValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, Value, ValueRef};

        Ok(match self {
            SQLiteValue::Null => ToSqlOutput::Owned(Value::Null),
            SQLiteValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SQLiteValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SQLiteValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SQLiteValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_ref())),
        })
    }
}

#[cfg(feature = "rusqlite")]
impl rusqlite::types::FromSql for SQLiteValue {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        Ok(SQLiteValue::from(value))
    }
}

#[cfg(feature = "rusqlite")]
impl From<rusqlite::types::ValueRef<'_>> for SQLiteValue {
    fn from(value: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;

        match value {
            ValueRef::Null => SQLiteValue::Null,
            ValueRef::Integer(i) => SQLiteValue::Integer(i),
            ValueRef::Real(r) => SQLiteValue::Real(r),
            ValueRef::Text(items) => SQLiteValue::Text(String::from_utf8_lossy(items).into_owned()),
            ValueRef::Blob(items) => SQLiteValue::Blob(items.into()),
        }
    }
}

//------------------------------------------------------------------------------
// serde
//------------------------------------------------------------------------------

/// Serializes as the bare value: numbers, strings, bytes or `null`.
#[cfg(feature = "serde")]
impl serde::Serialize for SQLiteValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SQLiteValue::Integer(i) => serializer.serialize_i64(*i),
            SQLiteValue::Real(r) => serializer.serialize_f64(*r),
            SQLiteValue::Text(s) => serializer.serialize_str(s),
            SQLiteValue::Blob(b) => serializer.serialize_bytes(b),
            SQLiteValue::Null => serializer.serialize_none(),
        }
    }
}
