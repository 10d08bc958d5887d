//! SQLite dialect for canopy
//!
//! The SQLite value type, execution of composed reads on `rusqlite`,
//! schema introspection through PRAGMA statements and ready-made read
//! endpoints.

pub mod pragma;
pub mod record;
pub mod values;

#[cfg(feature = "rusqlite")]
pub mod connection;
#[cfg(feature = "rusqlite")]
pub mod endpoint;

pub use record::{OptionItem, Record, TreeOptionItem};
pub use values::SQLiteValue;

#[cfg(feature = "rusqlite")]
pub use connection::Db;
#[cfg(feature = "rusqlite")]
pub use endpoint::{EndpointBuilder, ReadEndpoint, Transform};
#[cfg(feature = "rusqlite")]
pub use record::FromSqliteRow;

/// A select over SQLite values
pub type SqliteQuery = canopy_core::SelectQuery<SQLiteValue>;

/// A composer whose options build [`SqliteQuery`]s
pub type SqliteComposer<C, X> = canopy_core::Composer<SqliteQuery, C, X>;

/// A query option for [`SqliteQuery`]s
pub type SqliteOption<C, X> = canopy_core::QueryOption<SqliteQuery, C, X>;
