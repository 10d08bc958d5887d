//! # canopy
//!
//! Read-query composition for generic CRUD endpoints: options targeting the
//! phases of a query, column-mapping resolution, hierarchical retrieval through
//! a recursive CTE, and assembly of the flat rows into trees.
//!
//! ## Quick Start
//!
//! ```rust
//! use canopy::prelude::*;
//! use canopy::sqlite::{Db, ReadEndpoint, pragma};
//!
//! # fn main() -> canopy::Result<()> {
//! let conn = rusqlite::Connection::open_in_memory()?;
//! conn.execute_batch(
//!     "CREATE TABLE categories (id TEXT PRIMARY KEY, parent_id TEXT, name TEXT);
//!      INSERT INTO categories VALUES ('e1', NULL, 'Electronics'), ('e2', 'e1', 'Phones');",
//! )?;
//!
//! let endpoint: ReadEndpoint<(), ()> =
//!     ReadEndpoint::builder(pragma::table_info(&conn, "categories")?).build()?;
//!
//! let tree = endpoint.tree(Db::new(&conn), &(), &())?;
//! assert_eq!(tree.len(), 1);
//! assert_eq!(tree[0].children.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature     | Enables                                              |
//! |-------------|------------------------------------------------------|
//! | `rusqlite`  | SQLite execution, PRAGMA introspection, endpoints    |
//! | `serde`     | `Deserialize` configuration, `Serialize` output      |
//! | `tracing`   | Debug events for setup, options and statements       |
//! | `profiling` | `puffin` scopes around rendering and assembly        |

#![cfg_attr(docsrs, feature(doc_cfg))]

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for canopy operations
pub use canopy_core::error::Result;

/// Error types
pub mod error {
    pub use canopy_core::error::CanopyError;
}

/// Dialect-agnostic building blocks.
///
/// - **SQL**: `SQL`, `SQLChunk`, `Token`, `expr`
/// - **Query surface**: `Query`, `SelectQuery`, `TableRef`, `SortTerm`, `Join`
/// - **Composition**: `Phase`, `PhaseSet`, `QueryOption`, `Composer`, `SetupConfig`
/// - **Retrieval**: `ColumnMapping`, `HierarchyRetriever`, `build_tree`
pub mod core {
    pub use canopy_core::*;
}

// =============================================================================
// SQLite module
// =============================================================================

/// SQLite values, execution and read endpoints.
#[cfg(feature = "sqlite")]
#[cfg_attr(docsrs, doc(cfg(feature = "sqlite")))]
pub mod sqlite {
    pub use canopy_sqlite::*;
}

/// Everything needed to define and serve read endpoints.
pub mod prelude {
    pub use canopy_core::expr;
    pub use canopy_core::{
        AuditJoin, CanopyError, ColumnMapping, Composer, CriteriaApplier, Direction, DynCriteria,
        EntitySchema, FieldDescriptor, HierarchyConfig, HierarchyRetriever, MatchAll,
        PermissionScopeProvider, Phase, PhaseSet, Query, QueryOption, SQL, SchemaIntrospector,
        SelectQuery, Selection, SetupConfig, SortTerm, TableRef, ToSQL, TreeNode, build_tree,
    };

    #[cfg(feature = "sqlite")]
    pub use canopy_sqlite::{OptionItem, Record, SQLiteValue, SqliteOption, SqliteQuery};

    #[cfg(feature = "rusqlite")]
    pub use canopy_sqlite::{Db, ReadEndpoint};
}
