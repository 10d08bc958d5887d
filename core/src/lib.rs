//! Dialect-agnostic core of canopy.
//!
//! SQL fragments, the query surface options are written against, the
//! composition engine, column mappings, hierarchical retrieval and tree
//! assembly. Dialect crates supply the parameter type and execution.

#[macro_use]
pub mod tracing;
#[macro_use]
pub mod profiling;

pub mod compose;
pub mod criteria;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod hierarchy;
pub mod mapping;
pub mod option;
pub mod query;
pub mod schema;
pub mod sql;
pub mod traits;
pub mod tree;

// Re-export key types and traits
pub use compose::{AuditJoin, Composer, Selection, SetupConfig};
pub use criteria::{CriteriaApplier, MatchAll, PermissionScopeProvider};
pub use dialect::Dialect;
pub use error::{CanopyError, Result};
pub use hierarchy::{DEFAULT_ROW_CAP, Direction, HierarchyConfig, HierarchyRetriever, normalize};
pub use mapping::{ColumnMapping, MappingField, SystemDefaults};
pub use option::{DynCriteria, Phase, PhaseSet, QueryOption};
pub use query::{Join, JoinType, OrderBy, Query, SelectItem, SelectQuery, SortTerm, TableRef};
pub use schema::{Catalog, EntitySchema, FieldDescriptor, SchemaIntrospector};
pub use sql::{SQL, SQLChunk, Token};
pub use traits::{SQLParam, ToSQL};
pub use tree::{TreeNode, assemble, build_tree, flatten};
