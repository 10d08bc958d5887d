//! Seams to the components that turn request data into predicates.
//!
//! The field-by-field translation of search criteria and the row-level access
//! rules live outside the composer; it only asks them for a predicate over the
//! query's base table.

use crate::error::Result;
use crate::query::TableRef;
use crate::sql::SQL;
use crate::traits::SQLParam;

/// Converts typed search criteria into a filter predicate.
///
/// `Ok(None)` means "no restriction".
pub trait CriteriaApplier<C, V: SQLParam>: Send + Sync {
    fn predicate(&self, criteria: &C, table: &TableRef) -> Result<Option<SQL<'static, V>>>;
}

impl<C, V, F> CriteriaApplier<C, V> for F
where
    V: SQLParam + 'static,
    F: Fn(&C, &TableRef) -> Result<Option<SQL<'static, V>>> + Send + Sync,
{
    fn predicate(&self, criteria: &C, table: &TableRef) -> Result<Option<SQL<'static, V>>> {
        self(criteria, table)
    }
}

/// Optional row-level access restriction derived from the request context.
pub trait PermissionScopeProvider<X, V: SQLParam>: Send + Sync {
    fn scope(&self, context: &X, table: &TableRef) -> Result<Option<SQL<'static, V>>>;
}

impl<X, V, F> PermissionScopeProvider<X, V> for F
where
    V: SQLParam + 'static,
    F: Fn(&X, &TableRef) -> Result<Option<SQL<'static, V>>> + Send + Sync,
{
    fn scope(&self, context: &X, table: &TableRef) -> Result<Option<SQL<'static, V>>> {
        self(context, table)
    }
}

/// Criteria applier that never filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchAll;

impl<C, V: SQLParam> CriteriaApplier<C, V> for MatchAll {
    fn predicate(&self, _criteria: &C, _table: &TableRef) -> Result<Option<SQL<'static, V>>> {
        Ok(None)
    }
}
