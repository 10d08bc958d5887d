use crate::dialect::Dialect;
use crate::sql::SQL;

/// A value that can be bound to a statement parameter.
///
/// Each dialect crate has exactly one; its dialect picks the placeholder
/// syntax and the recursive-CTE rules.
pub trait SQLParam: Clone + core::fmt::Debug {
    const DIALECT: Dialect;
}

/// Anything that renders to a fragment: columns, values, predicates, whole
/// queries.
///
/// Borrowed values may live in the fragment for `'a`.
pub trait ToSQL<'a, V: SQLParam> {
    fn to_sql(&self) -> SQL<'a, V>;

    /// Like [`to_sql`](ToSQL::to_sql), without the clone for types that
    /// already hold a fragment.
    fn into_sql(self) -> SQL<'a, V>
    where
        Self: Sized,
    {
        self.to_sql()
    }
}

impl<'a, V: SQLParam + 'a, T: ToSQL<'a, V>> ToSQL<'a, V> for &T {
    fn to_sql(&self) -> SQL<'a, V> {
        (**self).to_sql()
    }
}
