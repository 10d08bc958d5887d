//! The dialects a fragment can render for.

use core::fmt::Write;

/// Fixed per parameter type through [`SQLParam::DIALECT`](crate::SQLParam).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    SQLite,
    PostgreSQL,
    MySQL,
}

impl Dialect {
    /// `?` for SQLite and MySQL, `$n` for PostgreSQL. `index` starts at 1.
    pub fn write_placeholder(self, index: usize, buf: &mut String) {
        match self {
            Dialect::PostgreSQL => {
                let _ = write!(buf, "${index}");
            }
            Dialect::SQLite | Dialect::MySQL => buf.push('?'),
        }
    }

    /// Whether a LIMIT on the compound select of a recursive CTE stops the
    /// recursion. Only SQLite honours it.
    pub const fn limits_recursive_union(self) -> bool {
        matches!(self, Dialect::SQLite)
    }
}
