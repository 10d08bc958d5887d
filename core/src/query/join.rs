use crate::sql::{SQL, Token};
use crate::traits::{SQLParam, ToSQL};

/// The joins options can add: audit lookups are `Left`, the recursive step of
/// a hierarchy is `Inner`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Cross,
}

/// A JOIN keyword, built as `Join::new().left()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Join {
    pub kind: JoinType,
}

impl Join {
    pub const fn new() -> Self {
        Self {
            kind: JoinType::Inner,
        }
    }

    pub const fn inner(self) -> Self {
        Self {
            kind: JoinType::Inner,
        }
    }

    pub const fn left(self) -> Self {
        Self {
            kind: JoinType::Left,
        }
    }

    pub const fn cross(self) -> Self {
        Self {
            kind: JoinType::Cross,
        }
    }

    /// `CROSS JOIN` takes no ON clause
    pub const fn has_condition(&self) -> bool {
        !matches!(self.kind, JoinType::Cross)
    }
}

impl<'a, V: SQLParam + 'a> ToSQL<'a, V> for Join {
    fn to_sql(&self) -> SQL<'a, V> {
        SQL::token(match self.kind {
            JoinType::Inner => Token::INNER_JOIN,
            JoinType::Left => Token::LEFT_JOIN,
            JoinType::Cross => Token::CROSS_JOIN,
        })
    }
}
