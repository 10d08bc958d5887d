mod chunk;
mod tokens;

use core::fmt;
use std::borrow::Cow;

use smallvec::SmallVec;

pub use chunk::SQLChunk;
pub use tokens::Token;

use crate::traits::{SQLParam, ToSQL};

/// A statement or a piece of one: a flat list of chunks.
///
/// Fragments are built by appending and render to text plus the values to
/// bind, in placeholder order. Most fragments fit the inline storage.
#[derive(Debug, Clone)]
pub struct SQL<'a, V: SQLParam> {
    pub chunks: SmallVec<[SQLChunk<'a, V>; 8]>,
}

impl<'a, V: SQLParam> SQL<'a, V> {
    pub const fn empty() -> Self {
        Self {
            chunks: SmallVec::new_const(),
        }
    }

    fn one(chunk: SQLChunk<'a, V>) -> Self {
        Self {
            chunks: smallvec::smallvec![chunk],
        }
    }

    pub fn token(t: Token) -> Self {
        Self::one(SQLChunk::Token(t))
    }

    /// A quoted identifier
    pub fn ident(name: impl Into<Cow<'a, str>>) -> Self {
        Self::one(SQLChunk::Ident(name.into()))
    }

    /// `"table"."column"`
    pub fn qualified(table: impl Into<Cow<'a, str>>, column: impl Into<Cow<'a, str>>) -> Self {
        Self::one(SQLChunk::Qualified {
            table: table.into(),
            column: column.into(),
        })
    }

    /// Unquoted text, written as-is
    pub fn raw(text: impl Into<Cow<'a, str>>) -> Self {
        Self::one(SQLChunk::Raw(text.into()))
    }

    pub fn number(value: usize) -> Self {
        Self::one(SQLChunk::Number(value))
    }

    /// A bound value, owned or borrowed
    pub fn param(value: impl Into<Cow<'a, V>>) -> Self {
        Self::one(SQLChunk::Param(value.into()))
    }

    /// A bound owned value
    pub fn value(value: V) -> Self {
        Self::one(SQLChunk::Param(Cow::Owned(value)))
    }

    pub fn append(mut self, other: impl Into<SQL<'a, V>>) -> Self {
        self.append_mut(other);
        self
    }

    pub fn append_mut(&mut self, other: impl Into<SQL<'a, V>>) {
        let other = other.into();
        if self.chunks.is_empty() {
            self.chunks = other.chunks;
        } else {
            self.chunks.extend(other.chunks);
        }
    }

    pub fn push(mut self, chunk: impl Into<SQLChunk<'a, V>>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    pub fn push_mut(&mut self, chunk: impl Into<SQLChunk<'a, V>>) {
        self.chunks.push(chunk.into());
    }

    /// `a <sep> b <sep> c`; nothing to join gives an empty fragment
    pub fn join<T>(sqls: T, separator: Token) -> SQL<'a, V>
    where
        T: IntoIterator,
        T::Item: ToSQL<'a, V>,
    {
        let mut result = SQL::empty();
        for (i, item) in sqls.into_iter().enumerate() {
            if i > 0 {
                result.chunks.push(SQLChunk::Token(separator));
            }
            result.chunks.extend(item.into_sql().chunks);
        }
        result
    }

    /// `(self)`
    pub fn parens(self) -> Self {
        SQL::token(Token::LPAREN).append(self).push(Token::RPAREN)
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// `self AS "name"`
    pub fn alias(self, name: impl Into<Cow<'a, str>>) -> SQL<'a, V> {
        self.push(Token::AS).push(SQLChunk::Ident(name.into()))
    }

    /// Points every column qualified by `from` at `to` instead
    pub fn requalify(self, from: &str, to: &str) -> Self {
        let chunks = self
            .chunks
            .into_iter()
            .map(|chunk| match chunk {
                SQLChunk::Qualified { table, column } if table == from => SQLChunk::Qualified {
                    table: Cow::Owned(to.to_string()),
                    column,
                },
                other => other,
            })
            .collect();
        SQL { chunks }
    }

    /// The statement text with the dialect's placeholders
    pub fn sql(&self) -> String {
        crate::canopy_profile_scope!("sql_render", "sql");
        let mut buf = String::with_capacity(self.capacity_hint());
        self.render(&mut buf, |_| {});
        buf
    }

    /// The statement text together with the values to bind, in order
    pub fn build(&self) -> (String, SmallVec<[&V; 8]>) {
        crate::canopy_profile_scope!("sql_render", "build");
        let mut buf = String::with_capacity(self.capacity_hint());
        let mut params = SmallVec::new();
        self.render(&mut buf, |value| params.push(value));
        (buf, params)
    }

    pub fn params(&self) -> impl Iterator<Item = &V> {
        self.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Param(value) => Some(value.as_ref()),
            _ => None,
        })
    }

    fn capacity_hint(&self) -> usize {
        self.chunks.len().saturating_mul(8).max(128)
    }

    fn render<'s>(&'s self, buf: &mut String, mut bind: impl FnMut(&'s V)) {
        let mut index = 0;
        for (i, chunk) in self.chunks.iter().enumerate() {
            match chunk {
                SQLChunk::Param(value) => {
                    index += 1;
                    V::DIALECT.write_placeholder(index, buf);
                    bind(value.as_ref());
                }
                _ => chunk.write(buf),
            }
            if self
                .chunks
                .get(i + 1)
                .is_some_and(|next| chunk.spaced_from(next))
            {
                buf.push(' ');
            }
        }
    }
}

impl<'a, V: SQLParam> Default for SQL<'a, V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, V: SQLParam + 'a> From<&'a str> for SQL<'a, V> {
    fn from(s: &'a str) -> Self {
        SQL::raw(s)
    }
}

impl<'a, V: SQLParam> From<Token> for SQL<'a, V> {
    fn from(value: Token) -> Self {
        SQL::token(value)
    }
}

impl<'a, V: SQLParam> From<SQLChunk<'a, V>> for SQL<'a, V> {
    fn from(value: SQLChunk<'a, V>) -> Self {
        SQL::one(value)
    }
}

/// The text followed by the bound values, for logs and assertions.
impl<'a, V: SQLParam + fmt::Display> fmt::Display for SQL<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())?;
        let mut params = self.params();
        if let Some(first) = params.next() {
            write!(f, " -- [{first}")?;
            for param in params {
                write!(f, ", {param}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl<'a, V: SQLParam + 'a> ToSQL<'a, V> for SQL<'a, V> {
    fn to_sql(&self) -> SQL<'a, V> {
        self.clone()
    }

    fn into_sql(self) -> SQL<'a, V> {
        self
    }
}
