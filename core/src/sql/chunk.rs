use core::fmt::{self, Write};
use std::borrow::Cow;

use crate::sql::tokens::Token;
use crate::traits::SQLParam;

/// One piece of a statement. Chunks carry no whitespace; [`SQL`](super::SQL)
/// decides spacing from each pair of neighbours when rendering.
#[derive(Clone)]
pub enum SQLChunk<'a, V: SQLParam> {
    Token(Token),
    /// `"name"`
    Ident(Cow<'a, str>),
    /// `"table"."column"`
    Qualified {
        table: Cow<'a, str>,
        column: Cow<'a, str>,
    },
    /// Written as-is
    Raw(Cow<'a, str>),
    /// An inline integer, for LIMIT and OFFSET
    Number(usize),
    /// A bound value; the placeholder depends on the dialect
    Param(Cow<'a, V>),
}

impl<'a, V: SQLParam> SQLChunk<'a, V> {
    /// Writes everything but parameters, whose placeholders are numbered by
    /// the enclosing fragment.
    pub(crate) fn write(&self, buf: &mut String) {
        match self {
            SQLChunk::Token(token) => buf.push_str(token.as_str()),
            SQLChunk::Ident(name) => write_quoted(buf, name),
            SQLChunk::Qualified { table, column } => {
                write_quoted(buf, table);
                buf.push('.');
                write_quoted(buf, column);
            }
            SQLChunk::Raw(text) => buf.push_str(text),
            SQLChunk::Number(n) => {
                let _ = write!(buf, "{n}");
            }
            SQLChunk::Param(_) => buf.push('?'),
        }
    }

    /// Whether the chunk is separated from another word-like chunk by a space
    pub(crate) const fn is_word_like(&self) -> bool {
        match self {
            SQLChunk::Token(t) => !matches!(
                t,
                Token::LPAREN | Token::RPAREN | Token::COMMA | Token::DOT
            ) && !t.is_operator(),
            _ => true,
        }
    }

    /// Whether a space goes between `self` and `next`
    pub(crate) fn spaced_from(&self, next: &Self) -> bool {
        if matches!(self, SQLChunk::Raw(text) if text.ends_with(' '))
            || matches!(next, SQLChunk::Raw(text) if text.starts_with(' '))
        {
            return false;
        }

        match (self, next) {
            (_, SQLChunk::Token(Token::RPAREN | Token::COMMA | Token::DOT)) => false,
            (SQLChunk::Token(Token::LPAREN | Token::DOT), _) => false,
            (SQLChunk::Token(Token::COMMA), _) => true,
            (SQLChunk::Token(Token::RPAREN), next) => next.is_word_like(),
            (current, SQLChunk::Token(Token::LPAREN)) => current.is_word_like(),
            (SQLChunk::Token(t), _) | (_, SQLChunk::Token(t)) if t.is_operator() => true,
            _ => self.is_word_like() && next.is_word_like(),
        }
    }
}

/// `"name"`, with embedded quotes doubled
fn write_quoted(buf: &mut String, name: &str) {
    buf.push('"');
    if name.contains('"') {
        buf.push_str(&name.replace('"', "\"\""));
    } else {
        buf.push_str(name);
    }
    buf.push('"');
}

impl<'a, V: SQLParam> fmt::Debug for SQLChunk<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SQLChunk::Token(token) => f.debug_tuple("Token").field(token).finish(),
            SQLChunk::Ident(name) => f.debug_tuple("Ident").field(name).finish(),
            SQLChunk::Qualified { table, column } => {
                write!(f, "Qualified({table}.{column})")
            }
            SQLChunk::Raw(text) => f.debug_tuple("Raw").field(text).finish(),
            SQLChunk::Number(n) => f.debug_tuple("Number").field(n).finish(),
            SQLChunk::Param(value) => f.debug_tuple("Param").field(value).finish(),
        }
    }
}

impl<'a, V: SQLParam> From<Token> for SQLChunk<'a, V> {
    fn from(value: Token) -> Self {
        Self::Token(value)
    }
}
