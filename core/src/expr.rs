//! Predicate helpers for WHERE and JOIN ... ON clauses.
//!
//! Every helper takes anything that renders to SQL, so columns
//! (`TableRef::column`), parameters (`SQL::value`) and nested predicates mix
//! freely.

use crate::sql::{SQL, Token};
use crate::traits::{SQLParam, ToSQL};

/// Format a SQL comparison with the given operator
fn comparison<'a, V, L, R>(left: L, operator: Token, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    left.into_sql().push(operator).append(right.into_sql())
}

/// Create an equality condition (=)
///
/// ```
/// # use canopy_core::{SQL, SQLParam, Dialect, expr::eq};
/// # #[derive(Debug, Clone)] struct V(i64);
/// # impl SQLParam for V { const DIALECT: Dialect = Dialect::SQLite; }
/// let condition = eq(SQL::<V>::qualified("t", "id"), SQL::value(V(1)));
/// assert_eq!(condition.sql(), r#""t"."id" = ?"#);
/// ```
pub fn eq<'a, V, L, R>(left: L, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    comparison(left, Token::EQ, right)
}

/// Create a not-equal condition (<>)
pub fn ne<'a, V, L, R>(left: L, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    comparison(left, Token::NE, right)
}

/// Create a greater-than condition (>)
pub fn gt<'a, V, L, R>(left: L, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    comparison(left, Token::GT, right)
}

/// Create a greater-than-or-equal condition (>=)
pub fn gte<'a, V, L, R>(left: L, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    comparison(left, Token::GE, right)
}

/// Create a less-than condition (<)
pub fn lt<'a, V, L, R>(left: L, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    comparison(left, Token::LT, right)
}

/// Create a less-than-or-equal condition (<=)
pub fn lte<'a, V, L, R>(left: L, right: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    comparison(left, Token::LE, right)
}

/// Create a LIKE condition
pub fn like<'a, V, L, R>(left: L, pattern: R) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    R: ToSQL<'a, V>,
{
    left.into_sql().push(Token::LIKE).append(pattern.into_sql())
}

/// Create an IS NULL condition
pub fn is_null<'a, V, L>(left: L) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
{
    left.into_sql().push(Token::IS).push(Token::NULL)
}

/// Create an IS NOT NULL condition
pub fn is_not_null<'a, V, L>(left: L) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
{
    left.into_sql()
        .push(Token::IS)
        .push(Token::NOT)
        .push(Token::NULL)
}

/// Create an IN (...) condition. An empty list matches nothing.
pub fn in_list<'a, V, L, I>(left: L, values: I) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    L: ToSQL<'a, V>,
    I: IntoIterator<Item = V>,
{
    let list: SQL<'a, V> = SQL::join(values.into_iter().map(SQL::value), Token::COMMA);
    if list.is_empty() {
        return never();
    }
    left.into_sql().push(Token::IN).append(list.parens())
}

/// Combine conditions with AND. Empty fragments are skipped; no conditions
/// yields an empty fragment (which callers treat as "no filter").
pub fn and<'a, V, I>(conditions: I) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    I: IntoIterator,
    I::Item: ToSQL<'a, V>,
{
    combine(conditions, Token::AND).unwrap_or_default()
}

/// Combine conditions with OR. No conditions matches nothing.
pub fn or<'a, V, I>(conditions: I) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    I: IntoIterator,
    I::Item: ToSQL<'a, V>,
{
    combine(conditions, Token::OR).unwrap_or_else(never)
}

/// Negate a condition
pub fn not<'a, V, C>(condition: C) -> SQL<'a, V>
where
    V: SQLParam + 'a,
    C: ToSQL<'a, V>,
{
    SQL::token(Token::NOT).append(condition.into_sql().parens())
}

fn combine<'a, V, I>(conditions: I, separator: Token) -> Option<SQL<'a, V>>
where
    V: SQLParam + 'a,
    I: IntoIterator,
    I::Item: ToSQL<'a, V>,
{
    let parts: Vec<SQL<'a, V>> = conditions
        .into_iter()
        .map(ToSQL::into_sql)
        .filter(|sql| !sql.is_empty())
        .collect();
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(SQL::join(parts.into_iter().map(SQL::parens), separator)),
    }
}

fn never<'a, V: SQLParam + 'a>() -> SQL<'a, V> {
    SQL::number(1).push(Token::EQ).append(SQL::number(0))
}
