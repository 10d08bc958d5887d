//! The query capability surface options are written against.
//!
//! [`Query`] is the narrow set of operations a query option may perform on a
//! query under construction: filter, select, order, join, limit, distinct.
//! [`SelectQuery`] is the builder every dialect crate renders and executes.
//! Options never see the underlying connection; scanning rows is the dialect
//! crate's job.

mod join;
mod select;

use std::borrow::Cow;

pub use join::{Join, JoinType};
pub use select::{SelectItem, SelectQuery};

use crate::sql::{SQL, SQLChunk, Token};
use crate::traits::{SQLParam, ToSQL};

/// A table in a FROM or JOIN clause, with the alias its columns are qualified by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableRef {
    name: Cow<'static, str>,
    alias: Cow<'static, str>,
}

impl TableRef {
    /// References a table by its own name
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
        }
    }

    /// References a table under an alias
    pub fn aliased(
        name: impl Into<Cow<'static, str>>,
        alias: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// A column of this table, qualified by the alias: "alias"."column"
    pub fn column<V: SQLParam>(&self, column: impl Into<Cow<'static, str>>) -> SQL<'static, V> {
        SQL::qualified(self.alias.clone(), column)
    }

    /// Every column of this table: "alias".*
    pub fn star<V: SQLParam>(&self) -> SQL<'static, V> {
        SQL::ident(self.alias.clone())
            .push(Token::DOT)
            .push(Token::STAR)
    }
}

impl<V: SQLParam + 'static> ToSQL<'static, V> for TableRef {
    fn to_sql(&self) -> SQL<'static, V> {
        let sql = SQL::ident(self.name.clone());
        if self.name == self.alias {
            sql
        } else {
            sql.alias(self.alias.clone())
        }
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OrderBy {
    Asc,
    Desc,
}

impl<'a, V: SQLParam + 'a> ToSQL<'a, V> for OrderBy {
    fn to_sql(&self) -> SQL<'a, V> {
        match self {
            OrderBy::Asc => SQL::token(Token::ASC),
            OrderBy::Desc => SQL::token(Token::DESC),
        }
    }
}

/// One ORDER BY term over a column of the base table.
///
/// `output` is the name the column carries in the result set when it differs
/// from the column name (a `select_as` alias); ordering applied on top of the
/// query's result (e.g. over a recursive CTE) uses it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortTerm {
    pub column: Cow<'static, str>,
    pub direction: OrderBy,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub output: Option<Cow<'static, str>>,
}

impl SortTerm {
    pub fn asc(column: impl Into<Cow<'static, str>>) -> Self {
        Self {
            column: column.into(),
            direction: OrderBy::Asc,
            output: None,
        }
    }

    pub fn desc(column: impl Into<Cow<'static, str>>) -> Self {
        Self {
            column: column.into(),
            direction: OrderBy::Desc,
            output: None,
        }
    }

    /// Names the result-set column this term sorts on
    pub fn output(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.output = Some(name.into());
        self
    }

    /// The name of the sorted column in the query's result set
    pub fn output_name(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.column)
    }

    /// Renders `"alias"."column" ASC|DESC` against the given table
    pub fn render<V: SQLParam + 'static>(&self, table: &TableRef) -> SQL<'static, V> {
        table
            .column::<V>(self.column.clone())
            .append(self.direction.to_sql())
    }

    /// Renders the term against a result set named `relation`
    pub fn render_output<V: SQLParam + 'static>(&self, relation: &str) -> SQL<'static, V> {
        SQL::from(SQLChunk::Qualified {
            table: Cow::Owned(relation.to_string()),
            column: Cow::Owned(self.output_name().to_string()),
        })
        .append(self.direction.to_sql())
    }
}

/// Operations a query option may perform on a query under construction.
///
/// All column names are names on the query's base table; the implementation
/// qualifies them with the base table's alias.
pub trait Query {
    type Value: SQLParam + 'static;

    /// The base table (FROM clause)
    fn table(&self) -> &TableRef;

    /// Adds a predicate; predicates are combined with AND
    fn r#where(&mut self, predicate: SQL<'static, Self::Value>) -> &mut Self;

    /// Selects a base-table column under its own name
    fn select(&mut self, column: &str) -> &mut Self;

    /// Selects every column of the base table
    fn select_all(&mut self) -> &mut Self;

    /// Selects an arbitrary expression under an alias
    fn select_as(&mut self, expr: SQL<'static, Self::Value>, alias: &str) -> &mut Self;

    /// Appends an ORDER BY term
    fn order_by_term(&mut self, term: SortTerm) -> &mut Self;

    /// Drops every ORDER BY term added so far
    fn clear_order(&mut self) -> &mut Self;

    /// Adds a JOIN clause
    fn join(
        &mut self,
        join: Join,
        table: TableRef,
        on: SQL<'static, Self::Value>,
    ) -> &mut Self;

    /// Caps the number of rows
    fn limit(&mut self, n: usize) -> &mut Self;

    /// Removes duplicate rows
    fn distinct(&mut self) -> &mut Self;

    /// Ascending ORDER BY on a base-table column
    fn order_by(&mut self, column: &str) -> &mut Self {
        self.order_by_term(SortTerm::asc(column.to_string()))
    }

    /// Descending ORDER BY on a base-table column
    fn order_by_desc(&mut self, column: &str) -> &mut Self {
        self.order_by_term(SortTerm::desc(column.to_string()))
    }

    /// A base-table column qualified by the base table's alias
    fn column(&self, name: &str) -> SQL<'static, Self::Value> {
        self.table().column(name.to_string())
    }
}
