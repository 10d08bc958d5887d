use std::borrow::Cow;

use paste::paste;

use super::{Join, Query, SortTerm, TableRef};
use crate::expr;
use crate::sql::{SQL, SQLChunk, Token};
use crate::traits::{SQLParam, ToSQL};

/// One entry of a SELECT list.
///
/// `output` is the column name the entry produces in the result set; `None`
/// marks a wildcard whose output columns are not known up front.
#[derive(Debug, Clone)]
pub struct SelectItem<V: SQLParam + 'static> {
    pub expr: SQL<'static, V>,
    pub output: Option<Cow<'static, str>>,
}

impl<V: SQLParam + 'static> SelectItem<V> {
    /// `expr AS "alias"`
    pub fn aliased(expr: SQL<'static, V>, alias: impl Into<Cow<'static, str>>) -> Self {
        let alias = alias.into();
        Self {
            expr: expr.alias(alias.clone()),
            output: Some(alias),
        }
    }

    /// `"alias".*`
    pub fn wildcard(table: &TableRef) -> Self {
        Self {
            expr: table.star(),
            output: None,
        }
    }

    /// Aliases of the relations whose columns the entry reads
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.expr.chunks.iter().filter_map(|chunk| match chunk {
            SQLChunk::Qualified { table, .. } => Some(table.as_ref()),
            _ => None,
        })
    }
}

/// SELECT statement over a single base table.
///
/// Options mutate it through [`Query`]; the hierarchy retriever also reads
/// and rewrites its selection and ordering directly.
#[derive(Debug, Clone)]
pub struct SelectQuery<V: SQLParam + 'static> {
    table: TableRef,
    distinct: bool,
    selection: Vec<SelectItem<V>>,
    joins: Vec<SQL<'static, V>>,
    joined: Vec<TableRef>,
    filters: Vec<SQL<'static, V>>,
    order: Vec<SortTerm>,
    limit: Option<usize>,
    offset: Option<usize>,
}

macro_rules! join_impl {
    ($($type:ident),*) => {
        paste! {
            $(
                #[doc = concat!("Adds a ", stringify!($type), " JOIN")]
                pub fn [<$type _join>](
                    &mut self,
                    table: TableRef,
                    on: SQL<'static, V>,
                ) -> &mut Self {
                    self.join(Join::new().$type(), table, on)
                }
            )*
        }
    };
}

impl<V: SQLParam + 'static> SelectQuery<V> {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            distinct: false,
            selection: Vec::new(),
            joins: Vec::new(),
            joined: Vec::new(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Shorthand for `SelectQuery::new(TableRef::new(name))`
    pub fn from_table(name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(TableRef::new(name))
    }

    join_impl!(inner, left);

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset = Some(n);
        self
    }

    pub fn selection(&self) -> &[SelectItem<V>] {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Vec<SelectItem<V>>) {
        self.selection = selection;
    }

    /// Result-set column names, or `None` when a wildcard is selected
    /// (an empty selection renders as a wildcard).
    pub fn output_names(&self) -> Option<Vec<&str>> {
        if self.selection.is_empty() {
            return None;
        }
        self.selection
            .iter()
            .map(|item| item.output.as_deref())
            .collect()
    }

    pub fn order_terms(&self) -> &[SortTerm] {
        &self.order
    }

    /// Whether the result-set column `output` is the base-table `column`
    /// itself, as opposed to another column or expression under that name.
    pub fn projects(&self, output: &str, column: &str) -> bool {
        let expected = SelectItem::<V>::aliased(
            self.table.column(column.to_string()),
            output.to_string(),
        )
        .expr
        .sql();
        self.selection
            .iter()
            .any(|item| item.output.as_deref() == Some(output) && item.expr.sql() == expected)
    }

    /// Aliases of the base table and of every joined table
    pub fn relations(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.table.alias()).chain(self.joined.iter().map(TableRef::alias))
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn filters(&self) -> &[SQL<'static, V>] {
        &self.filters
    }

    pub fn joins(&self) -> &[SQL<'static, V>] {
        &self.joins
    }

    /// Renders the statement without its ORDER BY, LIMIT and OFFSET.
    pub fn render_body(&self) -> SQL<'static, V> {
        let mut sql = SQL::token(Token::SELECT);
        if self.distinct {
            sql.push_mut(Token::DISTINCT);
        }
        if self.selection.is_empty() {
            sql.append_mut(self.table.star());
        } else {
            sql.append_mut(SQL::join(
                self.selection.iter().map(|item| item.expr.clone()),
                Token::COMMA,
            ));
        }
        sql.push_mut(Token::FROM);
        sql.append_mut(self.table.to_sql());
        for join in &self.joins {
            sql.append_mut(join.clone());
        }
        let predicate = expr::and(self.filters.iter().cloned());
        if !predicate.is_empty() {
            sql.push_mut(Token::WHERE);
            sql.append_mut(predicate);
        }
        sql
    }

    /// Renders the ORDER BY clause, empty when there are no terms.
    pub fn render_order(&self) -> SQL<'static, V> {
        if self.order.is_empty() {
            return SQL::empty();
        }
        SQL::token(Token::ORDER_BY).append(SQL::join(
            self.order.iter().map(|term| term.render::<V>(&self.table)),
            Token::COMMA,
        ))
    }

    fn render_pagination(&self) -> SQL<'static, V> {
        let mut sql = SQL::empty();
        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                sql.push_mut(Token::LIMIT);
                sql.push_mut(SQLChunk::Number(limit));
                if let Some(offset) = offset {
                    sql.push_mut(Token::OFFSET);
                    sql.push_mut(SQLChunk::Number(offset));
                }
            }
            (None, Some(offset)) => {
                sql.push_mut(Token::LIMIT);
                sql.push_mut(SQLChunk::Raw(Cow::Borrowed("-1")));
                sql.push_mut(Token::OFFSET);
                sql.push_mut(SQLChunk::Number(offset));
            }
            (None, None) => {}
        }
        sql
    }
}

impl<V: SQLParam + 'static> Query for SelectQuery<V> {
    type Value = V;

    fn table(&self) -> &TableRef {
        &self.table
    }

    fn r#where(&mut self, predicate: SQL<'static, V>) -> &mut Self {
        if !predicate.is_empty() {
            self.filters.push(predicate);
        }
        self
    }

    fn select(&mut self, column: &str) -> &mut Self {
        let column = column.to_string();
        let expr = self.table.column(column.clone());
        self.selection.push(SelectItem::aliased(expr, column));
        self
    }

    fn select_all(&mut self) -> &mut Self {
        let item = SelectItem::wildcard(&self.table);
        self.selection.push(item);
        self
    }

    fn select_as(&mut self, expr: SQL<'static, V>, alias: &str) -> &mut Self {
        self.selection.push(SelectItem::aliased(expr, alias.to_string()));
        self
    }

    fn order_by_term(&mut self, term: SortTerm) -> &mut Self {
        self.order.push(term);
        self
    }

    fn clear_order(&mut self) -> &mut Self {
        self.order.clear();
        self
    }

    fn join(&mut self, join: Join, table: TableRef, on: SQL<'static, V>) -> &mut Self {
        let mut clause = join.to_sql().append(table.to_sql());
        if join.has_condition() && !on.is_empty() {
            clause.push_mut(Token::ON);
            clause.append_mut(on);
        }
        self.joins.push(clause);
        self.joined.push(table);
        self
    }

    fn limit(&mut self, n: usize) -> &mut Self {
        self.limit = Some(n);
        self
    }

    fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }
}

impl<V: SQLParam + 'static> ToSQL<'static, V> for SelectQuery<V> {
    fn to_sql(&self) -> SQL<'static, V> {
        self.render_body()
            .append(self.render_order())
            .append(self.render_pagination())
    }
}
