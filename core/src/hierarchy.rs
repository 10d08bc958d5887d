//! Hierarchical retrieval through a recursive CTE.
//!
//! The retriever builds the statement; the dialect crate executes it. The
//! statement has the shape
//!
//! ```text
//! WITH RECURSIVE "closure" AS (
//!     SELECT * FROM (<seed phase> ORDER BY .. LIMIT cap) AS "seed"
//!     UNION
//!     <expansion phase joined to "closure"> [LIMIT cap]
//! )
//! SELECT DISTINCT "closure".* FROM "closure" [ORDER BY ..] LIMIT cap
//! ```
//!
//! The parent/child relation is assumed acyclic. `UNION` stops rows that are
//! already in the closure from being added again, and the row cap bounds the
//! cost when the assumption does not hold.

use crate::compose::{Composer, Selection};
use crate::error::{CanopyError, Result};
use crate::expr;
use crate::mapping::MappingField;
use crate::option::Phase;
use crate::query::{Join, Query, SelectQuery, TableRef};
use crate::sql::{SQL, SQLChunk, Token};
use crate::traits::{SQLParam, ToSQL};

/// Default safety cap on the rows a hierarchical read can return.
pub const DEFAULT_ROW_CAP: usize = 10_000;

/// Prefix of the aliases that carry seed sort keys through the closure.
pub const SORT_KEY_PREFIX: &str = "__sort_";

/// Which way the expansion phase walks from the rows already found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Children of found rows: `t.parent = closure.id`
    #[default]
    Descendants,
    /// Parents of found rows: `t.id = closure.parent`
    Ancestors,
}

/// Configuration of a hierarchical read.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HierarchyConfig {
    pub id_column: String,
    pub parent_column: String,
    pub direction: Direction,
    pub row_cap: usize,
    /// Name of the recursive CTE
    pub closure: String,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            id_column: "id".into(),
            parent_column: "parent_id".into(),
            direction: Direction::Descendants,
            row_cap: DEFAULT_ROW_CAP,
            closure: "closure".into(),
        }
    }
}

impl HierarchyConfig {
    pub fn new(id_column: impl Into<String>, parent_column: impl Into<String>) -> Self {
        Self {
            id_column: id_column.into(),
            parent_column: parent_column.into(),
            ..Self::default()
        }
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn row_cap(mut self, cap: usize) -> Self {
        self.row_cap = cap;
        self
    }

    pub fn closure(mut self, name: impl Into<String>) -> Self {
        self.closure = name.into();
        self
    }
}

/// Builds two-phase recursive reads over a composer's table.
#[derive(Clone, Debug, Default)]
pub struct HierarchyRetriever {
    config: HierarchyConfig,
}

impl HierarchyRetriever {
    pub fn new(config: HierarchyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    /// The effective cap, never zero
    pub fn row_cap(&self) -> usize {
        self.config.row_cap.max(1)
    }

    /// Builds the recursive statement.
    ///
    /// The seed is configured with [`Phase::Seed`] and the expansion with
    /// [`Phase::Expansion`]; the expansion selects exactly the seed's
    /// columns. With [`Selection::Mapping`] the tree keys are the mapping's
    /// `id` and `parent_id` columns.
    pub fn build<V, C, X>(
        &self,
        composer: &Composer<SelectQuery<V>, C, X>,
        criteria: &C,
        context: &X,
        selection: Selection<'_>,
    ) -> Result<SQL<'static, V>>
    where
        V: SQLParam + 'static,
        C: 'static,
        X: 'static,
    {
        crate::canopy_profile_function!();
        let entity = composer.table().name().to_string();
        let cap = self.row_cap();

        // Physical key columns on the base table, and their names in the closure.
        let (base_id, base_parent, closure_id, closure_parent) = match selection {
            Selection::Entity => (
                self.config.id_column.clone(),
                self.config.parent_column.clone(),
                self.config.id_column.clone(),
                self.config.parent_column.clone(),
            ),
            Selection::Mapping(mapping) => {
                mapping.require_tree(&entity)?;
                let id = mapping.get(MappingField::Id).unwrap_or_default();
                let parent = mapping.get(MappingField::ParentId).unwrap_or_default();
                (
                    id.to_string(),
                    parent.to_string(),
                    MappingField::Id.as_str().to_string(),
                    MappingField::ParentId.as_str().to_string(),
                )
            }
        };

        let mut seed = composer.query();
        let extra = composer.prepare(&mut seed, selection, Phase::Seed.into());
        composer.configure_with(&mut seed, criteria, context, Phase::Seed, &extra)?;
        let seed_limit = seed.limit_value().map_or(cap, |limit| limit.min(cap));
        seed.limit(seed_limit);

        let outputs: Option<Vec<String>> = seed
            .output_names()
            .map(|names| names.into_iter().map(str::to_string).collect());
        if let Some(names) = &outputs {
            for (field, key) in [("id", &closure_id), ("parent_id", &closure_parent)] {
                if !names.iter().any(|name| name == key) {
                    return Err(CanopyError::MissingTreeColumn {
                        field,
                        entity: entity.clone(),
                    });
                }
            }
        }

        // A seed term whose output name is another column in the closure has
        // its key projected under a reserved alias instead.
        let mut outer_order = Vec::new();
        let mut hidden = 0;
        for term in seed.order_terms().to_vec() {
            if outputs.is_none() || seed.projects(term.output_name(), &term.column) {
                outer_order.push(term);
                continue;
            }
            let alias = format!("{SORT_KEY_PREFIX}{hidden}");
            hidden += 1;
            let expr = seed.column(&term.column);
            seed.select_as(expr, &alias);
            outer_order.push(term.output(alias));
        }

        let closure = TableRef::new(self.config.closure.clone());
        let mut expansion = composer.query();
        let on = match self.config.direction {
            Direction::Descendants => expr::eq(
                expansion.column(&base_parent),
                closure.column::<V>(closure_id.clone()),
            ),
            Direction::Ancestors => expr::eq(
                expansion.column(&base_id),
                closure.column::<V>(closure_parent.clone()),
            ),
        };
        expansion.join(Join::new().inner(), closure.clone(), on);
        composer.configure(&mut expansion, criteria, context, Phase::Expansion)?;

        let joined: Vec<&str> = expansion.relations().collect();
        for item in seed.selection() {
            if let Some(relation) = item.relations().find(|name| !joined.contains(name)) {
                return Err(CanopyError::UnjoinedRelation {
                    output: item.output.as_deref().unwrap_or("*").to_string(),
                    relation: relation.to_string(),
                    entity: entity.clone(),
                });
            }
        }
        expansion.set_selection(seed.selection().to_vec());

        let mut recursive = SQL::<V>::token(Token::SELECT)
            .push(Token::STAR)
            .push(Token::FROM)
            .append(seed.to_sql().parens().alias("seed"))
            .push(Token::UNION)
            .append(expansion.render_body());
        if V::DIALECT.limits_recursive_union() {
            recursive = recursive
                .push(Token::LIMIT)
                .push(SQLChunk::Number(cap));
        }

        // `UNION` already made the closure a set; with reserved sort keys the
        // visible columns are listed so the keys stay out of the result.
        let projection = match &outputs {
            Some(names) if hidden > 0 => SQL::join(
                names.iter().map(|name| closure.column::<V>(name.clone())),
                Token::COMMA,
            ),
            _ => SQL::token(Token::DISTINCT).append(closure.star::<V>()),
        };

        let mut sql = SQL::<V>::token(Token::WITH)
            .push(Token::RECURSIVE)
            .append(SQL::ident(self.config.closure.clone()))
            .push(Token::AS)
            .append(recursive.parens())
            .push(Token::SELECT)
            .append(projection)
            .push(Token::FROM)
            .append(SQL::ident(self.config.closure.clone()));
        if !outer_order.is_empty() {
            sql = sql.push(Token::ORDER_BY).append(SQL::join(
                outer_order
                    .iter()
                    .map(|term| term.render_output::<V>(closure.alias())),
                Token::COMMA,
            ));
        }
        Ok(sql.push(Token::LIMIT).push(SQLChunk::Number(cap)))
    }
}

/// An absent result is an empty one.
pub fn normalize<T>(rows: Option<Vec<T>>) -> Vec<T> {
    rows.unwrap_or_default()
}
