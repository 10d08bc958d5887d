//! Column mappings: logical output fields bound to physical columns.
//!
//! A mapping is resolved per request: the caller's requested mapping is merged
//! over the endpoint's configured default, then over [`SystemDefaults`] derived
//! from the schema, and the result is validated against the schema before any
//! SQL is built.

use core::fmt;

use crate::error::{CanopyError, Result};
use crate::option::{PhaseSet, QueryOption};
use crate::query::{Query, SortTerm};
use crate::schema::SchemaIntrospector;

/// A logical output field of a mapped projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MappingField {
    Label,
    Value,
    Description,
    Sort,
    Id,
    ParentId,
}

impl MappingField {
    pub const VARIANTS: [MappingField; 6] = [
        MappingField::Label,
        MappingField::Value,
        MappingField::Description,
        MappingField::Sort,
        MappingField::Id,
        MappingField::ParentId,
    ];

    /// The field's name, also the alias its column is selected under
    pub const fn as_str(self) -> &'static str {
        match self {
            MappingField::Label => "label",
            MappingField::Value => "value",
            MappingField::Description => "description",
            MappingField::Sort => "sort",
            MappingField::Id => "id",
            MappingField::ParentId => "parent_id",
        }
    }
}

impl fmt::Display for MappingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical column names for each logical field. Empty strings count as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColumnMapping {
    pub label: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
    pub sort: Option<String>,
    pub id: Option<String>,
    pub parent_id: Option<String>,
}

/// Fallbacks used when neither the request nor the endpoint names a column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemDefaults {
    /// The single primary-key column
    pub value: Option<String>,
    /// The name-like column
    pub label: Option<String>,
}

impl SystemDefaults {
    /// Derives defaults from the schema. A composite primary key yields no
    /// `value` default.
    pub fn from_schema(schema: &dyn SchemaIntrospector, entity: &str) -> Self {
        let keys = schema.primary_key_fields(entity);
        let value = match keys.as_slice() {
            [key] => Some(key.name.clone()),
            _ => None,
        };
        Self {
            value,
            label: schema.name_column(entity),
        }
    }
}

fn present(column: &Option<String>) -> Option<&str> {
    column.as_deref().filter(|c| !c.is_empty())
}

fn first_present(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .find_map(|c| present(c))
        .map(str::to_string)
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, column: impl Into<String>) -> Self {
        self.label = Some(column.into());
        self
    }

    pub fn value(mut self, column: impl Into<String>) -> Self {
        self.value = Some(column.into());
        self
    }

    pub fn description(mut self, column: impl Into<String>) -> Self {
        self.description = Some(column.into());
        self
    }

    pub fn sort(mut self, column: impl Into<String>) -> Self {
        self.sort = Some(column.into());
        self
    }

    pub fn id(mut self, column: impl Into<String>) -> Self {
        self.id = Some(column.into());
        self
    }

    pub fn parent_id(mut self, column: impl Into<String>) -> Self {
        self.parent_id = Some(column.into());
        self
    }

    /// The column mapped to `field`, if set and non-empty
    pub fn get(&self, field: MappingField) -> Option<&str> {
        present(match field {
            MappingField::Label => &self.label,
            MappingField::Value => &self.value,
            MappingField::Description => &self.description,
            MappingField::Sort => &self.sort,
            MappingField::Id => &self.id,
            MappingField::ParentId => &self.parent_id,
        })
    }

    /// Every set field with its column, in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (MappingField, &str)> {
        MappingField::VARIANTS
            .into_iter()
            .filter_map(|field| self.get(field).map(|column| (field, column)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Field-wise precedence: requested, then fallback, then system default.
    ///
    /// Only `label` and `value` have system defaults.
    pub fn merge(requested: &Self, fallback: &Self, defaults: &SystemDefaults) -> Self {
        Self {
            label: first_present(&[&requested.label, &fallback.label, &defaults.label]),
            value: first_present(&[&requested.value, &fallback.value, &defaults.value]),
            description: first_present(&[&requested.description, &fallback.description]),
            sort: first_present(&[&requested.sort, &fallback.sort]),
            id: first_present(&[&requested.id, &fallback.id]),
            parent_id: first_present(&[&requested.parent_id, &fallback.parent_id]),
        }
    }

    /// Every set field must name an existing column of `entity`.
    pub fn validate(&self, schema: &dyn SchemaIntrospector, entity: &str) -> Result<()> {
        if !schema.contains_entity(entity) {
            return Err(CanopyError::UnknownEntity(entity.to_string()));
        }
        for (field, column) in self.fields() {
            if !schema.has_column(entity, column) {
                return Err(CanopyError::ColumnNotFound {
                    field: field.as_str(),
                    column: column.to_string(),
                    entity: entity.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Tree projections need both the id and the parent-id column.
    pub fn require_tree(&self, entity: &str) -> Result<()> {
        for field in [MappingField::Id, MappingField::ParentId] {
            if self.get(field).is_none() {
                return Err(CanopyError::MissingTreeColumn {
                    field: field.as_str(),
                    entity: entity.to_string(),
                });
            }
        }
        Ok(())
    }

    /// A request-scoped option selecting each mapped column under its field
    /// name. A `sort` column replaces any ordering applied before it.
    pub fn projection<Q, C, X>(&self, phases: impl Into<PhaseSet>) -> QueryOption<Q, C, X>
    where
        Q: Query + 'static,
        C: 'static,
        X: 'static,
    {
        let mapping = self.clone();
        QueryOption::new("column-mapping", phases, move |query: &mut Q, _: &C, _: &X| {
            for (field, column) in mapping.fields() {
                if field == MappingField::Sort {
                    continue;
                }
                let expr = query.column(column);
                query.select_as(expr, field.as_str());
            }
            if let Some(sort) = mapping.get(MappingField::Sort) {
                let expr = query.column(sort);
                query.select_as(expr, MappingField::Sort.as_str());
                let term = SortTerm::asc(sort.to_string()).output(MappingField::Sort.as_str());
                query.clear_order().order_by_term(term);
            }
            Ok(())
        })
    }
}
