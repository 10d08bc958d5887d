//! Schema introspection consumed by mapping validation and composer setup.

use hashbrown::HashMap;

/// One column of an entity's table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDescriptor {
    pub name: String,
    pub sql_type: String,
    pub primary_key: bool,
    pub not_null: bool,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
            not_null: false,
        }
    }

    /// Marks the column as (part of) the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}

/// Answers questions about entity tables.
///
/// `fields` is the only required method. `field_exists` compares names
/// exactly, `has_column` the way SQL does (ASCII case-insensitive).
pub trait SchemaIntrospector {
    /// Columns of `entity` in declaration order, `None` for an unknown entity
    fn fields(&self, entity: &str) -> Option<Vec<FieldDescriptor>>;

    fn field_exists(&self, entity: &str, column: &str) -> bool {
        self.fields(entity)
            .is_some_and(|fields| fields.iter().any(|f| f.name == column))
    }

    fn has_column(&self, entity: &str, name: &str) -> bool {
        self.fields(entity)
            .is_some_and(|fields| fields.iter().any(|f| f.name.eq_ignore_ascii_case(name)))
    }

    /// Primary-key columns, empty for an unknown entity or a table without one
    fn primary_key_fields(&self, entity: &str) -> Vec<FieldDescriptor> {
        self.fields(entity)
            .unwrap_or_default()
            .into_iter()
            .filter(|f| f.primary_key)
            .collect()
    }

    /// The human-readable "name-like" column, if any
    fn name_column(&self, entity: &str) -> Option<String> {
        let fields = self.fields(entity)?;
        ["name", "title"].into_iter().find_map(|guess| {
            fields
                .iter()
                .find(|f| f.name.eq_ignore_ascii_case(guess))
                .map(|f| f.name.clone())
        })
    }

    fn contains_entity(&self, entity: &str) -> bool {
        self.fields(entity).is_some()
    }
}

/// Schema of a single entity table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntitySchema {
    name: String,
    columns: Vec<FieldDescriptor>,
    name_column: Option<String>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            name_column: None,
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.columns.push(field);
        self
    }

    /// Adds a plain nullable column
    pub fn column(self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name, sql_type))
    }

    /// Overrides the guessed name-like column
    pub fn with_name_column(mut self, column: impl Into<String>) -> Self {
        self.name_column = Some(column.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[FieldDescriptor] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|f| f.name.as_str())
    }

    fn describes(&self, entity: &str) -> bool {
        self.name == entity
    }
}

impl SchemaIntrospector for EntitySchema {
    fn fields(&self, entity: &str) -> Option<Vec<FieldDescriptor>> {
        self.describes(entity).then(|| self.columns.clone())
    }

    fn field_exists(&self, entity: &str, column: &str) -> bool {
        self.describes(entity) && self.columns.iter().any(|f| f.name == column)
    }

    fn has_column(&self, entity: &str, name: &str) -> bool {
        self.describes(entity)
            && self
                .columns
                .iter()
                .any(|f| f.name.eq_ignore_ascii_case(name))
    }

    fn name_column(&self, entity: &str) -> Option<String> {
        if !self.describes(entity) {
            return None;
        }
        match &self.name_column {
            Some(column) => Some(column.clone()),
            None => ["name", "title"].into_iter().find_map(|guess| {
                self.columns
                    .iter()
                    .find(|f| f.name.eq_ignore_ascii_case(guess))
                    .map(|f| f.name.clone())
            }),
        }
    }
}

/// Schemas of several entities, keyed by table name.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entities: HashMap<String, EntitySchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, schema: EntitySchema) -> Self {
        self.insert(schema);
        self
    }

    pub fn insert(&mut self, schema: EntitySchema) {
        self.entities.insert(schema.name.clone(), schema);
    }

    pub fn get(&self, entity: &str) -> Option<&EntitySchema> {
        self.entities.get(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl SchemaIntrospector for Catalog {
    fn fields(&self, entity: &str) -> Option<Vec<FieldDescriptor>> {
        self.get(entity).map(|schema| schema.columns.clone())
    }

    fn field_exists(&self, entity: &str, column: &str) -> bool {
        self.get(entity)
            .is_some_and(|schema| schema.field_exists(entity, column))
    }

    fn has_column(&self, entity: &str, name: &str) -> bool {
        self.get(entity)
            .is_some_and(|schema| schema.has_column(entity, name))
    }

    fn name_column(&self, entity: &str) -> Option<String> {
        self.get(entity).and_then(|schema| schema.name_column(entity))
    }
}

impl FromIterator<EntitySchema> for Catalog {
    fn from_iter<I: IntoIterator<Item = EntitySchema>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for schema in iter {
            catalog.insert(schema);
        }
        catalog
    }
}
