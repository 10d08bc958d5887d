//! Read endpoints: one composer plus the mapping and hierarchy settings of a
//! single entity, built at startup and shared by every request.

use std::sync::Arc;

use canopy_core::error::Result;
use canopy_core::{
    Catalog, ColumnMapping, Composer, EntitySchema, HierarchyConfig, HierarchyRetriever,
    QueryOption, Selection, SetupConfig, SystemDefaults, TableRef, TreeNode, build_tree, normalize,
};

use crate::SqliteQuery;
use crate::connection::Db;
use crate::record::{OptionItem, Record, TreeOptionItem};
use crate::values::SQLiteValue;

/// A caller-supplied post-processing step. Returning `None` serves an empty
/// result.
pub type Transform<T> = Arc<dyn Fn(Vec<T>) -> Option<Vec<T>> + Send + Sync>;

/// The read side of one entity.
pub struct ReadEndpoint<C, X> {
    schema: EntitySchema,
    composer: Arc<Composer<SqliteQuery, C, X>>,
    hierarchy: HierarchyRetriever,
    mapping: ColumnMapping,
    defaults: SystemDefaults,
    allow_override: bool,
    list_transform: Option<Transform<Record>>,
    tree_transform: Option<Transform<TreeNode<Record>>>,
    options_transform: Option<Transform<OptionItem>>,
    option_tree_transform: Option<Transform<TreeOptionItem>>,
}

/// Collects endpoint settings; [`build`](EndpointBuilder::build) runs setup.
pub struct EndpointBuilder<C, X> {
    schema: EntitySchema,
    related: Catalog,
    table: TableRef,
    options: Vec<QueryOption<SqliteQuery, C, X>>,
    setup: SetupConfig<C, X, SQLiteValue>,
    hierarchy: HierarchyConfig,
    mapping: ColumnMapping,
    allow_override: bool,
    list_transform: Option<Transform<Record>>,
    tree_transform: Option<Transform<TreeNode<Record>>>,
    options_transform: Option<Transform<OptionItem>>,
    option_tree_transform: Option<Transform<TreeOptionItem>>,
}

impl<C: 'static, X: 'static> EndpointBuilder<C, X> {
    /// Aliases the entity table inside generated statements
    pub fn alias(mut self, alias: &str) -> Self {
        self.table = TableRef::aliased(self.schema.name().to_string(), alias.to_string());
        self
    }

    /// Makes another entity known to setup, e.g. the actor table of an
    /// [`AuditJoin`](canopy_core::AuditJoin)
    pub fn related(mut self, schema: EntitySchema) -> Self {
        self.related.insert(schema);
        self
    }

    pub fn option(mut self, option: QueryOption<SqliteQuery, C, X>) -> Self {
        self.options.push(option);
        self
    }

    pub fn setup(mut self, config: SetupConfig<C, X, SQLiteValue>) -> Self {
        self.setup = config;
        self
    }

    pub fn hierarchy(mut self, config: HierarchyConfig) -> Self {
        self.hierarchy = config;
        self
    }

    /// The endpoint's default column mapping
    pub fn mapping(mut self, mapping: ColumnMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Whether requests may name their own columns. Allowed by default.
    pub fn allow_override(mut self, allow: bool) -> Self {
        self.allow_override = allow;
        self
    }

    pub fn transform_list<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<Record>) -> Option<Vec<Record>> + Send + Sync + 'static,
    {
        self.list_transform = Some(Arc::new(transform));
        self
    }

    pub fn transform_tree<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<TreeNode<Record>>) -> Option<Vec<TreeNode<Record>>> + Send + Sync + 'static,
    {
        self.tree_transform = Some(Arc::new(transform));
        self
    }

    pub fn transform_options<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<OptionItem>) -> Option<Vec<OptionItem>> + Send + Sync + 'static,
    {
        self.options_transform = Some(Arc::new(transform));
        self
    }

    pub fn transform_option_tree<F>(mut self, transform: F) -> Self
    where
        F: Fn(Vec<TreeOptionItem>) -> Option<Vec<TreeOptionItem>> + Send + Sync + 'static,
    {
        self.option_tree_transform = Some(Arc::new(transform));
        self
    }

    /// Sets the composer up and checks the default mapping against the
    /// schema. Every error here is a configuration error.
    pub fn build(self) -> Result<ReadEndpoint<C, X>> {
        let entity = self.schema.name().to_string();
        let mut composer = Composer::new(self.table);
        for option in self.options {
            composer.register(option)?;
        }
        let catalog = self.related.with(self.schema.clone());
        composer.setup(&catalog, self.setup)?;

        let defaults = SystemDefaults::from_schema(&self.schema, &entity);
        ColumnMapping::merge(&ColumnMapping::new(), &self.mapping, &defaults)
            .validate(&self.schema, &entity)?;

        Ok(ReadEndpoint {
            schema: self.schema,
            composer: Arc::new(composer),
            hierarchy: HierarchyRetriever::new(self.hierarchy),
            mapping: self.mapping,
            defaults,
            allow_override: self.allow_override,
            list_transform: self.list_transform,
            tree_transform: self.tree_transform,
            options_transform: self.options_transform,
            option_tree_transform: self.option_tree_transform,
        })
    }
}

impl<C: 'static, X: 'static> ReadEndpoint<C, X> {
    pub fn builder(schema: EntitySchema) -> EndpointBuilder<C, X> {
        EndpointBuilder {
            table: TableRef::new(schema.name().to_string()),
            schema,
            related: Catalog::new(),
            options: Vec::new(),
            setup: SetupConfig::new(),
            hierarchy: HierarchyConfig::default(),
            mapping: ColumnMapping::new(),
            allow_override: true,
            list_transform: None,
            tree_transform: None,
            options_transform: None,
            option_tree_transform: None,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn composer(&self) -> &Arc<Composer<SqliteQuery, C, X>> {
        &self.composer
    }

    pub fn hierarchy(&self) -> &HierarchyRetriever {
        &self.hierarchy
    }

    /// The mapping a request gets after merging and validation.
    ///
    /// A requested mapping is ignored unless overrides are allowed.
    pub fn resolve(&self, requested: Option<&ColumnMapping>) -> Result<ColumnMapping> {
        let empty = ColumnMapping::new();
        let requested = match requested {
            Some(mapping) if self.allow_override => mapping,
            _ => &empty,
        };
        let mapping = ColumnMapping::merge(requested, &self.mapping, &self.defaults);
        mapping.validate(&self.schema, self.schema.name())?;
        Ok(mapping)
    }

    /// Flat list of whole records
    pub fn list(&self, db: Db<'_>, criteria: &C, context: &X) -> Result<Vec<Record>> {
        let query = self.composer.select(criteria, context)?;
        let rows = db.select(&query)?;
        Ok(apply(rows, self.list_transform.as_ref()))
    }

    /// Matching records with all of their descendants (or ancestors), nested
    pub fn tree(&self, db: Db<'_>, criteria: &C, context: &X) -> Result<Vec<TreeNode<Record>>> {
        let rows: Vec<Record> =
            db.retrieve(&self.hierarchy, &self.composer, criteria, context, Selection::Entity)?;
        let config = self.hierarchy.config();
        let tree = build_tree(
            rows,
            |record| record.key(&config.id_column).unwrap_or_default(),
            |record| record.key(&config.parent_column),
        );
        Ok(apply(tree, self.tree_transform.as_ref()))
    }

    /// Label/value projections of the matching records
    pub fn options(
        &self,
        db: Db<'_>,
        criteria: &C,
        context: &X,
        requested: Option<&ColumnMapping>,
    ) -> Result<Vec<OptionItem>> {
        let mapping = self.resolve(requested)?;
        let query = self
            .composer
            .read(criteria, context, Selection::Mapping(&mapping))?;
        let items = db.select(&query)?;
        Ok(apply(items, self.options_transform.as_ref()))
    }

    /// Label/value projections nested by the mapping's id and parent-id
    pub fn option_tree(
        &self,
        db: Db<'_>,
        criteria: &C,
        context: &X,
        requested: Option<&ColumnMapping>,
    ) -> Result<Vec<TreeOptionItem>> {
        let mapping = self.resolve(requested)?;
        mapping.require_tree(self.schema.name())?;
        let items: Vec<OptionItem> = db.retrieve(
            &self.hierarchy,
            &self.composer,
            criteria,
            context,
            Selection::Mapping(&mapping),
        )?;
        let tree = build_tree(
            items,
            |item| item.id.clone().unwrap_or_default(),
            |item| item.parent_id.clone(),
        );
        Ok(apply(tree, self.option_tree_transform.as_ref()))
    }
}

fn apply<T>(rows: Vec<T>, transform: Option<&Transform<T>>) -> Vec<T> {
    match transform {
        Some(transform) => normalize(transform(rows)),
        None => rows,
    }
}
