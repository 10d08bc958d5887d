//! The composition engine: one [`Composer`] per read endpoint.
//!
//! A composer is built at endpoint registration, folds schema-derived options
//! in during a one-time [`Composer::setup`], and is read-only afterwards, so a
//! single instance can be shared (`Arc<Composer<..>>`) by concurrent requests.

use std::sync::Arc;

use hashbrown::HashMap;

use crate::criteria::{CriteriaApplier, MatchAll, PermissionScopeProvider};
use crate::error::{CanopyError, Result};
use crate::expr;
use crate::mapping::ColumnMapping;
use crate::option::{Phase, PhaseSet, QueryOption};
use crate::query::{Join, Query, SelectQuery, SortTerm, TableRef};
use crate::schema::SchemaIntrospector;
use crate::traits::SQLParam;

/// Joins bringing in the display name of the actors that created and last
/// updated a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditJoin {
    pub actor_entity: String,
    pub display_column: String,
    pub creator_column: String,
    pub creator_alias: String,
    pub updater_column: String,
    pub updater_alias: String,
}

impl AuditJoin {
    /// Joins `created_by` and `updated_by` to `actor_entity`, selecting its
    /// `display_column` as `created_by_name` and `updated_by_name`.
    pub fn new(actor_entity: impl Into<String>, display_column: impl Into<String>) -> Self {
        Self {
            actor_entity: actor_entity.into(),
            display_column: display_column.into(),
            creator_column: "created_by".into(),
            creator_alias: "created_by_name".into(),
            updater_column: "updated_by".into(),
            updater_alias: "updated_by_name".into(),
        }
    }

    pub fn creator(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.creator_column = column.into();
        self.creator_alias = alias.into();
        self
    }

    pub fn updater(mut self, column: impl Into<String>, alias: impl Into<String>) -> Self {
        self.updater_column = column.into();
        self.updater_alias = alias.into();
        self
    }
}

/// What a read returns per row.
#[derive(Clone, Copy, Debug)]
pub enum Selection<'m> {
    /// Every entity column under its own name, plus whatever options select
    Entity,
    /// Only the mapped columns, aliased by their logical field names
    Mapping(&'m ColumnMapping),
}

/// Inputs to [`Composer::setup`].
pub struct SetupConfig<C, X, V: SQLParam> {
    condition_phases: PhaseSet,
    criteria: Arc<dyn CriteriaApplier<C, V>>,
    permission: Option<Arc<dyn PermissionScopeProvider<X, V>>>,
    permission_disabled: bool,
    audit: Option<AuditJoin>,
    default_sort: Option<Vec<SortTerm>>,
    created_at_column: String,
}

impl<C: 'static, X: 'static, V: SQLParam + 'static> SetupConfig<C, X, V> {
    /// Criteria match everything, conditions apply to `Seed`, no permission
    /// scope, no audit joins, derived default ordering.
    pub fn new() -> Self {
        Self {
            condition_phases: PhaseSet::SEED,
            criteria: Arc::new(MatchAll),
            permission: None,
            permission_disabled: false,
            audit: None,
            default_sort: None,
            created_at_column: "created_at".into(),
        }
    }

    /// Phases the search and permission predicates are registered on
    pub fn condition_phases(mut self, phases: impl Into<PhaseSet>) -> Self {
        self.condition_phases = phases.into();
        self
    }

    pub fn criteria(mut self, applier: impl CriteriaApplier<C, V> + 'static) -> Self {
        self.criteria = Arc::new(applier);
        self
    }

    pub fn permission(mut self, provider: impl PermissionScopeProvider<X, V> + 'static) -> Self {
        self.permission = Some(Arc::new(provider));
        self
    }

    pub fn without_permission(mut self) -> Self {
        self.permission_disabled = true;
        self
    }

    pub fn audit(mut self, audit: AuditJoin) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Replaces the derived default ordering. An empty list disables it.
    pub fn default_sort(mut self, terms: Vec<SortTerm>) -> Self {
        self.default_sort = Some(terms);
        self
    }

    pub fn created_at_column(mut self, column: impl Into<String>) -> Self {
        self.created_at_column = column.into();
        self
    }
}

impl<C: 'static, X: 'static, V: SQLParam + 'static> Default for SetupConfig<C, X, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered query options of one endpoint, bucketed by phase.
#[derive(Debug)]
pub struct Composer<Q, C, X> {
    table: TableRef,
    fields: Vec<String>,
    explicit: Vec<QueryOption<Q, C, X>>,
    options: Vec<QueryOption<Q, C, X>>,
    by_phase: HashMap<Phase, Vec<usize>>,
    default_sort: Vec<SortTerm>,
    default_sort_resolved: bool,
    setup_done: bool,
}

impl<Q, C, X> Composer<Q, C, X>
where
    Q: Query + 'static,
    C: 'static,
    X: 'static,
{
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            fields: Vec::new(),
            explicit: Vec::new(),
            options: Vec::new(),
            by_phase: HashMap::new(),
            default_sort: Vec::new(),
            default_sort_resolved: false,
            setup_done: false,
        }
    }

    /// Registers an explicit option. Explicit options run after the derived
    /// ones, in registration order.
    pub fn register(&mut self, option: QueryOption<Q, C, X>) -> Result<&mut Self> {
        if self.setup_done {
            return Err(CanopyError::AlreadySetUp(self.table.name().to_string()));
        }
        self.explicit.push(option);
        Ok(self)
    }

    /// Builder form of [`register`](Self::register) for composers not yet set up
    pub fn with_option(mut self, option: QueryOption<Q, C, X>) -> Result<Self> {
        self.register(option)?;
        Ok(self)
    }

    /// Folds the derived options in and freezes the composer.
    ///
    /// Calling it again is a no-op. On error the composer is left untouched.
    pub fn setup(
        &mut self,
        schema: &dyn SchemaIntrospector,
        config: SetupConfig<C, X, Q::Value>,
    ) -> Result<()> {
        if self.setup_done {
            return Ok(());
        }
        crate::canopy_profile_function!();

        let entity = self.table.name().to_string();
        if !schema.contains_entity(&entity) {
            return Err(CanopyError::UnknownEntity(entity));
        }

        let mut options = Vec::with_capacity(self.explicit.len() + 5);
        options.push(criteria_option(
            Arc::clone(&config.criteria),
            config.condition_phases,
        ));

        if !config.permission_disabled {
            if let Some(provider) = &config.permission {
                options.push(permission_option(
                    Arc::clone(provider),
                    config.condition_phases,
                ));
            }
        }

        if let Some(audit) = &config.audit {
            options.extend(audit_options(schema, &entity, audit)?);
        }

        let default_sort = resolve_default_sort(
            schema,
            &entity,
            config.default_sort,
            &config.created_at_column,
        )?;
        if !default_sort.is_empty() {
            options.push(sort_option(default_sort.clone()));
        }

        options.extend(self.explicit.iter().cloned());

        let mut by_phase: HashMap<Phase, Vec<usize>> = HashMap::new();
        for (index, option) in options.iter().enumerate() {
            for phase in option.phases().iter() {
                by_phase.entry(phase).or_default().push(index);
            }
        }

        canopy_trace_setup!(entity, options.len());

        self.fields = schema
            .fields(&entity)
            .unwrap_or_default()
            .into_iter()
            .map(|field| field.name)
            .collect();
        self.options = options;
        self.by_phase = by_phase;
        self.default_sort = default_sort;
        self.default_sort_resolved = true;
        self.setup_done = true;
        Ok(())
    }

    /// Applies every option of `phase`, then every option of `All`, each at
    /// most once and in registration order. The first error aborts.
    pub fn configure(&self, query: &mut Q, criteria: &C, context: &X, phase: Phase) -> Result<()> {
        self.configure_with(query, criteria, context, phase, &[])
    }

    /// [`configure`](Self::configure), followed by request-scoped options
    /// targeting `phase` or `All`.
    pub fn configure_with(
        &self,
        query: &mut Q,
        criteria: &C,
        context: &X,
        phase: Phase,
        extra: &[QueryOption<Q, C, X>],
    ) -> Result<()> {
        if !self.setup_done {
            return Err(CanopyError::NotSetUp(self.table.name().to_string()));
        }
        crate::canopy_profile_scope!("compose", "configure");

        let mut applied = vec![false; self.options.len()];
        for &index in self.bucket(phase).iter().chain(self.bucket(Phase::All)) {
            if applied[index] {
                continue;
            }
            applied[index] = true;
            let option = &self.options[index];
            canopy_trace_phase!(phase, option.name());
            option.apply(query, criteria, context)?;
        }

        for option in extra {
            if option.targets(phase) || option.targets(Phase::All) {
                canopy_trace_phase!(phase, option.name());
                option.apply(query, criteria, context)?;
            }
        }
        Ok(())
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Entity column names captured at setup
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Every option after setup, in registration order
    pub fn options(&self) -> &[QueryOption<Q, C, X>] {
        &self.options
    }

    /// Options bucketed under `phase` (without the `All` bucket)
    pub fn options_for(&self, phase: Phase) -> impl Iterator<Item = &QueryOption<Q, C, X>> {
        self.bucket(phase).iter().map(|&index| &self.options[index])
    }

    /// Indices into [`options`](Self::options) bucketed under `phase`
    pub fn bucket(&self, phase: Phase) -> &[usize] {
        self.by_phase.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The resolved default ordering, empty when disabled or underivable
    pub fn default_sort(&self) -> &[SortTerm] {
        &self.default_sort
    }

    pub fn is_default_sort_resolved(&self) -> bool {
        self.default_sort_resolved
    }

    pub fn is_set_up(&self) -> bool {
        self.setup_done
    }
}

impl<V, C, X> Composer<SelectQuery<V>, C, X>
where
    V: SQLParam + 'static,
    C: 'static,
    X: 'static,
{
    /// A fresh query over the composer's table
    pub fn query(&self) -> SelectQuery<V> {
        SelectQuery::new(self.table.clone())
    }

    /// Prepares `query` for `selection`: entity columns are selected up
    /// front, a mapping comes back as a request-scoped option to run after the
    /// composer's own.
    pub fn prepare(
        &self,
        query: &mut SelectQuery<V>,
        selection: Selection<'_>,
        phases: PhaseSet,
    ) -> Vec<QueryOption<SelectQuery<V>, C, X>> {
        match selection {
            Selection::Entity => {
                if self.fields.is_empty() {
                    query.select_all();
                }
                for field in &self.fields {
                    query.select(field);
                }
                Vec::new()
            }
            Selection::Mapping(mapping) => vec![mapping.projection(phases)],
        }
    }

    /// A flat read of whole entities: only the `Seed` phase is materialized.
    pub fn select(&self, criteria: &C, context: &X) -> Result<SelectQuery<V>> {
        self.read(criteria, context, Selection::Entity)
    }

    /// A flat read with an explicit selection
    pub fn read(
        &self,
        criteria: &C,
        context: &X,
        selection: Selection<'_>,
    ) -> Result<SelectQuery<V>> {
        let mut query = self.query();
        let extra = self.prepare(&mut query, selection, PhaseSet::SEED);
        self.configure_with(&mut query, criteria, context, Phase::Seed, &extra)?;
        Ok(query)
    }
}

fn criteria_option<Q, C, X>(
    applier: Arc<dyn CriteriaApplier<C, Q::Value>>,
    phases: PhaseSet,
) -> QueryOption<Q, C, X>
where
    Q: Query + 'static,
    C: 'static,
    X: 'static,
{
    QueryOption::new("search-criteria", phases, move |query: &mut Q, criteria: &C, _: &X| {
        if let Some(predicate) = applier.predicate(criteria, query.table())? {
            query.r#where(predicate);
        }
        Ok(())
    })
}

fn permission_option<Q, C, X>(
    provider: Arc<dyn PermissionScopeProvider<X, Q::Value>>,
    phases: PhaseSet,
) -> QueryOption<Q, C, X>
where
    Q: Query + 'static,
    C: 'static,
    X: 'static,
{
    QueryOption::new("permission-scope", phases, move |query: &mut Q, _: &C, context: &X| {
        if let Some(scope) = provider.scope(context, query.table())? {
            query.r#where(scope);
        }
        Ok(())
    })
}

fn audit_options<Q, C, X>(
    schema: &dyn SchemaIntrospector,
    entity: &str,
    audit: &AuditJoin,
) -> Result<Vec<QueryOption<Q, C, X>>>
where
    Q: Query + 'static,
    C: 'static,
    X: 'static,
{
    let actor = audit.actor_entity.as_str();
    if !schema.contains_entity(actor) {
        return Err(CanopyError::UnknownEntity(actor.to_string()));
    }
    let keys = schema.primary_key_fields(actor);
    let key = match keys.as_slice() {
        [] => {
            return Err(CanopyError::NoPrimaryKey {
                entity: actor.to_string(),
            });
        }
        [key] => key.name.clone(),
        more => {
            return Err(CanopyError::UnsupportedCompositeKey {
                entity: actor.to_string(),
                count: more.len(),
            });
        }
    };
    if !schema.has_column(actor, &audit.display_column) {
        return Err(CanopyError::ColumnNotFound {
            field: "display",
            column: audit.display_column.clone(),
            entity: actor.to_string(),
        });
    }

    let roles = [
        ("creator", &audit.creator_column, &audit.creator_alias),
        ("updater", &audit.updater_column, &audit.updater_alias),
    ];
    let mut options = Vec::with_capacity(roles.len());
    for (role, column, alias) in roles {
        if !schema.has_column(entity, column) {
            return Err(CanopyError::ColumnNotFound {
                field: role,
                column: column.clone(),
                entity: entity.to_string(),
            });
        }
        let joined = TableRef::aliased(actor.to_string(), role);
        let column = column.clone();
        let alias = alias.clone();
        let key = key.clone();
        let display = audit.display_column.clone();
        options.push(QueryOption::new(
            format!("audit-{role}"),
            PhaseSet::ALL,
            move |query: &mut Q, _: &C, _: &X| {
                let on = expr::eq(query.column(&column), joined.column::<Q::Value>(key.clone()));
                query.join(Join::new().left(), joined.clone(), on);
                query.select_as(joined.column(display.clone()), &alias);
                Ok(())
            },
        ));
    }
    Ok(options)
}

fn resolve_default_sort(
    schema: &dyn SchemaIntrospector,
    entity: &str,
    explicit: Option<Vec<SortTerm>>,
    created_at: &str,
) -> Result<Vec<SortTerm>> {
    if let Some(terms) = explicit {
        if let Some(bad) = terms.iter().find(|t| !schema.has_column(entity, &t.column)) {
            return Err(CanopyError::InvalidSortColumn {
                column: bad.column.to_string(),
                entity: entity.to_string(),
            });
        }
        return Ok(terms);
    }

    let keys = schema.primary_key_fields(entity);
    if let [key] = keys.as_slice() {
        return Ok(vec![SortTerm::desc(key.name.clone())]);
    }
    if !created_at.is_empty() && schema.has_column(entity, created_at) {
        return Ok(vec![SortTerm::desc(created_at.to_string())]);
    }
    Ok(Vec::new())
}

fn sort_option<Q, C, X>(terms: Vec<SortTerm>) -> QueryOption<Q, C, X>
where
    Q: Query + 'static,
    C: 'static,
    X: 'static,
{
    QueryOption::new("default-sort", PhaseSet::SEED, move |query: &mut Q, _: &C, _: &X| {
        for term in &terms {
            query.order_by_term(term.clone());
        }
        Ok(())
    })
}
