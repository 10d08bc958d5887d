//! Query options: the atomic configuration unit of a read endpoint.
//!
//! An option targets a set of [`Phase`]s and carries an apply function that
//! mutates a query given the request's search criteria and context.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::{CanopyError, Result};

/// A named stage of query construction.
///
/// A flat read only materializes `Seed`. `All` is a bucket of its own: options
/// registered on it run after the phase-specific ones of every phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Phase {
    Seed,
    Expansion,
    All,
}

impl Phase {
    pub const VARIANTS: [Phase; 3] = [Phase::Seed, Phase::Expansion, Phase::All];

    const fn bit(self) -> u8 {
        match self {
            Phase::Seed => 0b001,
            Phase::Expansion => 0b010,
            Phase::All => 0b100,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Seed => "seed",
            Phase::Expansion => "expansion",
            Phase::All => "all",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A copyable set of phases.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhaseSet(u8);

impl PhaseSet {
    pub const EMPTY: PhaseSet = PhaseSet(0);
    pub const SEED: PhaseSet = PhaseSet::of(Phase::Seed);
    pub const EXPANSION: PhaseSet = PhaseSet::of(Phase::Expansion);
    /// The set holding the `All` bucket
    pub const ALL: PhaseSet = PhaseSet::of(Phase::All);

    pub const fn of(phase: Phase) -> Self {
        PhaseSet(phase.bit())
    }

    pub const fn with(self, phase: Phase) -> Self {
        PhaseSet(self.0 | phase.bit())
    }

    pub const fn contains(self, phase: Phase) -> bool {
        self.0 & phase.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Phase> {
        Phase::VARIANTS
            .into_iter()
            .filter(move |phase| self.contains(*phase))
    }
}

impl From<Phase> for PhaseSet {
    fn from(phase: Phase) -> Self {
        PhaseSet::of(phase)
    }
}

impl<const N: usize> From<[Phase; N]> for PhaseSet {
    fn from(phases: [Phase; N]) -> Self {
        phases.into_iter().collect()
    }
}

impl FromIterator<Phase> for PhaseSet {
    fn from_iter<I: IntoIterator<Item = Phase>>(iter: I) -> Self {
        iter.into_iter().fold(PhaseSet::EMPTY, PhaseSet::with)
    }
}

impl fmt::Debug for PhaseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for PhaseSet {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> core::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PhaseSet {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> core::result::Result<Self, D::Error> {
        let phases = Vec::<Phase>::deserialize(deserializer)?;
        Ok(phases.into_iter().collect())
    }
}

type ApplyFn<Q, C, X> = dyn Fn(&mut Q, &C, &X) -> Result<()> + Send + Sync;

/// A set of target phases plus an apply function.
///
/// Immutable once built; clones share the apply function.
pub struct QueryOption<Q, C, X> {
    name: Cow<'static, str>,
    phases: PhaseSet,
    apply: Arc<ApplyFn<Q, C, X>>,
}

impl<Q, C, X> QueryOption<Q, C, X> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, phases: impl Into<PhaseSet>, apply: F) -> Self
    where
        F: Fn(&mut Q, &C, &X) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            phases: phases.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> PhaseSet {
        self.phases
    }

    pub fn targets(&self, phase: Phase) -> bool {
        self.phases.contains(phase)
    }

    /// The same option retargeted at other phases
    pub fn with_phases(&self, phases: impl Into<PhaseSet>) -> Self {
        Self {
            name: self.name.clone(),
            phases: phases.into(),
            apply: Arc::clone(&self.apply),
        }
    }

    pub fn apply(&self, query: &mut Q, criteria: &C, context: &X) -> Result<()> {
        (self.apply)(query, criteria, context)
    }

    /// Whether two handles share one apply function
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.apply, &other.apply)
    }
}

impl<Q: 'static, C: Any, X: 'static> QueryOption<Q, C, X> {
    /// Wraps an apply function written for criteria of type `T`.
    ///
    /// The criteria value is downcast on every application, either directly
    /// or out of a [`DynCriteria`] box. A mismatch fails with
    /// [`CanopyError::CriteriaTypeMismatch`].
    pub fn typed<T, F>(
        name: impl Into<Cow<'static, str>>,
        phases: impl Into<PhaseSet>,
        apply: F,
    ) -> Self
    where
        T: Any,
        F: Fn(&mut Q, &T, &X) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let option = name.clone();
        Self::new(name, phases, move |query: &mut Q, criteria: &C, context: &X| {
            let any: &dyn Any = criteria;
            let dynamic = any.downcast_ref::<DynCriteria>();
            let typed = any
                .downcast_ref::<T>()
                .or_else(|| dynamic.and_then(DynCriteria::downcast_ref::<T>));
            match typed {
                Some(criteria) => apply(query, criteria, context),
                None => Err(CanopyError::CriteriaTypeMismatch {
                    option: option.to_string(),
                    expected: type_name::<T>(),
                    found: dynamic.map_or(type_name::<C>(), DynCriteria::type_name),
                }),
            }
        })
    }
}

impl<Q, C, X> Clone for QueryOption<Q, C, X> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            phases: self.phases,
            apply: Arc::clone(&self.apply),
        }
    }
}

impl<Q, C, X> fmt::Debug for QueryOption<Q, C, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOption")
            .field("name", &self.name)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

/// Type-erased search criteria for endpoints whose criteria type is only
/// known at request time.
pub struct DynCriteria {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl DynCriteria {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for DynCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynCriteria").field(&self.type_name).finish()
    }
}
