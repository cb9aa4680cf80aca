//! # Type Introspection and Default Construction
//!
//! Rust has no runtime reflection, so constructor metadata is contributed at
//! compile time: the [`constructible!`](crate::constructible) macro emits one
//! entry per type into a `linkme` distributed slice, and this module indexes
//! those entries by `TypeId` on first use. At resolution time the engine
//! performs a runtime lookup, exactly as a reflective implementation would,
//! and types without a plan fail with an error naming them.
//!
//! ## Selection rules
//!
//! Given a type's declared constructors:
//!
//! 1. The constructor with the most parameters wins.
//! 2. A tie at the maximum parameter count is an error
//!    ([`ResolveError::AmbiguousConstructor`]).
//! 3. Required parameters resolve recursively through the container;
//!    defaulted parameters use their declared expression verbatim; `Option`
//!    parameters attempt resolution and degrade to `None` on failure.
//!
//! The chosen constructor's pre-compiled build closure becomes the type's
//! implicit factory and is memoized per container, so repeated resolutions
//! skip re-introspection.
//!
//! ## Usage
//!
//! ```
//! use wirecore::{constructible, Container};
//!
//! #[derive(Debug)]
//! struct Endpoint {
//!     port: u16,
//! }
//!
//! impl Endpoint {
//!     fn new(port: u16) -> Self {
//!         Self { port }
//!     }
//! }
//!
//! constructible! {
//!     Endpoint {
//!         new(port: u16);
//!     }
//! }
//!
//! let container = Container::new();
//! container.register(|_| Ok(9090u16));
//!
//! let endpoint = container.resolve::<Endpoint>().unwrap();
//! assert_eq!(endpoint.port, 9090);
//! ```

mod macros;

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime};

use linkme::distributed_slice;
use once_cell::sync::Lazy;

use crate::container::Deferred;
use crate::error::{ResolveError, Result};
use crate::key::TypeKey;
use crate::strategy::{factory, SharedFactory};

/// Distributed slice of constructor-plan contributions.
///
/// Each element is a function producing the plan for one type; the
/// [`constructible!`](crate::constructible) macro appends entries here.
#[distributed_slice]
pub static CONSTRUCTIBLE_TYPES: [fn() -> TypePlan] = [..];

/// How a constructor parameter is satisfied during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Resolved recursively through the container; failure propagates.
    Required,
    /// Filled with the declared default expression.
    Defaulted,
    /// Resolved through the container, degrading to `None` on failure.
    Optional,
}

/// Metadata for a single constructor parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: &'static str,
    type_name: &'static str,
    kind: ParamKind,
    primitive: bool,
}

impl ParamSpec {
    /// A required parameter of type `P`.
    pub fn required<P: 'static>(name: &'static str) -> Self {
        Self::describe::<P>(name, ParamKind::Required)
    }

    /// A parameter of type `P` with a declared default expression.
    pub fn defaulted<P: 'static>(name: &'static str) -> Self {
        Self::describe::<P>(name, ParamKind::Defaulted)
    }

    /// An optional dependency of type `P`.
    pub fn optional<P: 'static>(name: &'static str) -> Self {
        Self::describe::<P>(name, ParamKind::Optional)
    }

    fn describe<P: 'static>(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            type_name: std::any::type_name::<P>(),
            kind,
            primitive: is_primitive(TypeId::of::<P>()),
        }
    }

    /// The parameter name as written in the declaration.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The parameter's type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// How the parameter is satisfied.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Whether the parameter's type counts as primitive.
    pub fn is_primitive(&self) -> bool {
        self.primitive
    }
}

/// Metadata plus the compiled build closure for one declared constructor.
pub struct ConstructorSpec {
    name: &'static str,
    params: Vec<ParamSpec>,
    build: SharedFactory,
}

impl ConstructorSpec {
    /// Create a constructor spec. Used by the `constructible!` expansion.
    pub fn new(name: &'static str, params: Vec<ParamSpec>, build: SharedFactory) -> Self {
        Self { name, params, build }
    }

    /// The constructor function's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared parameters, in order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// The number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether any parameter has a primitive type.
    pub fn has_primitive_params(&self) -> bool {
        self.params.iter().any(ParamSpec::is_primitive)
    }

    /// The compiled factory bound to this constructor.
    pub fn build(&self) -> SharedFactory {
        SharedFactory::clone(&self.build)
    }
}

/// The full constructor plan contributed for one type.
pub struct TypePlan {
    key: TypeKey,
    constructors: Vec<ConstructorSpec>,
    deferred_key: TypeKey,
    deferred_factory: SharedFactory,
}

impl TypePlan {
    /// Build the plan for type `T`, including its [`Deferred<T>`] wrapper
    /// factory.
    pub fn new<T: Send + Sync + 'static>(constructors: Vec<ConstructorSpec>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            constructors,
            deferred_key: TypeKey::of::<Deferred<T>>(),
            deferred_factory: factory(|container| Ok(Deferred::<T>::new(container))),
        }
    }

    /// The key of the planned type.
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// The planned type's name.
    pub fn type_name(&self) -> &'static str {
        self.key.name()
    }

    /// The declared constructors.
    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    fn deferred_entry(&self) -> (TypeKey, SharedFactory) {
        (
            self.deferred_key.clone(),
            SharedFactory::clone(&self.deferred_factory),
        )
    }
}

static PLANS: Lazy<HashMap<TypeId, TypePlan>> = Lazy::new(|| {
    CONSTRUCTIBLE_TYPES
        .iter()
        .map(|contribute| {
            let plan = contribute();
            (plan.key().id(), plan)
        })
        .collect()
});

static DEFERRED_WRAPPERS: Lazy<HashMap<TypeId, SharedFactory>> = Lazy::new(|| {
    PLANS
        .values()
        .map(|plan| {
            let (key, factory) = plan.deferred_entry();
            (key.id(), factory)
        })
        .collect()
});

/// Look up the contributed plan for a key, if any.
pub fn lookup_plan(key: &TypeKey) -> Option<&'static TypePlan> {
    PLANS.get(&key.id())
}

/// The wrapper factory resolving `Deferred<T>` for a plan-registry type.
pub(crate) fn deferred_factory(key: &TypeKey) -> Option<SharedFactory> {
    DEFERRED_WRAPPERS.get(&key.id()).cloned()
}

/// The default implicit factory for a key: the longest declared constructor.
pub(crate) fn default_factory(key: &TypeKey) -> Result<SharedFactory> {
    let plan = lookup_plan(key).ok_or_else(|| ResolveError::no_constructors(key))?;
    choose_longest(plan.type_name(), plan.constructors()).map(ConstructorSpec::build)
}

/// Select the constructor with the most parameters; a tie at the maximum is
/// an ambiguity error.
pub(crate) fn choose_longest<'a>(
    type_name: &'static str,
    constructors: &'a [ConstructorSpec],
) -> Result<&'a ConstructorSpec> {
    let max = constructors
        .iter()
        .map(ConstructorSpec::arity)
        .max()
        .ok_or(ResolveError::NoConstructors { type_name })?;

    let mut at_max = constructors.iter().filter(|spec| spec.arity() == max);
    let chosen = at_max
        .next()
        .ok_or(ResolveError::NoConstructors { type_name })?;
    let count = 1 + at_max.count();
    if count > 1 {
        return Err(ResolveError::ambiguous_constructor(type_name, max, count));
    }

    Ok(chosen)
}

static PRIMITIVE_TYPES: Lazy<HashSet<TypeId>> = Lazy::new(|| {
    HashSet::from([
        TypeId::of::<u8>(),
        TypeId::of::<u16>(),
        TypeId::of::<u32>(),
        TypeId::of::<u64>(),
        TypeId::of::<u128>(),
        TypeId::of::<usize>(),
        TypeId::of::<i8>(),
        TypeId::of::<i16>(),
        TypeId::of::<i32>(),
        TypeId::of::<i64>(),
        TypeId::of::<i128>(),
        TypeId::of::<isize>(),
        TypeId::of::<f32>(),
        TypeId::of::<f64>(),
        TypeId::of::<bool>(),
        TypeId::of::<char>(),
        TypeId::of::<String>(),
        TypeId::of::<&'static str>(),
        TypeId::of::<Duration>(),
        TypeId::of::<SystemTime>(),
    ])
});

/// Whether a type counts as primitive for constructor-selection purposes.
///
/// Strings and time types are included: they carry no responsibility-specific
/// meaning, so resolving them by convention is almost never appropriate.
pub fn is_primitive(id: TypeId) -> bool {
    PRIMITIVE_TYPES.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &'static str, params: Vec<ParamSpec>) -> ConstructorSpec {
        ConstructorSpec::new(name, params, factory(|_| Ok(0u8)))
    }

    #[test]
    fn longest_constructor_wins() {
        let specs = vec![
            spec("short", vec![]),
            spec(
                "long",
                vec![
                    ParamSpec::required::<String>("a"),
                    ParamSpec::required::<u32>("b"),
                ],
            ),
        ];

        let chosen = choose_longest("Fixture", &specs).unwrap();
        assert_eq!(chosen.name(), "long");
    }

    #[test]
    fn tie_at_the_maximum_is_ambiguous() {
        let specs = vec![
            spec("a", vec![ParamSpec::required::<String>("x")]),
            spec("b", vec![ParamSpec::required::<u32>("y")]),
        ];

        let err = choose_longest("Fixture", &specs).err().unwrap();
        assert!(matches!(
            err,
            ResolveError::AmbiguousConstructor {
                arity: 1,
                count: 2,
                ..
            }
        ));
        assert!(err.to_string().contains("Fixture"));
    }

    #[test]
    fn empty_plan_has_no_constructors() {
        let err = choose_longest("Fixture", &[]).err().unwrap();
        assert!(matches!(err, ResolveError::NoConstructors { .. }));
    }

    #[test]
    fn primitive_classification_covers_strings_and_numbers() {
        assert!(is_primitive(TypeId::of::<u32>()));
        assert!(is_primitive(TypeId::of::<String>()));
        assert!(is_primitive(TypeId::of::<Duration>()));
        assert!(!is_primitive(TypeId::of::<Vec<u8>>()));
    }

    #[test]
    fn param_specs_record_kind_and_primitiveness() {
        let required = ParamSpec::required::<Vec<u8>>("deps");
        assert_eq!(required.kind(), ParamKind::Required);
        assert!(!required.is_primitive());

        let defaulted = ParamSpec::defaulted::<u32>("retries");
        assert_eq!(defaulted.kind(), ParamKind::Defaulted);
        assert!(defaulted.is_primitive());
    }
}
