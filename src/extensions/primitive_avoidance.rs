//! Primitive-avoidance constructor selection.
//!
//! The default rule picks the longest constructor, which can greedily
//! select one that demands strings or numbers the container has no business
//! resolving by convention. This strategy prefers the longest constructor
//! whose parameters contain no primitive types, and declines when no such
//! constructor exists so the default rules still apply.

use std::sync::Arc;

use crate::construct::{self, ConstructorSpec};
use crate::container::Container;
use crate::error::ResolveError;

/// Constructor-selection preference for [`Container`].
pub trait PrimitiveAvoidance {
    /// Prefer constructors that do not contain primitive-typed parameters.
    ///
    /// Primitive here means numbers, `bool`, `char`, strings, and time
    /// types — values that carry no responsibility-specific meaning.
    fn avoid_primitive_constructors(&self) -> &Self;
}

impl PrimitiveAvoidance for Container {
    fn avoid_primitive_constructors(&self) -> &Self {
        self.add_strategy(|key| {
            let plan = construct::lookup_plan(key)?;
            let eligible: Vec<&ConstructorSpec> = plan
                .constructors()
                .iter()
                .filter(|spec| !spec.has_primitive_params())
                .collect();

            let max = eligible.iter().map(|spec| spec.arity()).max()?;
            let tied = eligible
                .iter()
                .filter(|spec| spec.arity() == max)
                .count();
            if tied > 1 {
                let type_name = plan.type_name();
                return Some(Arc::new(move |_: &Container| {
                    Err(ResolveError::ambiguous_constructor(type_name, max, tied))
                }));
            }

            eligible
                .into_iter()
                .find(|spec| spec.arity() == max)
                .map(ConstructorSpec::build)
        })
    }
}
