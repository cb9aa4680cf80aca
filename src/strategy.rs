//! # Strategy Chain
//!
//! Fallback resolvers consulted when a requested type has no explicit
//! registration. Each strategy either declines (`None`) or supplies a
//! factory for the requested key. Strategies compose into a single chain
//! function: by default the most recently added strategy runs first, while
//! fallback strategies run only after every existing strategy has declined.
//!
//! Strategies are pure decision points. They must not mutate container
//! state themselves; the factories they return may register entries as a
//! side effect when invoked (for example, to install a lazily-created
//! singleton on first use).

use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::container::Container;
use crate::error::Result;
use crate::key::TypeKey;

/// A type-erased resolved instance.
pub type BoxedInstance = Box<dyn Any + Send + Sync>;

/// A type-erased shared instance, as held by singleton cache slots.
pub(crate) type SharedInstance = Arc<dyn Any + Send + Sync>;

/// A type-erased factory: given the container, produce an instance.
pub type SharedFactory = Arc<dyn Fn(&Container) -> Result<BoxedInstance> + Send + Sync>;

/// A composed strategy chain: given a key, supply a factory or decline.
pub type StrategyFn = Arc<dyn Fn(&TypeKey) -> Option<SharedFactory> + Send + Sync>;

/// Erase a typed factory into a [`SharedFactory`].
///
/// ```
/// use wirecore::{factory, Container};
///
/// let produce_port = factory(|_c: &Container| Ok(8080u16));
/// let boxed = produce_port(&Container::new()).unwrap();
/// assert_eq!(*boxed.downcast::<u16>().unwrap(), 8080);
/// ```
pub fn factory<T, F>(f: F) -> SharedFactory
where
    T: Send + Sync + 'static,
    F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(move |container| f(container).map(|value| Box::new(value) as BoxedInstance))
}

/// The composed chain of fallback strategies.
///
/// Composition happens under a write lock so concurrent additions cannot
/// corrupt the chain; evaluation clones the chain `Arc` under a read lock
/// and runs it lock-free, so readers always observe either the old or the
/// new chain, never a partially-updated one.
pub(crate) struct StrategyChain {
    chain: RwLock<StrategyFn>,
}

impl StrategyChain {
    pub(crate) fn new() -> Self {
        Self {
            chain: RwLock::new(Arc::new(|_: &TypeKey| None)),
        }
    }

    /// Rebuild a chain from a frozen snapshot (used when cloning a
    /// container).
    pub(crate) fn from_snapshot(chain: StrategyFn) -> Self {
        Self {
            chain: RwLock::new(chain),
        }
    }

    /// The current chain function, frozen at this instant.
    pub(crate) fn snapshot(&self) -> StrategyFn {
        Arc::clone(&self.chain.read())
    }

    /// Compose a new strategy into the chain.
    ///
    /// With `execute_first` the new strategy is consulted before the
    /// existing chain; otherwise it runs only after the chain declines.
    pub(crate) fn add(&self, strategy: StrategyFn, execute_first: bool) {
        let mut guard = self.chain.write();
        let previous = Arc::clone(&guard);
        let composed: StrategyFn = if execute_first {
            Arc::new(move |key: &TypeKey| strategy(key).or_else(|| previous(key)))
        } else {
            Arc::new(move |key: &TypeKey| previous(key).or_else(|| strategy(key)))
        };
        *guard = composed;
    }

    /// Evaluate the chain for a key, returning the first non-declining
    /// factory.
    pub(crate) fn evaluate(&self, key: &TypeKey) -> Option<SharedFactory> {
        let chain = self.snapshot();
        chain(key)
    }
}
