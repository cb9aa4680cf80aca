//! # Container
//!
//! The central registry and resolver. A [`Container`] owns a registration
//! table (type → factory), a singleton slot index, a strategy chain of
//! fallback resolvers, and the extension hook lists.
//!
//! ## Key behaviors
//!
//! - **Registration is last-write-wins** and never fails; re-registering a
//!   type discards its standing singleton state.
//! - **Resolution is layered**: registered factory → strategy chain →
//!   default constructor plan → failure handler. Whatever the fallback
//!   produces is memoized, so a type resolved once through a strategy is
//!   registered from then on.
//! - **Thread safety**: the table and caches are sharded concurrent maps;
//!   implicit factory computation happens at most once per type even under
//!   concurrent first resolution.
//!
//! ## Usage
//!
//! ```
//! use wirecore::Container;
//!
//! let container = Container::new();
//! container.register(|_| Ok(String::from("hello")));
//!
//! assert_eq!(container.resolve::<String>().unwrap(), "hello");
//! ```

mod deferred;
mod lifetime;
mod pipeline;
mod resolve;
mod singleton;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::key::TypeKey;
use crate::strategy::{factory, BoxedInstance, SharedFactory, StrategyChain};

pub use deferred::Deferred;

use pipeline::TransformPipeline;
use singleton::SingletonSlot;

/// Lifetime of a registration's resolved instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// A new instance on every resolution.
    Transient,
    /// One lazily-materialized instance reused for the container's lifetime.
    Singleton,
}

/// A pre-registration interception hook.
///
/// Invoked once per registration — explicit or implicitly memoized — with
/// the factory about to be installed. Returning a factory substitutes it.
pub type PreRegisterHook =
    dyn Fn(&TypeKey, &SharedFactory) -> Option<SharedFactory> + Send + Sync;

/// A post-resolution hook, invoked on every resolve with the produced
/// instance. Returning a value substitutes the result.
pub type PostResolveHook =
    dyn Fn(&TypeKey, &(dyn Any + Send + Sync)) -> Option<BoxedInstance> + Send + Sync;

/// Chooses the error surfaced when implicit resolution fails. Returning
/// `None` suppresses the failure; optional-resolution callers then observe
/// an absent value.
pub type FailureHandler = dyn Fn(&TypeKey, ResolveError) -> Option<ResolveError> + Send + Sync;

/// A memoized registration table entry.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) factory: SharedFactory,
    pub(crate) scope: Scope,
}

pub(crate) struct ContainerState {
    pub(crate) resolvers: DashMap<TypeKey, Arc<OnceCell<Registration>>>,
    pub(crate) singletons: DashMap<TypeKey, Arc<SingletonSlot>>,
    pub(crate) strategies: StrategyChain,
    pub(crate) pre_register: RwLock<Vec<Arc<PreRegisterHook>>>,
    pub(crate) post_resolve: RwLock<Vec<Arc<PostResolveHook>>>,
    pub(crate) pipelines: DashMap<TypeKey, Arc<TransformPipeline>>,
    pub(crate) on_failed_resolve: RwLock<Arc<FailureHandler>>,
}

impl ContainerState {
    pub(crate) fn default_failure_handler() -> Arc<FailureHandler> {
        Arc::new(|key, err| Some(ResolveError::unconstructable(key, err)))
    }

    fn empty() -> Self {
        Self {
            resolvers: DashMap::new(),
            singletons: DashMap::new(),
            strategies: StrategyChain::new(),
            pre_register: RwLock::new(Vec::new()),
            post_resolve: RwLock::new(Vec::new()),
            pipelines: DashMap::new(),
            on_failed_resolve: RwLock::new(Self::default_failure_handler()),
        }
    }
}

/// An embeddable dependency-injection container.
///
/// Cheap handles to the same underlying state are used internally (by
/// [`Deferred`] and the self-registration); the public [`Clone`] impl is the
/// snapshot operation that backs selective re-registration and override
/// containers.
pub struct Container {
    pub(crate) state: Arc<ContainerState>,
}

/// A summary of one registration table entry.
pub struct RegistrationEntry {
    key: TypeKey,
    scope: Scope,
    factory: SharedFactory,
}

impl RegistrationEntry {
    /// The registered type's key.
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// The registration's scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// The installed factory.
    pub fn factory(&self) -> SharedFactory {
        SharedFactory::clone(&self.factory)
    }
}

impl Container {
    /// Create a container with the built-in conventions installed: the
    /// container resolves itself, and `Deferred<T>` resolves for any type
    /// with a contributed constructor plan.
    pub fn new() -> Self {
        let container = Container {
            state: Arc::new(ContainerState::empty()),
        };
        container.register(|c| Ok(c.share()));
        container.add_strategy(crate::construct::deferred_factory);
        container
    }

    /// Register a factory for `T`, replacing any existing registration.
    ///
    /// Also installs a [`Deferred<T>`] factory and discards any standing
    /// singleton state for `T`.
    pub fn register<T, F>(&self, f: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.install(TypeKey::of::<T>(), factory(f), Scope::Transient, None);
        self.install_deferred::<T>();
        self
    }

    /// Register a singleton factory for `T`.
    ///
    /// The factory runs on first resolution; the instance is cached for the
    /// container's lifetime and cloned out to callers (use `Arc<T>` for
    /// shared-reference semantics). Re-registering starts a fresh singleton
    /// lifecycle.
    pub fn register_single<T, F>(&self, f: F) -> &Self
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        let slot = SingletonSlot::for_type::<T>();
        let wrapper = {
            let slot = Arc::clone(&slot);
            move |c: &Container| -> Result<T> {
                if let Some(existing) = slot.current::<T>()? {
                    return Ok(existing);
                }
                let value = f(c)?;
                let value = c.apply_pipeline_typed::<T>(value)?;
                slot.store_first(value)
            }
        };
        self.install(TypeKey::of::<T>(), factory(wrapper), Scope::Singleton, Some(slot));
        self.install_deferred::<T>();
        self
    }

    /// Register a factory for `T` only if no entry exists.
    ///
    /// An entry memoized by a strategy-driven or default resolution counts
    /// as existing.
    pub fn try_register<T, F>(&self, f: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        if !self.contains_key(&TypeKey::of::<T>()) {
            self.register(f);
        }
        self
    }

    /// Register a singleton factory for `T` only if no entry exists.
    pub fn try_register_single<T, F>(&self, f: F) -> &Self
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        if !self.contains_key(&TypeKey::of::<T>()) {
            self.register_single(f);
        }
        self
    }

    /// Register a type-erased factory under an explicit key.
    ///
    /// The erased surface for callers without compile-time types. Unlike
    /// [`register`](Self::register) it cannot install a `Deferred` wrapper.
    pub fn register_erased(&self, key: TypeKey, factory: SharedFactory) -> &Self {
        self.install(key, factory, Scope::Transient, None);
        self
    }

    /// Register a type-erased factory only if no entry exists for the key.
    pub fn try_register_erased(&self, key: TypeKey, factory: SharedFactory) -> &Self {
        if !self.contains_key(&key) {
            self.register_erased(key, factory);
        }
        self
    }

    /// Add a fallback strategy, consulted before existing strategies.
    pub fn add_strategy<S>(&self, strategy: S) -> &Self
    where
        S: Fn(&TypeKey) -> Option<SharedFactory> + Send + Sync + 'static,
    {
        self.state.strategies.add(Arc::new(strategy), true);
        self
    }

    /// Add a fallback strategy, consulted only after every existing strategy
    /// has declined.
    pub fn add_fallback_strategy<S>(&self, strategy: S) -> &Self
    where
        S: Fn(&TypeKey) -> Option<SharedFactory> + Send + Sync + 'static,
    {
        self.state.strategies.add(Arc::new(strategy), false);
        self
    }

    /// Add a pre-registration interception hook.
    ///
    /// Hooks run in addition order; each sees the previous hook's
    /// substitution.
    pub fn on_pre_register<H>(&self, hook: H) -> &Self
    where
        H: Fn(&TypeKey, &SharedFactory) -> Option<SharedFactory> + Send + Sync + 'static,
    {
        self.state.pre_register.write().push(Arc::new(hook));
        self
    }

    /// Add a post-resolution hook, invoked on every resolve.
    ///
    /// When a hook substitutes the value of a materialized singleton, the
    /// cache entry is updated in place so future hits return the
    /// substituted value.
    pub fn on_post_resolve<H>(&self, hook: H) -> &Self
    where
        H: Fn(&TypeKey, &(dyn Any + Send + Sync)) -> Option<BoxedInstance> + Send + Sync + 'static,
    {
        self.state.post_resolve.write().push(Arc::new(hook));
        self
    }

    /// Replace the failure handler consulted when implicit resolution fails.
    pub fn on_failed_resolve<H>(&self, handler: H) -> &Self
    where
        H: Fn(&TypeKey, ResolveError) -> Option<ResolveError> + Send + Sync + 'static,
    {
        *self.state.on_failed_resolve.write() = Arc::new(handler);
        self
    }

    /// Whether an entry exists for `T`, explicit or memoized.
    pub fn is_registered<T: Send + Sync + 'static>(&self) -> bool {
        self.contains_key(&TypeKey::of::<T>())
    }

    /// Whether an entry exists for the key.
    pub fn contains_key(&self, key: &TypeKey) -> bool {
        self.state.resolvers.contains_key(key)
    }

    /// Snapshot the current registration table for introspection.
    pub fn registrations(&self) -> Vec<RegistrationEntry> {
        self.state
            .resolvers
            .iter()
            .filter_map(|entry| {
                entry.value().get().map(|registration| RegistrationEntry {
                    key: entry.key().clone(),
                    scope: registration.scope,
                    factory: SharedFactory::clone(&registration.factory),
                })
            })
            .collect()
    }

    /// A live handle to the same underlying container state.
    pub(crate) fn share(&self) -> Container {
        Container {
            state: Arc::clone(&self.state),
        }
    }

    /// A weak handle, for hooks that must not keep the container alive.
    pub(crate) fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            state: Arc::downgrade(&self.state),
        }
    }

    fn install(
        &self,
        key: TypeKey,
        factory: SharedFactory,
        scope: Scope,
        slot: Option<Arc<SingletonSlot>>,
    ) {
        let factory = self.run_pre_register(&key, factory);
        match slot {
            Some(slot) => {
                self.state.singletons.insert(key.clone(), slot);
            }
            None => {
                self.state.singletons.remove(&key);
            }
        }
        debug!(type_name = key.name(), ?scope, "registered factory");
        self.state.resolvers.insert(
            key,
            Arc::new(OnceCell::with_value(Registration { factory, scope })),
        );
    }

    /// Install the `Deferred<T>` wrapper beside a registration of `T`.
    /// Wrapper installs bypass the pre-registration hooks.
    fn install_deferred<T: Send + Sync + 'static>(&self) {
        let key = TypeKey::of::<Deferred<T>>();
        let wrapper: SharedFactory = factory(|c: &Container| Ok(Deferred::<T>::new(c)));
        self.state.resolvers.insert(
            key,
            Arc::new(OnceCell::with_value(Registration {
                factory: wrapper,
                scope: Scope::Transient,
            })),
        );
    }

    pub(crate) fn run_pre_register(&self, key: &TypeKey, factory: SharedFactory) -> SharedFactory {
        let hooks: Vec<Arc<PreRegisterHook>> = self.state.pre_register.read().clone();
        hooks.iter().fold(factory, |current, hook| {
            match hook(key, &current) {
                Some(substituted) => substituted,
                None => current,
            }
        })
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("registrations", &self.state.resolvers.len())
            .field("singletons", &self.state.singletons.len())
            .finish()
    }
}

/// A weak container handle used by extension hooks.
pub(crate) struct WeakContainer {
    state: Weak<ContainerState>,
}

impl WeakContainer {
    pub(crate) fn upgrade(&self) -> Option<Container> {
        self.state.upgrade().map(|state| Container { state })
    }
}
