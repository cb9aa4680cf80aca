//! # Resolution Engine
//!
//! The request path for a type: registered factory → strategy chain →
//! default constructor plan → failure handler. Whatever the fallback
//! produces is offered to the pre-registration hooks and memoized before it
//! is invoked, so every type resolves through the registration table after
//! its first request.
//!
//! The implicit-resolver computation for a type happens at most once even
//! under concurrent first resolution: each table entry is a once-cell, and
//! initializers race on the cell rather than on the table.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::construct;
use crate::error::{ResolveError, Result};
use crate::key::TypeKey;
use crate::strategy::{BoxedInstance, SharedFactory, SharedInstance};

use super::{Container, Registration, Scope};

impl Container {
    /// Resolve an instance of `T`.
    ///
    /// Falls back to the strategy chain and then to `T`'s contributed
    /// constructor plan when no registration exists; the failure handler
    /// shapes the error when every fallback is exhausted.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<T> {
        let key = TypeKey::of::<T>();
        let boxed = self.resolve_erased(&key)?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ResolveError::instance_type_mismatch(&key))
    }

    /// Resolve an instance by runtime key, type-erased.
    pub fn resolve_by_key(&self, key: &TypeKey) -> Result<BoxedInstance> {
        self.resolve_erased(key)
    }

    /// Resolve an instance of `T`, treating failure as absence.
    pub fn resolve_optional<T: Send + Sync + 'static>(&self) -> Option<T> {
        self.resolve().ok()
    }

    pub(crate) fn resolve_erased(&self, key: &TypeKey) -> Result<BoxedInstance> {
        let registration = self.registration_for(key)?;
        trace!(type_name = key.name(), scope = ?registration.scope, "resolving");

        let value = (registration.factory)(self)?;
        let value = match registration.scope {
            // Singleton wrappers apply the transform pipeline once, at
            // materialization, before caching.
            Scope::Singleton => value,
            Scope::Transient => self.apply_pipeline_erased(key, value),
        };
        self.apply_post_resolve(key, value)
    }

    /// Fetch the memoized registration for a key, computing and installing
    /// the implicit resolver on first request.
    fn registration_for(&self, key: &TypeKey) -> Result<Registration> {
        let cell = match self.state.resolvers.get(key) {
            Some(entry) => Arc::clone(entry.value()),
            None => Arc::clone(
                self.state
                    .resolvers
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(OnceCell::new()))
                    .value(),
            ),
        };

        if let Some(registration) = cell.get() {
            return Ok(registration.clone());
        }

        let result = cell
            .get_or_try_init(|| self.build_implicit(key))
            .map(Registration::clone);
        if result.is_err() {
            // A failed attempt must not leave a husk behind: the type stays
            // unregistered for try_register and later resolutions.
            self.state
                .resolvers
                .remove_if(key, |_, cell| cell.get().is_none());
        }
        result
    }

    fn build_implicit(&self, key: &TypeKey) -> Result<Registration> {
        let factory = self.implicit_factory(key)?;
        let factory = self.run_pre_register(key, factory);
        debug!(type_name = key.name(), "memoized implicit resolver");
        Ok(Registration {
            factory,
            scope: Scope::Transient,
        })
    }

    fn implicit_factory(&self, key: &TypeKey) -> Result<SharedFactory> {
        if let Some(factory) = self.state.strategies.evaluate(key) {
            return Ok(factory);
        }

        match construct::default_factory(key) {
            Ok(factory) => Ok(factory),
            Err(err) => {
                let handler = Arc::clone(&self.state.on_failed_resolve.read());
                match handler(key, err) {
                    Some(chosen) => Err(chosen),
                    None => {
                        let key = key.clone();
                        Ok(Arc::new(move |_: &Container| {
                            Err(ResolveError::suppressed(&key))
                        }))
                    }
                }
            }
        }
    }

    /// Fold the one-shot post-resolution hooks over a produced value. A
    /// substituted singleton value also replaces the cache entry in place.
    fn apply_post_resolve(&self, key: &TypeKey, mut value: BoxedInstance) -> Result<BoxedInstance> {
        let hooks = {
            let guard = self.state.post_resolve.read();
            guard.clone()
        };
        if hooks.is_empty() {
            return Ok(value);
        }

        let mut substituted = false;
        for hook in &hooks {
            if let Some(replacement) = hook(key, value.as_ref()) {
                value = replacement;
                substituted = true;
            }
        }
        if !substituted {
            return Ok(value);
        }

        let slot = self
            .state
            .singletons
            .get(key)
            .map(|entry| Arc::clone(entry.value()));
        if let Some(slot) = slot {
            if slot.is_populated() {
                let shared: SharedInstance = Arc::from(value);
                slot.replace(Arc::clone(&shared));
                return slot
                    .clone_shared(&shared)
                    .ok_or_else(|| ResolveError::instance_type_mismatch(key));
            }
        }
        Ok(value)
    }
}
