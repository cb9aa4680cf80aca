//! Cumulative registration.
//!
//! Ordinarily a registration replaces the previous one. With accumulation
//! enabled, every factory registered for a type is also recorded, and
//! `resolve_all` produces one instance per recorded factory, in
//! registration order.
//!
//! The recording hook lazily registers its own accumulator into the
//! container the first time it fires. That registration re-enters the hook,
//! so a call-stack-scoped re-entrancy guard (thread-local, never global)
//! short-circuits the nested invocation; concurrent resolutions on other
//! threads are unaffected.

use std::cell::Cell;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::container::Container;
use crate::error::{ResolveError, Result};
use crate::key::TypeKey;
use crate::strategy::SharedFactory;

thread_local! {
    static ACCUMULATION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct RecursionGuard;

impl RecursionGuard {
    fn acquire() -> Option<Self> {
        ACCUMULATION_DEPTH.with(|depth| {
            if depth.get() > 0 {
                None
            } else {
                depth.set(depth.get() + 1);
                Some(RecursionGuard)
            }
        })
    }
}

impl Drop for RecursionGuard {
    fn drop(&mut self) {
        ACCUMULATION_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Records every factory registered per type, in order.
#[derive(Default)]
pub struct RegistrationAccumulator {
    factories: DashMap<TypeKey, Vec<SharedFactory>>,
}

impl RegistrationAccumulator {
    fn record(&self, key: TypeKey, factory: SharedFactory) {
        trace!(type_name = key.name(), "recorded cumulative registration");
        self.factories.entry(key).or_default().push(factory);
    }

    fn factories_for(&self, key: &TypeKey) -> Vec<SharedFactory> {
        self.factories
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

/// Cumulative-registration operations for [`Container`].
pub trait CumulativeRegistration {
    /// Start recording registrations.
    ///
    /// Only registrations made after this call are recorded.
    fn accumulate_registrations(&self) -> &Self;

    /// Resolve one instance per recorded factory for `T`, in registration
    /// order. Fails like any unregistered type when accumulation was never
    /// enabled.
    fn resolve_all<T: Send + Sync + 'static>(&self) -> Result<Vec<T>>;
}

impl CumulativeRegistration for Container {
    fn accumulate_registrations(&self) -> &Self {
        let weak = self.downgrade();
        self.on_pre_register(move |key, factory| {
            let Some(_guard) = RecursionGuard::acquire() else {
                return None;
            };
            let Some(container) = weak.upgrade() else {
                return None;
            };

            // The accumulator itself lives in the container, registered
            // lazily from inside the hook; the guard above stops the nested
            // hook invocation this triggers.
            container
                .try_register_single(|_| Ok(Arc::new(RegistrationAccumulator::default())));
            if let Ok(accumulator) = container.resolve::<Arc<RegistrationAccumulator>>() {
                accumulator.record(key.clone(), SharedFactory::clone(factory));
            }
            None
        });
        self
    }

    fn resolve_all<T: Send + Sync + 'static>(&self) -> Result<Vec<T>> {
        let accumulator: Arc<RegistrationAccumulator> = self.resolve()?;
        let key = TypeKey::of::<T>();
        accumulator
            .factories_for(&key)
            .iter()
            .map(|factory| {
                factory(self)?
                    .downcast::<T>()
                    .map(|boxed| *boxed)
                    .map_err(|_| ResolveError::instance_type_mismatch(&key))
            })
            .collect()
    }
}
