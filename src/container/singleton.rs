//! Singleton cache slots.
//!
//! A slot is created by `register_single` and captured by the factory
//! closure it installs. Because the closure owns the slot, a cloned
//! container's copied factory keeps pointing at the same cell: a singleton
//! registered before cloning materializes to the same instance no matter
//! which container resolves it first. A fresh registration creates a fresh
//! slot, which is what resets the singleton lifecycle.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{ResolveError, Result};
use crate::key::TypeKey;
use crate::strategy::{BoxedInstance, SharedInstance};

pub(crate) struct SingletonSlot {
    value: RwLock<Option<SharedInstance>>,
    clone_value: fn(&SharedInstance) -> Option<BoxedInstance>,
}

fn clone_erased<T: Clone + Send + Sync + 'static>(
    value: &SharedInstance,
) -> Option<BoxedInstance> {
    value
        .downcast_ref::<T>()
        .map(|concrete| Box::new(concrete.clone()) as BoxedInstance)
}

impl SingletonSlot {
    pub(crate) fn for_type<T: Clone + Send + Sync + 'static>() -> Arc<Self> {
        Arc::new(Self {
            value: RwLock::new(None),
            clone_value: clone_erased::<T>,
        })
    }

    /// The materialized value, if any.
    pub(crate) fn current<T: Clone + Send + Sync + 'static>(&self) -> Result<Option<T>> {
        match self.value.read().as_ref() {
            None => Ok(None),
            Some(shared) => shared
                .downcast_ref::<T>()
                .cloned()
                .map(Some)
                .ok_or_else(|| ResolveError::instance_type_mismatch(&TypeKey::of::<T>())),
        }
    }

    /// Store a freshly materialized value unless another thread won the
    /// race; returns a clone of whichever value is cached.
    pub(crate) fn store_first<T: Clone + Send + Sync + 'static>(&self, value: T) -> Result<T> {
        let mut guard = self.value.write();
        let shared = guard.get_or_insert_with(|| Arc::new(value) as SharedInstance);
        shared
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ResolveError::instance_type_mismatch(&TypeKey::of::<T>()))
    }

    pub(crate) fn is_populated(&self) -> bool {
        self.value.read().is_some()
    }

    /// Overwrite the cached value (post-resolution hook substitution).
    pub(crate) fn replace(&self, value: SharedInstance) {
        *self.value.write() = Some(value);
    }

    /// Clone a shared value using the slot's monomorphized clone function.
    pub(crate) fn clone_shared(&self, value: &SharedInstance) -> Option<BoxedInstance> {
        (self.clone_value)(value)
    }
}
