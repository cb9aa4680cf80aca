//! Per-type post-creation transform pipelines.
//!
//! `after_creating` queues transforms for a type; the queue folds over the
//! untransformed instance in registration order. Transient registrations
//! reapply the whole queue on every resolve; singleton registrations apply
//! it exactly once, when the instance is materialized, and the transformed
//! result is what the slot caches. A pipeline attaches whether or not the
//! type is registered yet and keeps applying across re-registrations.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::key::TypeKey;
use crate::strategy::BoxedInstance;

use super::Container;

type ErasedTransform = Arc<dyn Fn(&Container, BoxedInstance) -> BoxedInstance + Send + Sync>;

#[derive(Default)]
pub(crate) struct TransformPipeline {
    transforms: RwLock<Vec<ErasedTransform>>,
}

impl TransformPipeline {
    fn push(&self, transform: ErasedTransform) {
        self.transforms.write().push(transform);
    }

    fn apply(&self, container: &Container, value: BoxedInstance) -> BoxedInstance {
        let transforms: Vec<ErasedTransform> = self.transforms.read().clone();
        transforms
            .into_iter()
            .fold(value, |current, transform| transform(container, current))
    }
}

impl Container {
    /// Queue a transform applied to every created instance of `T`.
    ///
    /// Transforms fold in the order they were added. For singleton-scoped
    /// registrations the queue runs exactly once per materialization and the
    /// transformed value is cached; for transients it runs on every resolve.
    ///
    /// ```
    /// use wirecore::Container;
    ///
    /// let container = Container::new();
    /// container.register(|_| Ok(10u32));
    /// container.after_creating::<u32>(|_, value| value + 1);
    ///
    /// assert_eq!(container.resolve::<u32>().unwrap(), 11);
    /// ```
    pub fn after_creating<T>(
        &self,
        transform: impl Fn(&Container, T) -> T + Send + Sync + 'static,
    ) -> &Self
    where
        T: Send + Sync + 'static,
    {
        let key = TypeKey::of::<T>();
        let pipeline = Arc::clone(
            self.state
                .pipelines
                .entry(key.clone())
                .or_default()
                .value(),
        );
        pipeline.push(Arc::new(move |container, boxed| {
            match boxed.downcast::<T>() {
                Ok(value) => Box::new(transform(container, *value)) as BoxedInstance,
                // Precise type matching: a value of another type passes
                // through untouched.
                Err(other) => other,
            }
        }));
        debug!(type_name = key.name(), "queued post-creation transform");
        self
    }

    /// Fold `T`'s pipeline over an owned value (singleton materialization).
    pub(crate) fn apply_pipeline_typed<T: Send + Sync + 'static>(&self, value: T) -> Result<T> {
        let key = TypeKey::of::<T>();
        let boxed = self.apply_pipeline_erased(&key, Box::new(value));
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| ResolveError::instance_type_mismatch(&key))
    }

    /// Fold a key's pipeline over a type-erased value (transient resolves).
    pub(crate) fn apply_pipeline_erased(
        &self,
        key: &TypeKey,
        value: BoxedInstance,
    ) -> BoxedInstance {
        let pipeline = self
            .state
            .pipelines
            .get(key)
            .map(|entry| Arc::clone(entry.value()));
        match pipeline {
            Some(pipeline) => pipeline.apply(self, value),
            None => value,
        }
    }
}
