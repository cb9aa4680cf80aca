//! Container cloning and override containers.
//!
//! Cloning is a snapshot: the clone gets independent copies of the
//! registration table and singleton index, and the strategy chain function
//! frozen at clone time (both sides can extend their own chains
//! afterwards). Hook lists, transform pipelines, and the failure handler
//! are not carried over. Singleton registrations made before the clone
//! share their cache cell through the copied factory closure, so whichever
//! container materializes first, both observe the same instance.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;

use crate::key::TypeKey;
use crate::strategy::StrategyChain;

use super::{Container, ContainerState};

impl Clone for Container {
    fn clone(&self) -> Self {
        let state = &self.state;

        let resolvers = DashMap::new();
        for entry in state.resolvers.iter() {
            let cell = match entry.value().get() {
                Some(registration) => OnceCell::with_value(registration.clone()),
                None => OnceCell::new(),
            };
            resolvers.insert(entry.key().clone(), Arc::new(cell));
        }

        let singletons = DashMap::new();
        for entry in state.singletons.iter() {
            singletons.insert(entry.key().clone(), Arc::clone(entry.value()));
        }

        debug!(registrations = resolvers.len(), "cloned container");

        Container {
            state: Arc::new(ContainerState {
                resolvers,
                singletons,
                strategies: StrategyChain::from_snapshot(state.strategies.snapshot()),
                pre_register: RwLock::new(Vec::new()),
                post_resolve: RwLock::new(Vec::new()),
                pipelines: DashMap::new(),
                on_failed_resolve: RwLock::new(ContainerState::default_failure_handler()),
            }),
        }
    }
}

impl Container {
    /// Create a clone that falls back to this container for anything it has
    /// not registered itself.
    ///
    /// The override starts from a snapshot but its added strategy consults
    /// the primary's *live* registration table, so registrations made in the
    /// primary after the override was created remain visible. Nothing the
    /// override registers or memoizes ever affects the primary.
    pub fn create_override_container(&self) -> Container {
        let primary = Arc::clone(&self.state);
        let child = self.clone();
        child.add_strategy(move |key: &TypeKey| {
            primary
                .resolvers
                .get(key)
                .and_then(|entry| entry.value().get().map(|reg| reg.factory.clone()))
        });
        child
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn clone_starts_from_the_original_registrations() {
        let original = Container::new();
        original.register(|_| Ok(String::from("from original")));

        let clone = original.clone();
        assert_eq!(clone.resolve::<String>().unwrap(), "from original");
    }

    #[test]
    fn clone_registrations_are_independent() {
        let original = Container::new();
        original.register(|_| Ok(String::from("original")));

        let clone = original.clone();
        clone.register(|_| Ok(String::from("clone")));

        assert_eq!(original.resolve::<String>().unwrap(), "original");
        assert_eq!(clone.resolve::<String>().unwrap(), "clone");
    }

    #[test]
    fn pre_clone_singletons_share_one_cell() {
        let original = Container::new();
        original.register_single(|_| Ok(Arc::new(42u32)));

        let clone = original.clone();

        // Materialized from the clone first, then from the original.
        let from_clone: Arc<u32> = clone.resolve().unwrap();
        let from_original: Arc<u32> = original.resolve().unwrap();
        assert!(Arc::ptr_eq(&from_clone, &from_original));
    }

    #[test]
    fn override_container_sees_later_primary_registrations() {
        let primary = Container::new();
        let overlay = primary.create_override_container();

        primary.register(|_| Ok(String::from("from primary")));
        assert_eq!(overlay.resolve::<String>().unwrap(), "from primary");
    }
}
