//! Lazily-evaluated resolution handles.

use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;

use super::Container;

/// A handle that defers resolution of `T` until it is asked for.
///
/// `Deferred<T>` is registered automatically beside every explicit
/// registration of `T`, and the container's built-in strategy resolves it
/// for any type with a contributed constructor plan. Each call to
/// [`resolve`](Deferred::resolve) performs a fresh resolution against the
/// live container, so it observes re-registrations made after the handle
/// was created.
///
/// ```
/// use wirecore::{Container, Deferred};
///
/// let container = Container::new();
/// container.register(|_| Ok(String::from("early")));
///
/// let deferred = container.resolve::<Deferred<String>>().unwrap();
/// container.register(|_| Ok(String::from("late")));
///
/// assert_eq!(deferred.resolve().unwrap(), "late");
/// ```
pub struct Deferred<T> {
    container: Container,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Deferred<T> {
    /// Create a handle bound to the given container's live state.
    pub(crate) fn new(container: &Container) -> Self {
        Self {
            container: container.share(),
            _marker: PhantomData,
        }
    }

    /// Resolve a fresh instance of `T`.
    pub fn resolve(&self) -> Result<T> {
        self.container.resolve()
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deferred<{}>", std::any::type_name::<T>())
    }
}
