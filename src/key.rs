//! Type identity used throughout the container.
//!
//! A [`TypeKey`] pairs a `TypeId` with the type's name so that lookups stay
//! exact-identity while diagnostics and error messages remain readable.
//! Equality and hashing consider only the `TypeId`.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Exact-identity key for a resolvable type.
///
/// An interface handle (e.g. `Arc<dyn Store>`) and a concrete type are
/// tracked as independent keys even when one implements the other.
#[derive(Debug, Clone)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Create the key for type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The full type name, as reported by `std::any::type_name`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this key identifies type `T`.
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
