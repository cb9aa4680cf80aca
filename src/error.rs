//! # Resolution Error Types
//!
//! Structured error handling for the container using thiserror. Every error
//! message names the type that was being resolved, so failures deep in an
//! object graph remain attributable.

use thiserror::Error;

use crate::key::TypeKey;

/// Errors produced while resolving a type from the container.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No registration, no strategy matched, and the type has no usable
    /// constructor plan.
    #[error("cannot construct `{type_name}` unless it is registered first")]
    Unconstructable {
        type_name: &'static str,
        #[source]
        source: Option<Box<ResolveError>>,
    },

    /// The type has a constructor plan but it declares no constructors.
    #[error("no constructors are known for `{type_name}`")]
    NoConstructors { type_name: &'static str },

    /// Two or more constructors tie for the greatest parameter count.
    #[error(
        "`{type_name}` has {count} constructors with {arity} parameters each; \
         constructor selection is ambiguous"
    )]
    AmbiguousConstructor {
        type_name: &'static str,
        arity: usize,
        count: usize,
    },

    /// More than one implementation is declared where exactly one was
    /// expected.
    #[error("{count} implementations are declared for `{type_name}`; expected exactly one")]
    AmbiguousImplementation {
        type_name: &'static str,
        count: usize,
    },

    /// A factory, strategy, or hook produced a value of an unexpected
    /// concrete type.
    #[error("resolving `{type_name}` produced an instance of an unexpected type")]
    InstanceTypeMismatch { type_name: &'static str },

    /// The failure handler declined to surface an error for this type.
    /// Callers using optional resolution observe this as "absent".
    #[error("resolution of `{type_name}` was suppressed by the failure handler")]
    Suppressed { type_name: &'static str },

    /// A user-supplied factory failed.
    #[error("factory for `{type_name}` failed: {message}")]
    Factory {
        type_name: &'static str,
        message: String,
    },
}

impl ResolveError {
    /// Wrap an underlying failure in the default "register it first" error.
    pub fn unconstructable(key: &TypeKey, source: ResolveError) -> Self {
        Self::Unconstructable {
            type_name: key.name(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unconstructable error with no underlying cause.
    pub fn not_registered(key: &TypeKey) -> Self {
        Self::Unconstructable {
            type_name: key.name(),
            source: None,
        }
    }

    /// Create a no-constructors error for the given type.
    pub fn no_constructors(key: &TypeKey) -> Self {
        Self::NoConstructors {
            type_name: key.name(),
        }
    }

    /// Create an ambiguous-constructor error.
    pub fn ambiguous_constructor(type_name: &'static str, arity: usize, count: usize) -> Self {
        Self::AmbiguousConstructor {
            type_name,
            arity,
            count,
        }
    }

    /// Create an ambiguous-implementation error.
    pub fn ambiguous_implementation(type_name: &'static str, count: usize) -> Self {
        Self::AmbiguousImplementation { type_name, count }
    }

    /// Create a type-mismatch error for the given key.
    pub fn instance_type_mismatch(key: &TypeKey) -> Self {
        Self::InstanceTypeMismatch {
            type_name: key.name(),
        }
    }

    /// Create a suppressed-resolution marker for the given key.
    pub fn suppressed(key: &TypeKey) -> Self {
        Self::Suppressed {
            type_name: key.name(),
        }
    }

    /// Create a factory failure error for type `T`.
    pub fn factory<T: 'static>(message: impl Into<String>) -> Self {
        Self::Factory {
            type_name: std::any::type_name::<T>(),
            message: message.into(),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ResolveError>;
