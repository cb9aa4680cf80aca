//! # Container Extensions
//!
//! Add-on behaviors layered onto the container's hook and strategy points
//! without touching the resolution pipeline itself. Each extension is an
//! extension trait implemented for [`Container`](crate::Container):
//!
//! - [`CumulativeRegistration`] — record every registration of a type and
//!   resolve them all as a collection.
//! - [`PrimitiveAvoidance`] — prefer constructors free of primitive
//!   parameters during implicit construction.
//! - [`SingleImplementation`] — bind a trait-object handle to its single
//!   declared implementation.

pub mod cumulative;
pub mod implementations;
pub mod primitive_avoidance;

pub use cumulative::CumulativeRegistration;
pub use implementations::SingleImplementation;
pub use primitive_avoidance::PrimitiveAvoidance;
