#![allow(clippy::doc_markdown)] // Allow technical terms in docs without backticks
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Wirecore
//!
//! An embeddable, convention-driven dependency-injection core: ask for a
//! type and the container produces an instance, either through an explicitly
//! registered factory or by consulting its fallback strategies and the
//! type's declared constructors, resolving arguments recursively until the
//! graph is built.
//!
//! ## Overview
//!
//! Resolution is layered. A request checks the registration table first,
//! then the strategy chain (most recently added strategy first), then the
//! requested type's contributed constructor plan — longest constructor
//! wins, ties are an error. Whatever the fallback produces is memoized, so
//! every type resolves through the table after its first request.
//! Registrations are last-write-wins; singletons are cached lazily and
//! reset when their type is re-registered.
//!
//! Rust has no runtime reflection, so constructor metadata is contributed
//! at compile time with the [`constructible!`] macro and looked up by
//! `TypeId` at resolution time, preserving the runtime-discovery behavior
//! a reflective container would have.
//!
//! ## Module Organization
//!
//! - [`container`] - The container: registration, resolution, cloning,
//!   override containers, hooks, and transform pipelines
//! - [`construct`] - Constructor-plan registry and selection rules
//! - [`strategy`] - Fallback strategy chain and factory erasure
//! - [`extensions`] - Cumulative registration, primitive avoidance, and
//!   single-implementation binding
//! - [`error`] - Structured resolution errors
//! - [`key`] - Exact type identity
//!
//! ## Quick Start
//!
//! ```
//! use wirecore::{constructible, Container};
//!
//! struct Config {
//!     url: String,
//! }
//!
//! impl Config {
//!     fn new(url: String) -> Self {
//!         Self { url }
//!     }
//! }
//!
//! constructible! {
//!     Config {
//!         new(url: String);
//!     }
//! }
//!
//! let container = Container::new();
//! container.register(|_| Ok(String::from("postgres://localhost")));
//!
//! // Config is never registered; its constructor plan builds it.
//! let config = container.resolve::<Config>().unwrap();
//! assert_eq!(config.url, "postgres://localhost");
//! ```
//!
//! ## Thread Safety
//!
//! The container is a passive shared object: registration and resolution
//! are safe from any thread, implicit factory computation happens at most
//! once per type, and strategy-chain updates are atomic with respect to
//! readers. No operation suspends or yields.

pub mod construct;
pub mod container;
pub mod error;
pub mod extensions;
pub mod key;
pub mod strategy;

pub use container::{
    Container, Deferred, FailureHandler, PostResolveHook, PreRegisterHook, RegistrationEntry,
    Scope,
};
pub use error::{ResolveError, Result};
pub use key::TypeKey;
pub use strategy::{factory, BoxedInstance, SharedFactory, StrategyFn};
