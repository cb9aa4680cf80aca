//! Declared single-implementation binding.
//!
//! Lets a trait-object handle resolve without explicit registration when
//! exactly one implementation has been declared for it. Declarations are
//! contributed at compile time with [`implementation!`](crate::implementation)
//! — the declaration registry replaces the kind of runtime type scanning
//! Rust cannot do — and indexed by the requested `Arc<dyn Trait>` key on
//! first use.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use linkme::distributed_slice;
use once_cell::sync::Lazy;

use crate::container::Container;
use crate::error::ResolveError;
use crate::key::TypeKey;
use crate::strategy::SharedFactory;

/// One declared interface-to-implementation binding.
pub struct ImplementationEntry {
    /// Key of the requested handle type (`Arc<dyn Trait>`).
    pub interface: fn() -> TypeKey,
    /// The implementing type's name, for diagnostics.
    pub implementation: &'static str,
    /// Factory producing the handle by resolving the implementation.
    pub factory: fn() -> SharedFactory,
}

/// Distributed slice of declared bindings; fed by
/// [`implementation!`](crate::implementation).
#[distributed_slice]
pub static DECLARED_IMPLEMENTATIONS: [ImplementationEntry] = [..];

static BINDINGS: Lazy<HashMap<TypeId, Vec<(&'static str, SharedFactory)>>> = Lazy::new(|| {
    let mut index: HashMap<TypeId, Vec<(&'static str, SharedFactory)>> = HashMap::new();
    for entry in DECLARED_IMPLEMENTATIONS {
        index
            .entry((entry.interface)().id())
            .or_default()
            .push((entry.implementation, (entry.factory)()));
    }
    index
});

fn bindings_for(key: &TypeKey) -> &'static [(&'static str, SharedFactory)] {
    BINDINGS.get(&key.id()).map(Vec::as_slice).unwrap_or(&[])
}

/// Implementation-binding strategy for [`Container`].
pub trait SingleImplementation {
    /// Resolve trait-object handles through their single declared
    /// implementation.
    ///
    /// A handle with more than one declared implementation fails with
    /// [`ResolveError::AmbiguousImplementation`] naming the requested type.
    fn use_single_implementations(&self) -> &Self;
}

impl SingleImplementation for Container {
    fn use_single_implementations(&self) -> &Self {
        self.add_strategy(|key| match bindings_for(key) {
            [] => None,
            [(_, factory)] => Some(SharedFactory::clone(factory)),
            many => {
                let type_name = key.name();
                let count = many.len();
                Some(Arc::new(move |_: &Container| {
                    Err(ResolveError::ambiguous_implementation(type_name, count))
                }))
            }
        })
    }
}

/// Declare that a trait object resolves to a concrete implementation.
///
/// The trait must be `Send + Sync` (usually via supertraits) so the
/// resulting `Arc<dyn Trait>` handle can live in the container. The
/// implementation is resolved through the container, so its own
/// registrations and constructor plan apply.
///
/// ```
/// use std::sync::Arc;
/// use wirecore::extensions::SingleImplementation;
/// use wirecore::{constructible, implementation, Container};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Plain;
///
/// impl Plain {
///     fn new() -> Self {
///         Plain
///     }
/// }
///
/// impl Greeter for Plain {
///     fn greet(&self) -> String {
///         "hi".into()
///     }
/// }
///
/// constructible! {
///     Plain {
///         new();
///     }
/// }
///
/// implementation! {
///     dyn Greeter => Plain;
/// }
///
/// let container = Container::new();
/// container.use_single_implementations();
///
/// let greeter: Arc<dyn Greeter> = container.resolve().unwrap();
/// assert_eq!(greeter.greet(), "hi");
/// ```
#[macro_export]
macro_rules! implementation {
    ($(dyn $iface:path => $impl:ty;)+) => {
        $(
            const _: () = {
                #[::linkme::distributed_slice(
                    $crate::extensions::implementations::DECLARED_IMPLEMENTATIONS
                )]
                static BINDING: $crate::extensions::implementations::ImplementationEntry =
                    $crate::extensions::implementations::ImplementationEntry {
                        interface: || $crate::TypeKey::of::<::std::sync::Arc<dyn $iface>>(),
                        implementation: ::core::stringify!($impl),
                        factory: || {
                            $crate::factory(|c: &$crate::Container| {
                                let concrete: $impl = c.resolve()?;
                                ::core::result::Result::Ok(
                                    ::std::sync::Arc::new(concrete) as ::std::sync::Arc<dyn $iface>
                                )
                            })
                        },
                    };
            };
        )+
    };
}
