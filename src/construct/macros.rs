//! The `constructible!` declaration macro.
//!
//! Contributes constructor plans to
//! [`CONSTRUCTIBLE_TYPES`](super::CONSTRUCTIBLE_TYPES). Parameter grammar:
//!
//! - `name: Ty` — required dependency, resolved recursively.
//! - `name: Ty = expr` — optional parameter with a declared default; the
//!   expression is used verbatim.
//! - `name: Option<Ty>` — optional dependency; resolution failure degrades
//!   to `None`.

/// Declare the constructors of one or more types.
///
/// Each constructor must be an inherent associated function returning
/// `Self`. The longest constructor is selected at resolution time; a tie is
/// an ambiguity error.
///
/// ```
/// use wirecore::{constructible, Container};
///
/// struct Limits {
///     burst: u32,
/// }
///
/// impl Limits {
///     fn with_burst(burst: u32) -> Self {
///         Self { burst }
///     }
/// }
///
/// constructible! {
///     Limits {
///         with_burst(burst: u32 = 64);
///     }
/// }
///
/// let limits = Container::new().resolve::<Limits>().unwrap();
/// assert_eq!(limits.burst, 64);
/// ```
#[macro_export]
macro_rules! constructible {
    ($($ty:ty { $($ctor:ident ( $($params:tt)* );)+ })+) => {
        $(
            const _: () = {
                #[::linkme::distributed_slice($crate::construct::CONSTRUCTIBLE_TYPES)]
                static PLAN: fn() -> $crate::construct::TypePlan = || {
                    $crate::construct::TypePlan::new::<$ty>(::std::vec![
                        $(
                            $crate::construct::ConstructorSpec::new(
                                ::core::stringify!($ctor),
                                $crate::__constructor_params!([] $($params)*),
                                $crate::factory(|c: &$crate::Container| {
                                    ::core::result::Result::Ok(
                                        $crate::__constructor_call!(c; $ty; $ctor; [] $($params)*)
                                    )
                                }),
                            ),
                        )+
                    ])
                };
            };
        )+
    };
}

/// Parameter-metadata muncher for [`constructible!`]. Not public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __constructor_params {
    ([$($acc:tt)*]) => {
        ::std::vec![$($acc)*]
    };
    ([$($acc:tt)*] $name:ident : Option<$pty:ty> $(, $($rest:tt)*)?) => {
        $crate::__constructor_params!(
            [$($acc)* $crate::construct::ParamSpec::optional::<$pty>(::core::stringify!($name)),]
            $($($rest)*)?
        )
    };
    ([$($acc:tt)*] $name:ident : $pty:ty = $default:expr $(, $($rest:tt)*)?) => {
        $crate::__constructor_params!(
            [$($acc)* $crate::construct::ParamSpec::defaulted::<$pty>(::core::stringify!($name)),]
            $($($rest)*)?
        )
    };
    ([$($acc:tt)*] $name:ident : $pty:ty $(, $($rest:tt)*)?) => {
        $crate::__constructor_params!(
            [$($acc)* $crate::construct::ParamSpec::required::<$pty>(::core::stringify!($name)),]
            $($($rest)*)?
        )
    };
}

/// Constructor-invocation muncher for [`constructible!`]. Not public API.
#[doc(hidden)]
#[macro_export]
macro_rules! __constructor_call {
    ($c:ident; $ty:ty; $ctor:ident; [$($acc:tt)*]) => {
        <$ty>::$ctor($($acc)*)
    };
    ($c:ident; $ty:ty; $ctor:ident; [$($acc:tt)*] $name:ident : Option<$pty:ty> $(, $($rest:tt)*)?) => {
        $crate::__constructor_call!(
            $c; $ty; $ctor;
            [$($acc)* $c.resolve::<$pty>().ok(),]
            $($($rest)*)?
        )
    };
    ($c:ident; $ty:ty; $ctor:ident; [$($acc:tt)*] $name:ident : $pty:ty = $default:expr $(, $($rest:tt)*)?) => {
        $crate::__constructor_call!(
            $c; $ty; $ctor;
            [$($acc)* $default,]
            $($($rest)*)?
        )
    };
    ($c:ident; $ty:ty; $ctor:ident; [$($acc:tt)*] $name:ident : $pty:ty $(, $($rest:tt)*)?) => {
        $crate::__constructor_call!(
            $c; $ty; $ctor;
            [$($acc)* $c.resolve::<$pty>()?,]
            $($($rest)*)?
        )
    };
}
