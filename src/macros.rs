/// Define an inherent `impl` block and derive [`Group`](crate::Group) from it.
///
/// The block is emitted unchanged. Every method in it is recorded in the
/// method table together with its visibility and receiver, so the engine can
/// tell tests, hooks and helpers apart later on.
///
/// ```
/// use testgroup::{T, group};
///
/// #[derive(Default)]
/// struct Counter {
///     hits: u32,
/// }
///
/// group! {
///     impl Counter {
///         pub fn pre_test(&mut self, _: &T) {
///             self.hits += 1;
///         }
///
///         pub fn counts(&self, t: &T) {
///             t.greater(self.hits, 0);
///         }
///
///         fn helper(&self) -> u32 {
///             self.hits
///         }
///     }
/// }
///
/// let report = testgroup::harness::Harness::new("counter")
///     .run(|host| testgroup::run_serial(host, &mut Counter::default()));
/// report.assert_passed();
/// ```
///
/// Only plain `fn` items are allowed in the block. Parameters after the
/// receiver must be written as `name: Type` or `_: Type`. A method removed
/// by `#[cfg(..)]` is left out of the method table as well.
/// Methods with generic parameters, `where` clauses or explicitly named
/// receiver lifetimes are not supported inside the block, put them into a
/// separate `impl`.
#[macro_export]
macro_rules! group {
    (
        $(#[$meta:meta])*
        impl $group:ty {
            $($items:tt)*
        }
    ) => {
        $(#[$meta])*
        impl $group {
            $($items)*
        }

        impl $crate::Group for $group {
            fn methods() -> $crate::MethodSet<Self> {
                let mut methods = $crate::MethodSet::new();
                $crate::__group_methods!(methods; $($items)*);
                methods
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __group_methods {
    ($methods:ident;) => {};

    (
        $methods:ident;
        $(#[$($attr:tt)*])*
        $vis:vis fn $name:ident ($($params:tt)*) $(-> $ret:ty)? $body:block
        $($rest:tt)*
    ) => {
        $crate::__group_cfg!(
            [$([$($attr)*])*]
            $crate::__group_method!($methods; [$vis] $name ($($params)*) $(-> $ret)?);
        );
        $crate::__group_methods!($methods; $($rest)*);
    };
}

/// Repeat the `#[cfg]` attributes of a method on its table entry.
#[doc(hidden)]
#[macro_export]
macro_rules! __group_cfg {
    ([] $($stmt:tt)*) => {
        $($stmt)*
    };

    ([[cfg $($predicate:tt)*] $($attrs:tt)*] $($stmt:tt)*) => {
        #[cfg $($predicate)*]
        {
            $crate::__group_cfg!([$($attrs)*] $($stmt)*);
        }
    };

    ([[$($other:tt)*] $($attrs:tt)*] $($stmt:tt)*) => {
        $crate::__group_cfg!([$($attrs)*] $($stmt)*);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __group_method {
    ($methods:ident; [$($vis:tt)*] $name:ident (&self $(, $arg:tt : $ty:ty)* $(,)?) $(-> $ret:ty)?) => {
        $methods.insert($crate::Method::new(
            stringify!($name),
            $crate::Visibility::from_tokens(stringify!($($vis)*)),
            $crate::Receiver::Shared,
            Self::$name as fn(&Self $(, $ty)*) $(-> $ret)?,
        ));
    };

    ($methods:ident; [$($vis:tt)*] $name:ident (&mut self $(, $arg:tt : $ty:ty)* $(,)?) $(-> $ret:ty)?) => {
        $methods.insert($crate::Method::new(
            stringify!($name),
            $crate::Visibility::from_tokens(stringify!($($vis)*)),
            $crate::Receiver::Exclusive,
            Self::$name as fn(&mut Self $(, $ty)*) $(-> $ret)?,
        ));
    };

    ($methods:ident; [$($vis:tt)*] $name:ident ($(mut)? self $(, $arg:tt : $ty:ty)* $(,)?) $(-> $ret:ty)?) => {
        $methods.insert($crate::Method::new(
            stringify!($name),
            $crate::Visibility::from_tokens(stringify!($($vis)*)),
            $crate::Receiver::Owned,
            Self::$name as fn(Self $(, $ty)*) $(-> $ret)?,
        ));
    };

    // A receiver followed by parameters that are not `name: Type`.
    ($methods:ident; [$($vis:tt)*] $name:ident ($(&)? $(mut)? self $($params:tt)*) $(-> $ret:ty)?) => {
        ::std::compile_error!(::std::concat!(
            "testgroup: parameters of `",
            ::std::stringify!($name),
            "` must be plain identifiers or `_`",
        ));
    };

    // Associated functions without a receiver are never tests.
    ($methods:ident; [$($vis:tt)*] $name:ident ($($params:tt)*) $(-> $ret:ty)?) => {};
}
