use std::{
    any::{self, Any},
    fmt::Debug,
    marker::PhantomData,
};

/// A type whose methods form a group of tests.
///
/// The only requirement is a method table. It is usually generated by the
/// [`group!`](crate::group!) macro from a plain `impl` block, but it can be
/// written by hand as well:
///
/// ```
/// use testgroup::{Group, Method, MethodSet, Receiver, T, Visibility};
///
/// struct Numbers;
///
/// impl Numbers {
///     pub fn adds(&self, t: &T) {
///         t.equal(4, 2 + 2);
///     }
/// }
///
/// impl Group for Numbers {
///     fn methods() -> MethodSet<Self> {
///         MethodSet::new().with(Method::new(
///             "adds",
///             Visibility::Public,
///             Receiver::Shared,
///             Self::adds as fn(&Self, &T),
///         ))
///     }
/// }
/// ```
pub trait Group: Sized + 'static {
    fn methods() -> MethodSet<Self>;
}

/// How a method takes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// `&self`
    Shared,

    /// `&mut self`
    Exclusive,

    /// `self`
    Owned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Read the visibility qualifier of a method as written in source.
    ///
    /// Only a plain `pub` is public, restricted forms like `pub(crate)` are not.
    pub fn from_tokens(tokens: &str) -> Self {
        match tokens.trim() {
            "pub" => Self::Public,
            _ => Self::Private,
        }
    }
}

/// A type erased function pointer together with its printable signature.
pub struct MethodHandle {
    function: Box<dyn Any + Send + Sync>,
    signature: &'static str,
}

impl Debug for MethodHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MethodHandle")
            .field(&self.signature)
            .finish()
    }
}

impl MethodHandle {
    pub fn new<F: Any + Send + Sync>(function: F) -> Self {
        Self {
            function: Box::new(function),
            signature: any::type_name::<F>(),
        }
    }

    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub(crate) fn downcast<F: Any + Copy>(&self) -> Option<F> {
        self.function.downcast_ref::<F>().copied()
    }
}

/// One entry of a group's method table.
#[derive(Debug)]
pub struct Method<G> {
    name: &'static str,
    visibility: Visibility,
    receiver: Receiver,
    handle: MethodHandle,
    _group: PhantomData<fn() -> G>,
}

impl<G> Method<G> {
    /// Describe a method of `G`.
    ///
    /// `function` is the method cast to a function pointer, with the receiver
    /// as first argument, e.g. `G::check as fn(&G, &T)`.
    pub fn new<F: Any + Send + Sync>(
        name: &'static str,
        visibility: Visibility,
        receiver: Receiver,
        function: F,
    ) -> Self {
        Self {
            name,
            visibility,
            receiver,
            handle: MethodHandle::new(function),
            _group: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }

    pub fn handle(&self) -> &MethodHandle {
        &self.handle
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// The method table of a [`Group`].
#[derive(Debug)]
pub struct MethodSet<G>(Vec<Method<G>>);

impl<G> Default for MethodSet<G> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<G> MethodSet<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: Method<G>) {
        self.0.push(method);
    }

    pub fn with(mut self, method: Method<G>) -> Self {
        self.insert(method);
        self
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Method<G>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<G> FromIterator<Method<G>> for MethodSet<G> {
    fn from_iter<I: IntoIterator<Item = Method<G>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<G> IntoIterator for MethodSet<G> {
    type Item = Method<G>;
    type IntoIter = std::vec::IntoIter<Method<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
