//! Splitting a group's method table into hooks and tests.

use std::{any, fmt::Debug};

use crate::{Group, Host, Method, MethodHandle, Receiver, T};

/// How the engine was handed a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// `&G`, only `&self` methods can be called.
    Shared,

    /// `&mut G`, `&self` and `&mut self` methods can be called.
    Exclusive,
}

/// A problem with one group, found before any of its tests ran.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error(
        "testgroup: mixed method receivers: &{group} has {shared} public methods, but &mut {group} has {exclusive} public methods. \
         You should either pass the group as &mut or make the extra methods private."
    )]
    MixedReceivers {
        group: &'static str,
        shared: usize,
        exclusive: usize,
    },

    #[error("testgroup: {method} is a reserved method but does not have type fn(&self, &T), found {found}")]
    ReservedSignature { method: String, found: &'static str },

    #[error("testgroup: {method} accepts &dyn Host, not &testgroup::T")]
    HostContext { method: String },

    #[error("testgroup: {method} is public but does not have type fn(&self, &T), found {found}")]
    UnexpectedSignature { method: String, found: &'static str },

    #[error(
        "testgroup: no tests found for {group}. \
         Make sure your test methods are public and that their receivers match what you passed to testgroup."
    )]
    NoTests { group: &'static str },
}

/// Every [`Diagnostic`] found for one group.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("testgroup: problems finding test methods for {group} -- see previous failures")]
pub struct ClassifyError {
    group: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl ClassifyError {
    fn new(group: &'static str, diagnostics: Vec<Diagnostic>) -> Self {
        Self { group, diagnostics }
    }

    pub fn group(&self) -> &'static str {
        self.group
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// The lifecycle hooks, found by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Hook {
    PreGroup,
    PostGroup,
    PreTest,
    PostTest,
}

impl Hook {
    const ALL: [Hook; 4] = [Hook::PreGroup, Hook::PostGroup, Hook::PreTest, Hook::PostTest];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Hook::PreGroup => "pre_group",
            Hook::PostGroup => "post_group",
            Hook::PreTest => "pre_test",
            Hook::PostTest => "post_test",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.name() == name)
    }
}

/// A callable hook or test, recovered from its [`MethodHandle`].
pub(crate) enum Invoke<G> {
    Shared(fn(&G, &T<'_>)),
    Exclusive(fn(&mut G, &T<'_>)),
}

impl<G> Clone for Invoke<G> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<G> Copy for Invoke<G> {}

impl<G: 'static> Invoke<G> {
    fn from_handle(handle: &MethodHandle, access: Access) -> Option<Self> {
        if let Some(f) = handle.downcast::<fn(&G, &T<'_>)>() {
            return Some(Invoke::Shared(f));
        }
        match access {
            Access::Exclusive => handle
                .downcast::<fn(&mut G, &T<'_>)>()
                .map(Invoke::Exclusive),
            Access::Shared => None,
        }
    }
}

fn takes_host<G: 'static>(handle: &MethodHandle) -> bool {
    handle.downcast::<fn(&G, &dyn Host)>().is_some()
        || handle.downcast::<fn(&mut G, &dyn Host)>().is_some()
}

pub(crate) struct TestCase<G> {
    pub(crate) name: &'static str,
    pub(crate) invoke: Invoke<G>,
}

pub(crate) struct Hooks<G> {
    pub(crate) pre_group: Option<Invoke<G>>,
    pub(crate) post_group: Option<Invoke<G>>,
    pub(crate) pre_test: Option<Invoke<G>>,
    pub(crate) post_test: Option<Invoke<G>>,
}

impl<G> Default for Hooks<G> {
    fn default() -> Self {
        Self {
            pre_group: None,
            post_group: None,
            pre_test: None,
            post_test: None,
        }
    }
}

impl<G> Hooks<G> {
    fn slot(&mut self, hook: Hook) -> &mut Option<Invoke<G>> {
        match hook {
            Hook::PreGroup => &mut self.pre_group,
            Hook::PostGroup => &mut self.post_group,
            Hook::PreTest => &mut self.pre_test,
            Hook::PostTest => &mut self.post_test,
        }
    }

    fn get(&self, hook: Hook) -> Option<Invoke<G>> {
        match hook {
            Hook::PreGroup => self.pre_group,
            Hook::PostGroup => self.post_group,
            Hook::PreTest => self.pre_test,
            Hook::PostTest => self.post_test,
        }
    }
}

/// The runnable tests of a group, sorted by name, and its hooks.
pub struct TestList<G> {
    pub(crate) tests: Vec<TestCase<G>>,
    pub(crate) hooks: Hooks<G>,
}

impl<G> TestList<G> {
    pub fn names(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.tests.iter().map(|test| test.name)
    }

    /// Names of the hooks the group defines.
    pub fn hooks(&self) -> impl Iterator<Item = &'static str> + '_ {
        Hook::ALL
            .into_iter()
            .filter(|hook| self.hooks.get(*hook).is_some())
            .map(Hook::name)
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}

impl<G> Debug for TestList<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestList")
            .field("tests", &self.names().collect::<Vec<_>>())
            .field("hooks", &self.hooks().collect::<Vec<_>>())
            .finish()
    }
}

/// Find the tests and hooks of `G`.
///
/// Only `pub` methods are looked at. Methods named like a hook must have the
/// test signature and are never tests themselves. Every other public method
/// must be a test, so a typo in a signature does not silently drop a test.
///
/// Every problem found is collected; the group is only usable if there are
/// none and at least one test was found.
pub fn classify<G: Group>(access: Access) -> Result<TestList<G>, ClassifyError> {
    let group = any::type_name::<G>();
    let mut methods: Vec<Method<G>> = G::methods()
        .into_iter()
        .filter(Method::is_public)
        .collect();

    if access == Access::Shared {
        let shared = methods
            .iter()
            .filter(|method| method.receiver() == Receiver::Shared)
            .count();
        let exclusive = methods
            .iter()
            .filter(|method| method.receiver() != Receiver::Owned)
            .count();
        if shared != exclusive {
            let diagnostic = Diagnostic::MixedReceivers {
                group,
                shared,
                exclusive,
            };
            return Err(ClassifyError::new(group, vec![diagnostic]));
        }
    }

    methods.sort_by_key(|method| method.name());

    let mut diagnostics = Vec::new();
    let mut tests = Vec::new();
    let mut hooks = Hooks::default();
    for method in &methods {
        let name = method.name();
        let handle = method.handle();
        let invoke = Invoke::<G>::from_handle(handle, access);
        match (Hook::from_name(name), invoke) {
            (Some(hook), Some(invoke)) => *hooks.slot(hook) = Some(invoke),
            (Some(_), None) => diagnostics.push(Diagnostic::ReservedSignature {
                method: format!("{group}::{name}"),
                found: handle.signature(),
            }),
            (None, Some(invoke)) => tests.push(TestCase { name, invoke }),
            (None, None) if takes_host::<G>(handle) => {
                diagnostics.push(Diagnostic::HostContext {
                    method: format!("{group}::{name}"),
                })
            }
            (None, None) => diagnostics.push(Diagnostic::UnexpectedSignature {
                method: format!("{group}::{name}"),
                found: handle.signature(),
            }),
        }
    }

    if !diagnostics.is_empty() {
        return Err(ClassifyError::new(group, diagnostics));
    }
    if tests.is_empty() {
        return Err(ClassifyError::new(group, vec![Diagnostic::NoTests { group }]));
    }

    let list = TestList { tests, hooks };
    tracing::debug!(group, ?access, ?list, "classified group");
    Ok(list)
}
