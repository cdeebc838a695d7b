//! The boundary between testgroup and the test runner hosting it.
//!
//! testgroup never decides on its own how a test is named, how results are
//! aggregated, or how concurrently declared tests are scheduled. All of that
//! is the job of a [`Host`]: a handle to one named scope of a test run.
//!
//! The engine talks to the host only through this trait, so groups can run
//! under any runner that implements it. The crate ships one implementation in
//! [`harness`](crate::harness), which is what the tests of this crate use.
//!
//! Stopping a scope early (a fatal failure or a skip) is done by unwinding
//! with a [`Stop`] payload. A host must catch unwinds at every scope boundary
//! it creates and translate them into a scope status.

use std::{any::Any, fmt::Debug, panic};

/// Unwind payload used to leave a scope on purpose.
///
/// Raised by [`Host::fail_now`] and [`Host::skip_now`] through
/// [`resume_unwind`](std::panic::resume_unwind), which does not invoke the
/// panic hook. Hosts inspect caught payloads with [`Stop::from_payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    /// The scope failed and must not continue.
    Failed,

    /// The scope was skipped and must not continue.
    Skipped,
}

impl Stop {
    /// Unwind out of the current scope with this payload.
    pub fn unwind(self) -> ! {
        panic::resume_unwind(Box::new(self))
    }

    /// Return the [`Stop`] carried by a caught unwind payload, if any.
    ///
    /// Any other payload is an ordinary panic.
    pub fn from_payload(payload: &(dyn Any + Send)) -> Option<Stop> {
        payload.downcast_ref::<Stop>().copied()
    }
}

/// A named child scope declared to [`Host::run_concurrently`].
pub struct Subtest<'a> {
    pub name: String,
    pub body: Box<dyn FnOnce(&dyn Host) + Send + 'a>,
}

impl<'a> Subtest<'a> {
    pub fn new(name: impl Into<String>, body: impl FnOnce(&dyn Host) + Send + 'a) -> Self {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }
}

impl Debug for Subtest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subtest")
            .field("name", &self.name)
            .field("body", &"...")
            .finish()
    }
}

/// A handle to one named scope of a test run.
///
/// A host is shared between the thread running a scope and, in parallel mode,
/// the threads running its children, so it has to be [`Sync`].
pub trait Host: Sync {
    /// The full name of this scope, including the names of its parents.
    fn name(&self) -> &str;

    /// Attach a diagnostic message to this scope.
    fn log(&self, message: &str);

    /// Mark this scope as failed and keep running.
    fn fail(&self);

    /// Whether this scope (or one of its finished children) failed.
    fn failed(&self) -> bool;

    /// Mark this scope as failed and stop it.
    ///
    /// The default implementation calls [`fail`](Self::fail) and unwinds with
    /// [`Stop::Failed`].
    fn fail_now(&self) -> ! {
        self.fail();
        Stop::Failed.unwind()
    }

    /// Mark this scope as skipped without stopping it.
    fn skip(&self);

    /// Mark this scope as skipped and stop it.
    ///
    /// The default implementation calls [`skip`](Self::skip) and unwinds with
    /// [`Stop::Skipped`].
    fn skip_now(&self) -> ! {
        self.skip();
        Stop::Skipped.unwind()
    }

    /// Whether this scope was skipped.
    fn skipped(&self) -> bool;

    /// Run `body` in a new child scope called `name` and wait for it.
    ///
    /// Returns `true` if the child did not fail. A stopped or panicking child
    /// must never unwind into the caller.
    fn run(&self, name: &str, body: &mut dyn FnMut(&dyn Host)) -> bool;

    /// Run every subtest in its own child scope, possibly at the same time.
    ///
    /// This is the only synchronization point testgroup relies on: the call
    /// must not return before every subtest finished. A failure in one
    /// subtest must not stop its siblings.
    fn run_concurrently<'a>(&self, subtests: Vec<Subtest<'a>>);
}
