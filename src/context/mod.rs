//! The context handed to every hook and test of a group.
//!
//! A [`T`] wraps the [`Host`] scope of exactly one invocation: the group
//! scope for `pre_group`/`post_group`, or the scope of one test for
//! `pre_test`, the test itself and `post_test`. It is created fresh for each of
//! them and never outlives the call it was created for, so state shared
//! between tests has to live on the group.
//!
//! Through [`Deref`] a `T` also offers the non-fatal checks of
//! [`Assertions`]; the fatal variants are available through [`T::require`].

use std::{fmt::Display, ops::Deref};

use crate::{Config, GroupArg, Host};

mod assert;
pub use assert::*;

/// The capability context of a running hook or test.
pub struct T<'h> {
    host: &'h dyn Host,
    config: &'h Config,
    assert: Assertions<'h>,

    /// Checks that stop the current test (or hook) when they fail.
    pub require: Assertions<'h>,
}

impl<'h> T<'h> {
    pub(crate) fn new(host: &'h dyn Host, config: &'h Config) -> Self {
        Self {
            host,
            config,
            assert: Assertions::new(host, false),
            require: Assertions::new(host, true),
        }
    }

    /// The host scope this context reports to.
    pub fn host(&self) -> &'h dyn Host {
        self.host
    }

    /// The engine configuration nested groups inherit.
    pub fn config(&self) -> &'h Config {
        self.config
    }

    /// Full name of the current scope, e.g. `serial/a`.
    pub fn name(&self) -> &str {
        self.host.name()
    }

    pub fn log(&self, message: impl Display) {
        self.host.log(&message.to_string());
    }

    /// Log `message` and mark the scope as failed.
    pub fn error(&self, message: impl Display) {
        self.log(message);
        self.host.fail();
    }

    /// Log `message` and stop the scope as failed.
    pub fn fatal(&self, message: impl Display) -> ! {
        self.log(message);
        self.host.fail_now()
    }

    pub fn fail(&self) {
        self.host.fail();
    }

    pub fn fail_now(&self) -> ! {
        self.host.fail_now()
    }

    pub fn failed(&self) -> bool {
        self.host.failed()
    }

    /// Log `reason` and stop the scope as skipped.
    pub fn skip(&self, reason: impl Display) -> ! {
        self.log(reason);
        self.host.skip_now()
    }

    pub fn skip_now(&self) -> ! {
        self.host.skip_now()
    }

    pub fn skipped(&self) -> bool {
        self.host.skipped()
    }

    /// Run `f` as a named child scope with its own context.
    ///
    /// Returns `true` if the child did not fail.
    pub fn run<F>(&self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&T<'_>),
    {
        let config = self.config;
        self.host
            .run(name, &mut |host: &dyn Host| f(&T::new(host, config)))
    }

    /// Run the tests of `group` one after another below this scope.
    pub fn run_serial<'g, A: GroupArg<'g>>(&self, group: A) {
        self.config.run_serial(self.host, group);
    }

    /// Run the tests of `group` concurrently below this scope.
    pub fn run_parallel<'g, A>(&self, group: A)
    where
        A: GroupArg<'g>,
        A::Group: Send + Sync,
    {
        self.config.run_parallel(self.host, group);
    }
}

impl<'h> Deref for T<'h> {
    type Target = Assertions<'h>;

    fn deref(&self) -> &Self::Target {
        &self.assert
    }
}
