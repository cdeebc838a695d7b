//! Running the hooks and tests of a classified group.

use std::{
    any,
    borrow::Cow,
    fmt::{self, Display},
    sync::{PoisonError, RwLock},
};

use crate::{
    Access, Group, Host, Subtest, T,
    classify::{Hook, Invoke, TestCase, TestList, classify},
    unwind,
};

/// Settings of the engine, inherited by nested groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    parallel_scope_name: Cow<'static, str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel_scope_name: Cow::Borrowed("_"),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the scope wrapping the tests of a parallel run.
    ///
    /// Defaults to `_`, so a test `a` of a group run in parallel inside
    /// `outer` ends up as `outer/_/a`.
    pub fn with_parallel_scope_name(self, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            parallel_scope_name: name.into(),
        }
    }

    pub fn parallel_scope_name(&self) -> &str {
        &self.parallel_scope_name
    }

    /// Run the tests of `group` one after another, in name order.
    ///
    /// Each test gets its own child scope of `host`. If the group is not
    /// valid, every problem is logged to `host` and the scope is stopped.
    #[tracing::instrument(level = "debug", skip_all, fields(group = any::type_name::<A::Group>(), mode = %Mode::Serial))]
    pub fn run_serial<'g, A: GroupArg<'g>>(&self, host: &dyn Host, group: A) {
        let runner = Runner::new(self, host, group.into_group_ref());
        runner.run_group(host, Mode::Serial, |host| runner.serial(host));
    }

    /// Run the tests of `group` concurrently.
    ///
    /// The tests are declared to the host inside one child scope named after
    /// [`parallel_scope_name`](Self::parallel_scope_name), `post_group` runs
    /// after every one of them finished.
    #[tracing::instrument(level = "debug", skip_all, fields(group = any::type_name::<A::Group>(), mode = %Mode::Parallel))]
    pub fn run_parallel<'g, A>(&self, host: &dyn Host, group: A)
    where
        A: GroupArg<'g>,
        A::Group: Send + Sync,
    {
        let runner = Runner::new(self, host, group.into_group_ref());
        runner.run_group(host, Mode::Parallel, |host| runner.parallel(host));
    }
}

/// Run the tests of `group` one after another with the default [`Config`].
pub fn run_serial<'g, A: GroupArg<'g>>(host: &dyn Host, group: A) {
    Config::default().run_serial(host, group);
}

/// Run the tests of `group` concurrently with the default [`Config`].
pub fn run_parallel<'g, A>(host: &dyn Host, group: A)
where
    A: GroupArg<'g>,
    A::Group: Send + Sync,
{
    Config::default().run_parallel(host, group);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serial,
    Parallel,
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Serial => f.write_str("serial"),
            Mode::Parallel => f.write_str("parallel"),
        }
    }
}

/// Something the engine accepts as a group: `&G` or `&mut G`.
///
/// Passing `&mut G` allows `&mut self` tests and hooks. In parallel runs
/// those are serialized behind a lock, while `&self` methods may still
/// run at the same time.
pub trait GroupArg<'g> {
    type Group: Group;

    fn into_group_ref(self) -> GroupRef<'g, Self::Group>;
}

impl<'g, G: Group> GroupArg<'g> for &'g G {
    type Group = G;

    fn into_group_ref(self) -> GroupRef<'g, G> {
        GroupRef {
            cell: GroupCell::Shared(self),
        }
    }
}

impl<'g, G: Group> GroupArg<'g> for &'g mut G {
    type Group = G;

    fn into_group_ref(self) -> GroupRef<'g, G> {
        GroupRef {
            cell: GroupCell::Exclusive(RwLock::new(self)),
        }
    }
}

/// A borrowed group, ready to have its methods called.
pub struct GroupRef<'g, G> {
    cell: GroupCell<'g, G>,
}

enum GroupCell<'g, G> {
    Shared(&'g G),
    Exclusive(RwLock<&'g mut G>),
}

impl<G> GroupRef<'_, G> {
    pub fn access(&self) -> Access {
        match self.cell {
            GroupCell::Shared(_) => Access::Shared,
            GroupCell::Exclusive(_) => Access::Exclusive,
        }
    }

    fn call(&self, name: &str, invoke: Invoke<G>, t: &T<'_>) {
        match (&self.cell, invoke) {
            (GroupCell::Shared(group), Invoke::Shared(f)) => f(group, t),
            (GroupCell::Exclusive(lock), Invoke::Shared(f)) => {
                let guard = lock.read().unwrap_or_else(PoisonError::into_inner);
                f(&**guard, t)
            }
            (GroupCell::Exclusive(lock), Invoke::Exclusive(f)) => {
                let mut guard = lock.write().unwrap_or_else(PoisonError::into_inner);
                f(&mut **guard, t)
            }
            (GroupCell::Shared(_), Invoke::Exclusive(_)) => t.fatal(format_args!(
                "testgroup: {}::{name} takes &mut self, pass the group as &mut",
                any::type_name::<G>()
            )),
        }
    }
}

struct Runner<'c, 'g, G> {
    config: &'c Config,
    group: GroupRef<'g, G>,
    tests: TestList<G>,
}

impl<'c, 'g, G: Group> Runner<'c, 'g, G> {
    /// Classify the group, stopping `host` if it is not valid.
    fn new(config: &'c Config, host: &dyn Host, group: GroupRef<'g, G>) -> Self {
        match classify::<G>(group.access()) {
            Ok(tests) => Self {
                config,
                group,
                tests,
            },
            Err(err) => {
                let t = T::new(host, config);
                for diagnostic in err.diagnostics() {
                    tracing::warn!(scope = t.name(), %diagnostic, "invalid group");
                    t.error(diagnostic);
                }
                t.fatal(err)
            }
        }
    }

    fn hook(&self, hook: Hook, t: &T<'_>) {
        let invoke = match hook {
            Hook::PreGroup => self.tests.hooks.pre_group,
            Hook::PostGroup => self.tests.hooks.post_group,
            Hook::PreTest => self.tests.hooks.pre_test,
            Hook::PostTest => self.tests.hooks.post_test,
        };
        if let Some(invoke) = invoke {
            tracing::trace!(scope = t.name(), hook = hook.name(), "calling hook");
            self.group.call(hook.name(), invoke, t);
        }
    }

    /// `pre_group`, then `run_tests`, then `post_group`.
    ///
    /// `post_group` only runs once `pre_group` returned, but it runs no
    /// matter how `run_tests` ends.
    fn run_group(&self, host: &dyn Host, mode: Mode, run_tests: impl FnOnce(&dyn Host)) {
        tracing::debug!(scope = host.name(), %mode, tests = self.tests.len(), "running group");
        let t = T::new(host, self.config);
        self.hook(Hook::PreGroup, &t);
        match self.tests.hooks.post_group {
            Some(_) => unwind::finally(|| run_tests(host), || self.hook(Hook::PostGroup, &t)),
            None => run_tests(host),
        }
    }

    fn serial(&self, host: &dyn Host) {
        for test in &self.tests.tests {
            host.run(test.name, &mut |host: &dyn Host| self.run_test(host, test));
        }
    }

    /// `pre_test`, the test, then `post_test`, all in the scope of the test.
    fn run_test(&self, host: &dyn Host, test: &TestCase<G>) {
        let t = T::new(host, self.config);
        self.hook(Hook::PreTest, &t);
        let body = || {
            tracing::trace!(scope = t.name(), "calling test");
            self.group.call(test.name, test.invoke, &t);
        };
        match self.tests.hooks.post_test {
            Some(_) => unwind::finally(body, || self.hook(Hook::PostTest, &t)),
            None => body(),
        }
    }
}

impl<G: Group + Send + Sync> Runner<'_, '_, G> {
    fn parallel(&self, host: &dyn Host) {
        host.run(self.config.parallel_scope_name(), &mut |scope: &dyn Host| {
            let subtests = self
                .tests
                .tests
                .iter()
                .map(|test| Subtest::new(test.name, move |host: &dyn Host| self.run_test(host, test)))
                .collect();
            scope.run_concurrently(subtests);
        });
    }
}
