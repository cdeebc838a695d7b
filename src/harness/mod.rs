//! A small in-process [`Host`] for running groups from ordinary `#[test]`s.
//!
//! ```
//! use testgroup::{T, group, harness::harness};
//!
//! struct Strings;
//!
//! group! {
//!     impl Strings {
//!         pub fn empty(&self, t: &T) {
//!             t.is_empty("");
//!         }
//!     }
//! }
//!
//! let report = harness("strings").run(|host| testgroup::run_parallel(host, &Strings));
//! assert!(report.find("strings/_/empty").is_some_and(|r| r.passed()));
//! ```
//!
//! Scopes are named after their parent joined with `/`. Each scope catches
//! unwinds at its boundary, so a failing or panicking test never takes its
//! siblings down.

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, MutexGuard, PoisonError},
    thread,
    time::Instant,
};

use crate::{Host, Stop, Subtest, unwind::payload_as_string};

mod color;
pub use color::*;

mod format;
pub use format::*;

mod pool;

mod report;
pub use report::*;

/// Create a [`Harness`] with a root scope called `name`.
pub fn harness(name: impl Into<String>) -> Harness {
    Harness::new(name)
}

#[derive(Debug, Clone)]
pub struct Harness {
    name: String,
    threads: NonZeroUsize,
}

impl Harness {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            threads: thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }

    /// Maximum number of threads used for one [`Host::run_concurrently`] call.
    pub fn with_thread_count(self, count: NonZeroUsize) -> Self {
        Self {
            threads: count,
            ..self
        }
    }

    /// Run `f` in the root scope and report on it.
    pub fn run(&self, f: impl FnOnce(&dyn Host)) -> Report {
        Node::new(self.name.clone(), self.threads).enter(false, f)
    }
}

#[derive(Debug, Default)]
struct State {
    failed: bool,
    skipped: bool,
    logs: Vec<String>,
    children: Vec<Report>,
    names: HashMap<String, usize>,
}

#[derive(Debug)]
struct Node {
    name: String,
    threads: NonZeroUsize,
    state: Mutex<State>,
}

impl Node {
    fn new(name: String, threads: NonZeroUsize) -> Self {
        Self {
            name,
            threads,
            state: Mutex::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A new child scope with a name unique among its siblings.
    fn child(&self, name: &str) -> Node {
        let name = name.replace(' ', "_");
        let seen = {
            let mut state = self.lock();
            let seen = state.names.entry(name.clone()).or_default();
            *seen += 1;
            *seen - 1
        };
        let name = match seen {
            0 => format!("{}/{name}", self.name),
            n => format!("{}/{name}#{n:02}", self.name),
        };
        Node::new(name, self.threads)
    }

    fn adopt(&self, report: Report) {
        let mut state = self.lock();
        state.failed |= report.failed();
        state.children.push(report);
    }

    fn enter(self, parallel: bool, f: impl FnOnce(&dyn Host)) -> Report {
        tracing::debug!(scope = %self.name, parallel, "scope started");
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| f(&self)));
        let duration = started.elapsed();

        if let Err(payload) = result {
            match Stop::from_payload(&*payload) {
                Some(Stop::Failed) => self.fail(),
                Some(Stop::Skipped) => self.skip(),
                None => {
                    let message = payload_as_string(payload);
                    self.log(&format!("panicked: {message}"));
                    self.fail();
                }
            }
        }

        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        let status = match (state.failed, state.skipped) {
            (true, _) => Status::Failed,
            (false, true) => Status::Skipped,
            (false, false) => Status::Passed,
        };
        tracing::debug!(scope = %self.name, ?status, ?duration, "scope finished");

        Report {
            name: self.name,
            status,
            parallel,
            duration,
            logs: state.logs,
            children: state.children,
        }
    }
}

impl Host for Node {
    fn name(&self) -> &str {
        &self.name
    }

    fn log(&self, message: &str) {
        tracing::trace!(scope = %self.name, text = message, "log");
        self.lock().logs.push(message.to_string());
    }

    fn fail(&self) {
        self.lock().failed = true;
    }

    fn failed(&self) -> bool {
        self.lock().failed
    }

    fn skip(&self) {
        self.lock().skipped = true;
    }

    fn skipped(&self) -> bool {
        self.lock().skipped
    }

    fn run(&self, name: &str, body: &mut dyn FnMut(&dyn Host)) -> bool {
        let report = self.child(name).enter(false, body);
        let passed = !report.failed();
        self.adopt(report);
        passed
    }

    fn run_concurrently<'a>(&self, subtests: Vec<Subtest<'a>>) {
        tracing::debug!(
            scope = %self.name,
            subtests = subtests.len(),
            threads = self.threads.get(),
            "scheduling subtests"
        );
        let jobs: Vec<_> = subtests
            .into_iter()
            .map(|Subtest { name, body }| {
                let child = self.child(&name);
                move || child.enter(true, body)
            })
            .collect();
        for report in pool::run_all(self.threads, jobs) {
            self.adopt(report);
        }
    }
}
