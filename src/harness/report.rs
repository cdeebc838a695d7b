use std::{iter, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Passed,
    Failed,
    Skipped,
}

impl Status {
    pub fn passed(&self) -> bool {
        matches!(self, Status::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self, Status::Failed)
    }

    pub fn skipped(&self) -> bool {
        matches!(self, Status::Skipped)
    }
}

/// The outcome of one scope and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Report {
    /// Full name, e.g. `root/_/test`.
    pub name: String,
    pub status: Status,

    /// Whether the scope was started through
    /// [`Host::run_concurrently`](crate::Host::run_concurrently).
    pub parallel: bool,
    pub duration: Duration,
    pub logs: Vec<String>,

    /// Child scopes, in the order they finished.
    pub children: Vec<Report>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    pub fn failed(&self) -> bool {
        self.status.failed()
    }

    pub fn skipped(&self) -> bool {
        self.status.skipped()
    }

    /// This report and all reports below it, depth first.
    pub fn walk(&self) -> impl Iterator<Item = &Report> + '_ {
        let mut stack = vec![self];
        iter::from_fn(move || {
            let report = stack.pop()?;
            stack.extend(report.children.iter().rev());
            Some(report)
        })
    }

    /// Find a report by its full name.
    pub fn find(&self, name: &str) -> Option<&Report> {
        self.walk().find(|report| report.name == name)
    }

    /// Panic with the rendered report unless the scope passed.
    ///
    /// A skipped root scope does not count as passed.
    #[track_caller]
    pub fn assert_passed(&self) {
        if !self.passed() {
            panic!("{} did not pass:\n{self}", self.name);
        }
    }
}
