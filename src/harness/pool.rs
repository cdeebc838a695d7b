use std::{
    cmp,
    num::NonZeroUsize,
    thread::{self, Scope, ScopedJoinHandle},
};

use super::Report;

/// Run every job on at most `threads` scoped workers.
///
/// Reports are returned in the order the jobs finished.
pub(super) fn run_all<'e, J>(threads: NonZeroUsize, jobs: Vec<J>) -> Vec<Report>
where
    J: FnOnce() -> Report + Send + 'e,
{
    if jobs.is_empty() {
        return Vec::new();
    }
    let worker_count =
        NonZeroUsize::new(cmp::min(threads.get(), jobs.len())).unwrap_or(NonZeroUsize::MIN);
    thread::scope(|scope| Pool::new(worker_count, jobs.into_iter(), scope).collect())
}

struct Pool<'s, I, J> {
    source: I,
    push_job: crossbeam_channel::Sender<Option<J>>,
    wait_report: crossbeam_channel::Receiver<Report>,
    _workers: Vec<ScopedJoinHandle<'s, ()>>,
}

impl<'s, I, J> Pool<'s, I, J>
where
    I: Iterator<Item = J>,
    J: FnOnce() -> Report + Send + 's,
{
    fn new<'e>(worker_count: NonZeroUsize, mut source: I, scope: &'s Scope<'s, 'e>) -> Self {
        let (itx, irx) = crossbeam_channel::bounded(worker_count.get());
        let (otx, orx) = crossbeam_channel::bounded(1);
        let workers = (0..worker_count.get())
            .map(|_| {
                let irx: crossbeam_channel::Receiver<Option<J>> = irx.clone();
                let otx = otx.clone();
                // One slot per worker, this never blocks.
                let _ = itx.send(source.next());
                scope.spawn(move || {
                    while let Ok(Some(job)) = irx.recv() {
                        if otx.send(job()).is_err() {
                            // Nobody is waiting for reports anymore.
                            return;
                        }
                    }
                })
            })
            .collect();

        Self {
            source,
            push_job: itx,
            wait_report: orx,
            _workers: workers,
        }
    }
}

impl<I, J> Iterator for Pool<'_, I, J>
where
    I: Iterator<Item = J>,
{
    type Item = Report;

    fn next(&mut self) -> Option<Self::Item> {
        let report = self.wait_report.recv().ok();
        // Once the source ran dry every worker gets a `None` to stop on. If
        // they all stopped already, sending fails, which is fine.
        let _ = self.push_job.send(self.source.next());
        report
    }
}
