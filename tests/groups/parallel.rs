use std::{
    num::NonZeroUsize,
    sync::atomic::{AtomicU32, Ordering},
    thread,
    time::Duration,
};

use pretty_assertions::assert_eq;
use testgroup::{T, group, run_parallel};

use crate::lib::{Calls, harness};

#[derive(Default)]
struct Parallel {
    calls: Calls,
}

group! {
    impl Parallel {
        fn called(&self, t: &T, name: String) {
            t.log(format_args!("called {name}"));
            self.calls.push(name);
        }

        pub fn pre_group(&self, t: &T) {
            self.called(t, format!("{} pre_group", t.name()));
        }

        pub fn post_group(&self, t: &T) {
            self.called(t, format!("{} post_group", t.name()));
        }

        pub fn pre_test(&self, t: &T) {
            self.called(t, format!("{} pre_test", t.name()));
        }

        pub fn post_test(&self, t: &T) {
            self.called(t, format!("{} post_test", t.name()));
        }

        pub fn a(&self, t: &T) {
            self.called(t, t.name().to_string());
        }

        pub fn b(&self, t: &T) {
            self.called(t, t.name().to_string());
        }

        pub fn c(&self, t: &T) {
            self.called(t, t.name().to_string());
        }

        pub fn skip(&self, t: &T) {
            t.skip_now();
        }
    }
}

#[test]
fn hooks_keep_their_order_per_test() {
    let group = Parallel::default();
    let report = harness("parallel").run(|host| run_parallel(host, &group));
    report.assert_passed();

    let calls = group.calls.take();
    assert_eq!(calls.len(), 13);
    assert_eq!(calls[0], "parallel pre_group");
    assert_eq!(calls[12], "parallel post_group");

    for name in ["a", "b", "c", "skip"] {
        let prefix = format!("parallel/_/{name}");
        let per_test: Vec<_> = calls[1..12]
            .iter()
            .filter(|call| call.starts_with(&prefix))
            .map(|call| call.trim_start_matches(&prefix))
            .collect();

        match name {
            "skip" => assert_eq!(per_test, [" pre_test", " post_test"]),
            _ => assert_eq!(per_test, [" pre_test", "", " post_test"]),
        }
    }

    let scope = report.find("parallel/_").expect("parallel scope");
    assert!(!scope.parallel);
    assert_eq!(scope.children.len(), 4);
    assert!(scope.children.iter().all(|child| child.parallel));
}

#[derive(Default)]
struct Counter {
    hits: u32,
    reads: AtomicU32,
}

group! {
    impl Counter {
        pub fn pre_test(&mut self, _: &T) {
            self.hits += 1;
        }

        pub fn one(&mut self, _: &T) {
            self.hits += 1;
        }

        pub fn two(&mut self, _: &T) {
            self.hits += 1;
        }

        pub fn three(&self, _: &T) {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }

        pub fn four(&self, _: &T) {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn exclusive_methods_are_serialized() {
    let mut counter = Counter::default();
    harness("counter")
        .run(|host| run_parallel(host, &mut counter))
        .assert_passed();

    assert_eq!(counter.hits, 6);
    assert_eq!(counter.reads.into_inner(), 2);
}

#[derive(Default)]
struct Isolated {
    calls: Calls,
}

group! {
    impl Isolated {
        pub fn post_test(&self, t: &T) {
            self.calls.push(t.name());
        }

        pub fn fails(&self, t: &T) {
            t.require.equal(1, 2);
        }

        pub fn panics(&self, _: &T) {
            panic!("boom");
        }

        pub fn passes(&self, t: &T) {
            t.is_true(true);
        }
    }
}

#[test]
fn failures_do_not_reach_siblings() {
    let group = Isolated::default();
    let report = harness("isolated").run(|host| run_parallel(host, &group));

    assert!(report.failed());
    assert!(report.find("isolated/_").expect("parallel scope").failed());
    assert!(report.find("isolated/_/fails").expect("fails").failed());
    assert!(report.find("isolated/_/passes").expect("passes").passed());

    let panics = report.find("isolated/_/panics").expect("panics");
    assert!(panics.failed());
    assert_eq!(panics.logs, ["panicked: boom"]);

    let mut calls = group.calls.take();
    calls.sort();
    assert_eq!(
        calls,
        ["isolated/_/fails", "isolated/_/panics", "isolated/_/passes"]
    );
}

struct Sleepy;

group! {
    impl Sleepy {
        pub fn a(&self, _: &T) {
            thread::sleep(Duration::from_millis(100));
        }

        pub fn b(&self, _: &T) {
            thread::sleep(Duration::from_millis(100));
        }

        pub fn c(&self, _: &T) {
            thread::sleep(Duration::from_millis(100));
        }

        pub fn d(&self, _: &T) {
            thread::sleep(Duration::from_millis(100));
        }
    }
}

#[test]
#[cfg_attr(all(ci, target_os = "macos"), ignore = "too slow on macos")]
fn tests_overlap() {
    const FOUR: NonZeroUsize = NonZeroUsize::new(4).unwrap();
    let report = harness("sleepy")
        .with_thread_count(FOUR)
        .run(|host| run_parallel(host, &Sleepy));

    report.assert_passed();
    assert!(report.duration < Duration::from_millis(300));

    const ONE: NonZeroUsize = NonZeroUsize::new(1).unwrap();
    let report = harness("sleepy")
        .with_thread_count(ONE)
        .run(|host| run_parallel(host, &Sleepy));
    assert!(report.duration >= Duration::from_millis(400));
}

#[derive(Default)]
struct FailingWithCleanup {
    calls: Calls,
}

group! {
    impl FailingWithCleanup {
        pub fn post_group(&self, t: &T) {
            self.calls.push(format!("{} post_group", t.name()));
        }

        pub fn fails(&self, t: &T) {
            self.calls.push(t.name());
            t.fatal("broken");
        }

        pub fn panics(&self, t: &T) {
            self.calls.push(t.name());
            panic!("boom");
        }

        pub fn passes(&self, t: &T) {
            self.calls.push(t.name());
        }
    }
}

#[test]
fn post_group_runs_last_after_failures() {
    let group = FailingWithCleanup::default();
    let report = harness("cleanup").run(|host| run_parallel(host, &group));

    assert!(report.failed());
    assert!(report.find("cleanup/_").expect("parallel scope").failed());

    let calls = group.calls.take();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls.last().map(String::as_str), Some("cleanup post_group"));
    let mut tests = calls[..3].to_vec();
    tests.sort();
    assert_eq!(tests, ["cleanup/_/fails", "cleanup/_/panics", "cleanup/_/passes"]);
}
