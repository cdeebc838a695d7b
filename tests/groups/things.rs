use std::sync::atomic::{AtomicI32, Ordering};

use testgroup::{Config, T, group, run_serial};

use crate::lib::harness;

#[derive(Debug, Default, PartialEq)]
struct ThingsYouCanDoWithT;

group! {
    impl ThingsYouCanDoWithT {
        pub fn assert(&self, t: &T) {
            t.zero(ThingsYouCanDoWithT);
            t.equal(2, 1 + 1);
            t.len("one", 3);
        }

        pub fn require(&self, t: &T) {
            let result: Result<(), String> = Ok(());
            t.require.ok(&result);
        }

        pub fn use_the_host(&self, t: &T) {
            if t.failed() {
                t.log("How did the test already fail?");
            }
            t.host().log("straight to the host");
        }

        pub fn run_subtests(&self, t: &T) {
            for n in [1, 3, 7, 42] {
                t.run(&n.to_string(), |t| {
                    t.greater(n, 0);
                });
            }
        }

        pub fn run_subgroup_in_serial(&self, t: &T) {
            let subgroup = Subgroup::default();
            t.run_serial(&subgroup);
            t.equal(3, subgroup.count.load(Ordering::SeqCst));
        }

        pub fn run_subgroup_in_parallel(&self, t: &T) {
            let subgroup = Subgroup::default();
            t.run_parallel(&subgroup);
            t.equal(3, subgroup.count.load(Ordering::SeqCst));
        }
    }
}

#[derive(Default)]
struct Subgroup {
    count: AtomicI32,
}

group! {
    impl Subgroup {
        pub fn add_one(&self, _: &T) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }

        pub fn add_two(&self, _: &T) {
            self.count.fetch_add(2, Ordering::SeqCst);
        }
    }
}

#[test]
fn things_you_can_do_with_t() {
    let report = harness("things").run(|host| run_serial(host, &ThingsYouCanDoWithT));
    report.assert_passed();

    let host_logs = &report.find("things/use_the_host").expect("use_the_host").logs;
    assert_eq!(host_logs, &["straight to the host"]);

    for n in ["1", "3", "7", "42"] {
        let name = format!("things/run_subtests/{n}");
        assert!(report.find(&name).is_some_and(|r| r.passed()), "{name}");
    }

    let serial = report
        .find("things/run_subgroup_in_serial/add_two")
        .expect("serial subgroup");
    assert!(!serial.parallel);

    let parallel = report
        .find("things/run_subgroup_in_parallel/_/add_two")
        .expect("parallel subgroup");
    assert!(parallel.parallel);
}

struct Nesting;

group! {
    impl Nesting {
        pub fn nested(&self, t: &T) {
            t.run_parallel(&Subgroup::default());
        }
    }
}

#[test]
fn nested_groups_inherit_the_config() {
    let config = Config::default().with_parallel_scope_name("together");
    let report = harness("config").run(|host| config.run_serial(host, &Nesting));

    report.assert_passed();
    assert!(report.find("config/nested/together/add_one").is_some());
    assert!(report.find("config/nested/_").is_none());
}
