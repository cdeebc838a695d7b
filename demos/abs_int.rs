use std::process::ExitCode;

use testgroup::{
    T, group,
    harness::{PrettyFormatter, harness},
};

fn abs_int(n: i64) -> i64 {
    if n < 0 { -n } else { n }
}

#[derive(Default)]
struct AbsIntTests {
    // Group-wide data/state can be stored here.
}

group! {
    impl AbsIntTests {
        pub fn does_not_change_non_negative_numbers(&self, t: &T) {
            t.equal(0, abs_int(0));
            t.equal(1, abs_int(1));
            t.equal(123456789, abs_int(123456789));
        }

        pub fn makes_negative_numbers_positive(&self, t: &T) {
            t.equal(1, abs_int(-1));
            t.equal(123456789, abs_int(-123456789));
        }
    }
}

fn main() -> ExitCode {
    let report = harness("abs_int").run(|host| testgroup::run_serial(host, &AbsIntTests::default()));

    if let Err(err) = PrettyFormatter::default().fmt_report(&report) {
        eprintln!("could not write report: {err}");
        return ExitCode::FAILURE;
    }

    match report.failed() {
        true => ExitCode::FAILURE,
        false => ExitCode::SUCCESS,
    }
}
