use std::{
    io,
    sync::{Arc, Mutex, PoisonError},
};

use pretty_assertions::assert_eq;
use testgroup::{
    T, group,
    harness::{ColorSetting, PrettyFormatter, SupportsColor},
    run_serial,
};

use crate::lib::{harness, sanitize_report};

struct Rendered;

group! {
    impl Rendered {
        pub fn fails(&self, t: &T) {
            t.is_true(false);
        }

        pub fn passes(&self, t: &T) {
            t.log("fine");
        }

        pub fn skips(&self, t: &T) {
            t.skip("later");
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        io::Write::write(&mut *guard, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

impl Buffer {
    fn to_string_lossy(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&guard).into_owned()
    }
}

#[test]
fn renders_the_report_tree() {
    let report = harness("rendered").run(|host| run_serial(host, &Rendered));

    let expected = "\
--- FAIL: rendered (0.00s)
    --- FAIL: rendered/fails (0.00s)
        tests/groups/rendering.rs:<line>: should be true
    --- PASS: rendered/passes (0.00s)
        fine
    --- SKIP: rendered/skips (0.00s)
        later
";
    assert_eq!(sanitize_report(&report.to_string()), expected);
}

#[test]
fn pretty_formatter_writes_a_summary() {
    let report = harness("rendered").run(|host| run_serial(host, &Rendered));

    let plain = Buffer::default();
    PrettyFormatter::default()
        .with_target(plain.clone())
        .fmt_report(&report)
        .expect("write report");
    let plain = sanitize_report(&plain.to_string_lossy());
    assert_eq!(plain, sanitize_report(&report.to_string()) + "FAIL\n");

    let colored = Buffer::default();
    PrettyFormatter::default()
        .with_target(colored.clone())
        .with_color_setting(ColorSetting::Always)
        .fmt_report(&report)
        .expect("write report");
    let colored = colored.to_string_lossy();
    assert!(colored.contains("--- \x1b[32mPASS\x1b[0m: rendered/passes"));
    assert!(colored.contains("--- \x1b[33mSKIP\x1b[0m: rendered/skips"));
}
