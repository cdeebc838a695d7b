use std::sync::LazyLock;

use regex::Regex;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Matches: (0.01s) or (12.34s)
    Regex::new(r"\(\d+\.\d{2}s\)").unwrap()
});

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Example matches:
    //   tests\groups\rendering.rs:12
    //   tests/groups/rendering.rs:12
    Regex::new(r"(?P<path>tests[^\n:]+\.rs):(?P<line>\d+)").unwrap()
});

pub fn sanitize_report(input: &str) -> String {
    // 1. Durations depend on the machine
    let tmp = DURATION_RE.replace_all(input, "(0.00s)");

    // 2. Normalize paths to use forward slashes, drop line numbers
    let tmp = LOCATION_RE.replace_all(tmp.as_ref(), |caps: &regex::Captures| {
        let path = caps["path"].replace('\\', "/");
        format!("{path}:<line>")
    });

    tmp.to_string()
}
