use crate::harness::Harness;

/// A [`Harness`] for unit tests, with tracing routed to the test output.
pub fn harness(name: &str) -> Harness {
    init_tracing();
    Harness::new(name)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

macro_rules! nonzero {
    (0) => {
        compile_error!("0 is zero")
    };

    ($value:literal) => {
        std::convert::TryFrom::try_from($value).unwrap()
    };
}

pub(crate) use nonzero;
