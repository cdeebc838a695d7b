use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
/// Other payload types are formatted as a generic placeholder.
pub(crate) fn payload_as_string(payload: Box<dyn Any + Send + 'static>) -> String {
    payload
        .downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|payload| payload.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}

/// Run `body`, then `cleanup`, on every exit path of `body`.
///
/// If `body` unwinds, the unwind is resumed after `cleanup` returned.
/// An unwind out of `cleanup` itself replaces the one from `body`.
pub(crate) fn finally<B, C>(body: B, cleanup: C)
where
    B: FnOnce(),
    C: FnOnce(),
{
    let result = panic::catch_unwind(AssertUnwindSafe(body));
    cleanup();
    if let Err(payload) = result {
        panic::resume_unwind(payload);
    }
}
