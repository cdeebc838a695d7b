use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt::Debug,
    panic::{self, AssertUnwindSafe, Location},
};

use pretty_assertions::Comparison;

use crate::{Host, Stop, harness::colors, unwind::payload_as_string};

/// Checks reported to a [`Host`] scope.
///
/// Every check returns whether it held. A failing check logs the caller
/// location and a description, then either marks the scope as failed and
/// continues (assertions) or stops the scope (requirements, see
/// [`T::require`](crate::T::require)).
#[derive(Clone, Copy)]
pub struct Assertions<'h> {
    host: &'h dyn Host,
    fatal: bool,
}

impl<'h> Assertions<'h> {
    pub(crate) fn new(host: &'h dyn Host, fatal: bool) -> Self {
        Self { host, fatal }
    }

    /// Whether a failing check stops the scope.
    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    #[track_caller]
    fn check(&self, held: bool, describe: impl FnOnce() -> String) -> bool {
        if !held {
            let location = Location::caller();
            self.host.log(&format!(
                "{}:{}: {}",
                location.file(),
                location.line(),
                describe()
            ));
            match self.fatal {
                true => self.host.fail_now(),
                false => self.host.fail(),
            }
        }
        held
    }

    #[track_caller]
    pub fn equal<E, A>(&self, expected: E, actual: A) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug,
    {
        self.check(expected == actual, || {
            let diff = Comparison::new(&expected, &actual).to_string();
            format!("not equal:\n{}", colors::strip(&diff))
        })
    }

    #[track_caller]
    pub fn not_equal<E, A>(&self, expected: E, actual: A) -> bool
    where
        E: PartialEq<A> + Debug,
        A: Debug,
    {
        self.check(expected != actual, || {
            format!("should not be equal: {actual:?}")
        })
    }

    #[track_caller]
    pub fn is_true(&self, value: bool) -> bool {
        self.check(value, || "should be true".to_string())
    }

    #[track_caller]
    pub fn is_false(&self, value: bool) -> bool {
        self.check(!value, || "should be false".to_string())
    }

    /// Check that `value` equals its type's default.
    #[track_caller]
    pub fn zero<V>(&self, value: V) -> bool
    where
        V: Default + PartialEq + Debug,
    {
        self.check(value == V::default(), || {
            format!("should be zero, but was {value:?}")
        })
    }

    #[track_caller]
    pub fn len<V: Length + Debug + ?Sized>(&self, value: &V, len: usize) -> bool {
        self.check(value.length() == len, || {
            format!(
                "{value:?} should have {len} item(s), but has {}",
                value.length()
            )
        })
    }

    #[track_caller]
    pub fn is_empty<V: Length + Debug + ?Sized>(&self, value: &V) -> bool {
        self.check(value.length() == 0, || format!("should be empty, but was {value:?}"))
    }

    #[track_caller]
    pub fn contains(&self, haystack: &str, needle: &str) -> bool {
        self.check(haystack.contains(needle), || {
            format!("{haystack:?} does not contain {needle:?}")
        })
    }

    /// Check that `result` is `Ok`.
    #[track_caller]
    pub fn ok<V, E: Debug>(&self, result: &Result<V, E>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => self.check(false, || format!("received unexpected error: {err:?}")),
        }
    }

    /// Check that `result` is `Err`.
    #[track_caller]
    pub fn err<V: Debug, E>(&self, result: &Result<V, E>) -> bool {
        match result {
            Ok(value) => self.check(false, || {
                format!("an error is expected but got Ok({value:?})")
            }),
            Err(_) => true,
        }
    }

    #[track_caller]
    pub fn some<V>(&self, option: &Option<V>) -> bool {
        self.check(option.is_some(), || "expected Some(_), got None".to_string())
    }

    #[track_caller]
    pub fn none<V: Debug>(&self, option: &Option<V>) -> bool {
        self.check(option.is_none(), || format!("expected None, got {option:?}"))
    }

    #[track_caller]
    pub fn greater<V: PartialOrd + Debug>(&self, value: V, than: V) -> bool {
        self.check(value > than, || format!("{value:?} is not greater than {than:?}"))
    }

    #[track_caller]
    pub fn less<V: PartialOrd + Debug>(&self, value: V, than: V) -> bool {
        self.check(value < than, || format!("{value:?} is not less than {than:?}"))
    }

    /// Check that `f` panics.
    ///
    /// The panic is caught and does not affect the scope. A [`Stop`] raised
    /// inside `f`, by a requirement or a skip, is not a panic and keeps
    /// unwinding.
    #[track_caller]
    pub fn panics<F: FnOnce()>(&self, f: F) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => self.check(false, || "should panic, but did not".to_string()),
            Err(payload) if Stop::from_payload(&*payload).is_some() => {
                panic::resume_unwind(payload)
            }
            Err(payload) => {
                tracing::trace!(panic = %payload_as_string(payload), "caught expected panic");
                true
            }
        }
    }
}

/// Anything with a number of items, used by [`Assertions::len`].
pub trait Length {
    fn length(&self) -> usize;
}

impl Length for str {
    fn length(&self) -> usize {
        self.len()
    }
}

impl Length for String {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V> Length for [V] {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V, const N: usize> Length for [V; N] {
    fn length(&self) -> usize {
        N
    }
}

impl<V> Length for Vec<V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V> Length for VecDeque<V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> Length for HashMap<K, V, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V, S> Length for HashSet<V, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V> Length for BTreeMap<K, V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<V> Length for BTreeSet<V> {
    fn length(&self) -> usize {
        self.len()
    }
}
