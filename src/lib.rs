//! Group related tests as methods on one type.
//!
//! A group is an ordinary type whose public methods taking a [`T`] are its
//! tests. The tests share the state of the group and four optional hooks:
//! `pre_group` and `post_group` around the whole group, `pre_test` and
//! `post_test` around every single test.
//!
//! ```
//! use testgroup::{T, group, harness::harness};
//!
//! #[derive(Default)]
//! struct Stack {
//!     items: Vec<u32>,
//! }
//!
//! group! {
//!     impl Stack {
//!         pub fn pre_test(&mut self, _: &T) {
//!             self.items = vec![1, 2];
//!         }
//!
//!         pub fn pop(&mut self, t: &T) {
//!             t.equal(Some(2), self.items.pop());
//!             t.len(&self.items, 1);
//!         }
//!
//!         pub fn push(&mut self, t: &T) {
//!             self.items.push(3);
//!             t.require.equal(&[1, 2, 3][..], &self.items[..]);
//!         }
//!     }
//! }
//!
//! harness("stack")
//!     .run(|host| testgroup::run_serial(host, &mut Stack::default()))
//!     .assert_passed();
//! ```
//!
//! Tests run in name order with [`run_serial`] or all at once with
//! [`run_parallel`]. A group that has problems, like a public method with an
//! unexpected signature, fails as a whole before any test ran; see
//! [`classify()`] for the rules.
//!
//! The engine does not report anything itself: it runs inside a [`Host`],
//! which names scopes and collects their results. The [`harness`] module
//! provides one for use from `#[test]` functions.

mod macros;

mod classify;
pub use classify::*;

mod context;
pub use context::*;

mod engine;
pub use engine::*;

pub mod harness;

mod host;
pub use host::*;

mod method;
pub use method::*;

mod unwind;

#[cfg(test)]
mod test_support;
