#![forbid(unsafe_code)]

//! Reactive model scope for uibind.
//!
//! This crate is the model-side collaborator of the binding suite:
//!
//! - [`Value`]: a dynamic, structurally-comparable model value
//!   (`Null`/`Bool`/`Int`/`Float`/`Str`/`Date`/`List`/`Map`).
//! - [`Expr`]: an expression evaluable against a scope, with injected
//!   [`Locals`] (`$value`, `$event`, `$params`).
//! - [`Scope`]: a single-threaded scope tree with watch registration, a
//!   digest-based mutation transaction ([`Scope::apply`]), a deferred task
//!   queue, and child-scope lifecycle.
//! - [`WatchHandle`]: RAII guard that deregisters its watcher on drop.
//!
//! # Architecture
//!
//! `Scope` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Watchers are fingerprint functions re-evaluated once per digest pass and
//! compared by value equality; callbacks fire only on inequality.
//!
//! # Invariants
//!
//! 1. A watcher's stored baseline is updated before its callback runs, so a
//!    panicking callback cannot corrupt the comparison.
//! 2. The first digest pass after registration fires every watcher exactly
//!    once with `(init, init)`.
//! 3. A digest loops passes until one full pass is clean, bounded by
//!    [`MAX_DIGEST_PASSES`](scope::MAX_DIGEST_PASSES).
//! 4. Deferred tasks run strictly after the digest settles.
//! 5. A destroyed scope never evaluates or fires its watchers again.

pub mod expr;
pub mod scope;
pub mod value;

pub use expr::{Expr, Locals};
pub use scope::{Scope, ScopeError, WatchHandle};
pub use value::{CivilDate, DateError, Value, ValueMap};
