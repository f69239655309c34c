#![forbid(unsafe_code)]

//! Scope tree, watch registration, and the digest transaction.
//!
//! A [`Scope`] owns a slice of model data (a map of [`Value`]s), a set of
//! watchers, and child scopes. Mutations go through [`Scope::apply`], which
//! runs the mutation closure and then digests: every watcher's fingerprint
//! function is re-evaluated once per pass and compared by value equality to
//! the previous result; on inequality the callback fires exactly once,
//! synchronously, within that pass. Passes repeat until one is clean.
//!
//! # Invariants
//!
//! 1. The stored baseline is updated before the callback runs; a panicking
//!    callback cannot corrupt the next comparison.
//! 2. A freshly-registered watcher fires on its first evaluated pass with
//!    `(init, init)`.
//! 3. Watchers fire in registration order within a scope, parents before
//!    children; relative ordering is otherwise unspecified and not part of
//!    the contract.
//! 4. `apply` from inside a digest runs the closure inline; the in-flight
//!    digest picks the mutations up on its next pass.
//! 5. Deferred tasks run after the digest settles, in FIFO order.
//! 6. A destroyed scope's watchers never fire again, and its destroy hooks
//!    run exactly once.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unstable digest | Watchers keep dirtying each other | `ScopeError::UnstableDigest` after the pass limit |
//! | Apply on destroyed scope | Caller kept a stale handle | `ScopeError::Destroyed` |
//! | Fingerprint panic | Defect in adapter code | Propagates (not masked) |

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::expr::{Expr, Locals};
use crate::value::{Value, ValueMap};

/// Upper bound on digest passes before the digest is declared unstable.
pub const MAX_DIGEST_PASSES: usize = 10;

/// Errors from scope scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// The digest did not stabilize within [`MAX_DIGEST_PASSES`] passes.
    UnstableDigest { passes: usize },
    /// The scope (or its root) has been destroyed.
    Destroyed,
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnstableDigest { passes } => {
                write!(f, "digest did not stabilize after {passes} passes")
            }
            Self::Destroyed => write!(f, "scope has been destroyed"),
        }
    }
}

impl std::error::Error for ScopeError {}

struct WatchState {
    fingerprint: Box<dyn Fn(&Scope) -> Value>,
    on_change: Box<dyn FnMut(&Value, &Value, &Scope)>,
    last: Option<Value>,
}

struct WatchSlot {
    removed: Cell<bool>,
    scope: Weak<ScopeInner>,
    state: RefCell<WatchState>,
}

/// RAII guard for a registered watcher. Dropping it deregisters the
/// watcher before the next digest pass.
pub struct WatchHandle {
    slot: Rc<WatchSlot>,
}

impl WatchHandle {
    /// Whether the watcher is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.slot.removed.get()
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.slot.removed.set(true);
        if let Some(owner) = self.slot.scope.upgrade() {
            owner
                .watchers
                .borrow_mut()
                .retain(|s| !Rc::ptr_eq(s, &self.slot));
        }
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("active", &self.is_active())
            .finish()
    }
}

struct ScopeInner {
    parent: Weak<ScopeInner>,
    root: Weak<ScopeInner>,
    data: RefCell<ValueMap>,
    watchers: RefCell<Vec<Rc<WatchSlot>>>,
    children: RefCell<Vec<Rc<ScopeInner>>>,
    destroy_hooks: RefCell<Vec<Box<dyn FnOnce()>>>,
    destroyed: Cell<bool>,
    // Root-only scheduler state (unused on child scopes).
    digesting: Cell<bool>,
    deferred: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

/// Clone-able handle to one scope in the tree.
#[derive(Clone)]
pub struct Scope {
    inner: Rc<ScopeInner>,
}

/// Resets the digesting flag even if a watcher panics.
struct DigestGuard<'a>(&'a Cell<bool>);

impl Drop for DigestGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Scope {
    /// Create a new root scope.
    #[must_use]
    pub fn root() -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<ScopeInner>| ScopeInner {
            parent: Weak::new(),
            root: weak.clone(),
            data: RefCell::new(ValueMap::new()),
            watchers: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            destroy_hooks: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
            digesting: Cell::new(false),
            deferred: RefCell::new(VecDeque::new()),
        });
        Self { inner }
    }

    /// Create a child scope. The child reads through to parent model data
    /// for keys it does not define; writes always land in the child.
    #[must_use]
    pub fn child(&self) -> Self {
        let inner = Rc::new(ScopeInner {
            parent: Rc::downgrade(&self.inner),
            root: self.inner.root.clone(),
            data: RefCell::new(ValueMap::new()),
            watchers: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            destroy_hooks: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
            digesting: Cell::new(false),
            deferred: RefCell::new(VecDeque::new()),
        });
        self.inner.children.borrow_mut().push(Rc::clone(&inner));
        Self { inner }
    }

    /// Whether this scope has been destroyed (or orphaned from its root).
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get() || self.inner.root.upgrade().is_none()
    }

    fn root_scope(&self) -> Option<Self> {
        self.inner.root.upgrade().map(|inner| Self { inner })
    }

    // ----- model data ------------------------------------------------

    /// Read a dotted model path. Missing paths read as `Null`. The first
    /// segment falls through to ancestor scopes when absent locally.
    #[must_use]
    pub fn get(&self, path: &str) -> Value {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Value::Null;
        };
        let rest: Vec<&str> = segments.collect();
        let mut scope = Some(Rc::clone(&self.inner));
        while let Some(s) = scope {
            let found = s.data.borrow().get(first).cloned();
            if let Some(mut current) = found {
                for segment in &rest {
                    current = match current {
                        Value::Map(mut m) => m.remove(*segment).unwrap_or(Value::Null),
                        _ => Value::Null,
                    };
                }
                return current;
            }
            scope = s.parent.upgrade();
        }
        Value::Null
    }

    /// Write a dotted model path, creating intermediate maps as needed
    /// (non-map intermediates are replaced). Always writes into this scope
    /// (shadowing any ancestor definition).
    pub fn set(&self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let mut data = self.inner.data.borrow_mut();
        set_path(&mut data, &segments, value);
    }

    // ----- watchers ---------------------------------------------------

    /// Register a watcher. The fingerprint function runs once per digest
    /// pass; `on_change(new, old, scope)` fires when the result differs
    /// from the previous pass (and once initially, with `new == old`).
    ///
    /// Returns an RAII [`WatchHandle`]; dropping it deregisters the
    /// watcher. Watching a destroyed scope yields an inert handle.
    pub fn watch(
        &self,
        fingerprint: impl Fn(&Scope) -> Value + 'static,
        on_change: impl FnMut(&Value, &Value, &Scope) + 'static,
    ) -> WatchHandle {
        let slot = Rc::new(WatchSlot {
            removed: Cell::new(self.is_destroyed()),
            scope: Rc::downgrade(&self.inner),
            state: RefCell::new(WatchState {
                fingerprint: Box::new(fingerprint),
                on_change: Box::new(on_change),
                last: None,
            }),
        });
        if !self.is_destroyed() {
            self.inner.watchers.borrow_mut().push(Rc::clone(&slot));
        }
        WatchHandle { slot }
    }

    /// Watch an [`Expr`]'s value (evaluated with empty locals).
    pub fn watch_expr(
        &self,
        expr: Expr,
        on_change: impl FnMut(&Value, &Value, &Scope) + 'static,
    ) -> WatchHandle {
        self.watch(move |scope| expr.eval(scope, &Locals::new()), on_change)
    }

    /// Register a hook that runs when this scope is destroyed. If the
    /// scope is already destroyed the hook runs immediately.
    pub fn on_destroy(&self, hook: impl FnOnce() + 'static) {
        if self.inner.destroyed.get() {
            hook();
        } else {
            self.inner.destroy_hooks.borrow_mut().push(Box::new(hook));
        }
    }

    // ----- transactions -----------------------------------------------

    /// Run a mutation transaction: execute `f`, digest until watchers are
    /// stable, then flush deferred tasks. Reentrant calls (from inside a
    /// watcher callback) run `f` inline; the in-flight digest picks up the
    /// mutations.
    pub fn apply<R>(&self, f: impl FnOnce(&Self) -> R) -> Result<R, ScopeError> {
        if self.is_destroyed() {
            return Err(ScopeError::Destroyed);
        }
        let root = self.root_scope().ok_or(ScopeError::Destroyed)?;
        if root.inner.digesting.get() {
            return Ok(f(self));
        }
        let result = {
            let _guard = DigestGuard(&root.inner.digesting);
            root.inner.digesting.set(true);
            let result = f(self);
            root.digest()?;
            result
        };
        root.flush_deferred();
        Ok(result)
    }

    /// Run a digest with no mutation. Fires any watcher whose fingerprint
    /// changed outside a transaction, and newly-registered watchers.
    pub fn flush(&self) -> Result<(), ScopeError> {
        self.apply(|_| ())
    }

    /// Queue a task to run after the current digest settles (or on the
    /// next [`Scope::apply`]/[`Scope::flush`] if none is in flight).
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        if let Some(root) = self.root_scope() {
            root.inner.deferred.borrow_mut().push_back(Box::new(task));
        }
    }

    fn digest(&self) -> Result<(), ScopeError> {
        for pass in 0..MAX_DIGEST_PASSES {
            let mut dirty = false;
            let mut slots = Vec::new();
            collect_watchers(&self.inner, &mut slots);
            for slot in &slots {
                if slot.removed.get() {
                    continue;
                }
                let Some(owner) = slot.scope.upgrade() else {
                    continue;
                };
                if owner.destroyed.get() {
                    continue;
                }
                let owner = Self { inner: owner };
                let mut state = slot.state.borrow_mut();
                let new = (state.fingerprint)(&owner);
                let fire = match &state.last {
                    None => true,
                    Some(prev) => *prev != new,
                };
                if fire {
                    // Baseline first: a panicking callback must not
                    // corrupt the next comparison.
                    let old = state.last.replace(new.clone()).unwrap_or_else(|| new.clone());
                    dirty = true;
                    (state.on_change)(&new, &old, &owner);
                }
            }
            if !dirty {
                trace!(passes = pass + 1, "digest settled");
                return Ok(());
            }
        }
        Err(ScopeError::UnstableDigest {
            passes: MAX_DIGEST_PASSES,
        })
    }

    fn flush_deferred(&self) {
        loop {
            let task = self.inner.deferred.borrow_mut().pop_front();
            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    // ----- lifecycle --------------------------------------------------

    /// Destroy this scope: deregister its watchers, destroy children
    /// depth-first, run destroy hooks, and detach from the parent.
    /// Idempotent.
    pub fn destroy(&self) {
        if self.inner.destroyed.replace(true) {
            return;
        }
        let children: Vec<_> = self.inner.children.borrow_mut().drain(..).collect();
        for child in children {
            Self { inner: child }.destroy();
        }
        let watchers: Vec<_> = self.inner.watchers.borrow_mut().drain(..).collect();
        for watcher in watchers {
            watcher.removed.set(true);
        }
        let hooks: Vec<_> = self.inner.destroy_hooks.borrow_mut().drain(..).collect();
        for hook in hooks {
            hook();
        }
        if let Some(parent) = self.inner.parent.upgrade() {
            parent
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, &self.inner));
        }
    }

    /// Number of registered watchers on this scope (excluding children).
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.inner.watchers.borrow().len()
    }
}

fn set_path(map: &mut ValueMap, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            map.insert((*last).to_owned(), value);
        }
        [head, rest @ ..] => {
            let entry = map
                .entry((*head).to_owned())
                .or_insert_with(|| Value::Map(ValueMap::new()));
            if !matches!(entry, Value::Map(_)) {
                *entry = Value::Map(ValueMap::new());
            }
            if let Value::Map(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

fn collect_watchers(inner: &Rc<ScopeInner>, out: &mut Vec<Rc<WatchSlot>>) {
    if inner.destroyed.get() {
        return;
    }
    out.extend(inner.watchers.borrow().iter().map(Rc::clone));
    for child in inner.children.borrow().iter() {
        collect_watchers(child, out);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("watchers", &self.inner.watchers.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn counter() -> Rc<Cell<u32>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn first_pass_fires_with_init_equal_to_new() {
        let scope = Scope::root();
        scope.set("n", Value::Int(7));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |new, old, _| s.borrow_mut().push((new.clone(), old.clone())),
        );
        scope.flush().unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![(Value::Int(7), Value::Int(7))],
            "first fire carries (init, init)"
        );
    }

    #[test]
    fn equal_fingerprint_suppresses_callback() {
        let scope = Scope::root();
        scope.set("n", Value::Int(1));
        let fires = counter();
        let f = Rc::clone(&fires);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |_, _, _| f.set(f.get() + 1),
        );
        scope.flush().unwrap();
        scope.flush().unwrap();
        scope.apply(|s| s.set("n", Value::Int(1))).unwrap();
        assert_eq!(fires.get(), 1, "only the initial fire");
    }

    #[test]
    fn change_fires_exactly_once() {
        let scope = Scope::root();
        scope.set("n", Value::Int(1));
        let fires = counter();
        let f = Rc::clone(&fires);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |_, _, _| f.set(f.get() + 1),
        );
        scope.flush().unwrap();
        scope.apply(|s| s.set("n", Value::Int(2))).unwrap();
        assert_eq!(fires.get(), 2);
    }

    #[test]
    fn old_value_carried_to_callback() {
        let scope = Scope::root();
        scope.set("n", Value::Int(1));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |new, old, _| s.borrow_mut().push((new.clone(), old.clone())),
        );
        scope.flush().unwrap();
        scope.apply(|sc| sc.set("n", Value::Int(5))).unwrap();
        assert_eq!(seen.borrow()[1], (Value::Int(5), Value::Int(1)));
    }

    #[test]
    fn baseline_survives_panicking_callback() {
        let scope = Scope::root();
        scope.set("n", Value::Int(1));
        let fires = counter();
        let f = Rc::clone(&fires);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |_, _, _| {
                f.set(f.get() + 1);
                if f.get() == 2 {
                    panic!("callback defect");
                }
            },
        );
        scope.flush().unwrap();
        scope.set("n", Value::Int(2));
        let result = catch_unwind(AssertUnwindSafe(|| scope.flush()));
        assert!(result.is_err(), "panic propagates");
        // Baseline was updated before the panic: the same value does not
        // re-fire on the next digest.
        scope.flush().unwrap();
        assert_eq!(fires.get(), 2);
    }

    #[test]
    fn unstable_digest_reports_error() {
        let scope = Scope::root();
        let tick = Rc::new(Cell::new(0i64));
        let t = Rc::clone(&tick);
        // Fingerprint changes on every pass: can never stabilize.
        let _w = scope.watch(
            move |_| {
                t.set(t.get() + 1);
                Value::Int(t.get())
            },
            |_, _, _| {},
        );
        assert_eq!(
            scope.flush(),
            Err(ScopeError::UnstableDigest {
                passes: MAX_DIGEST_PASSES
            })
        );
    }

    #[test]
    fn watch_handle_drop_deregisters() {
        let scope = Scope::root();
        scope.set("n", Value::Int(0));
        let fires = counter();
        let f = Rc::clone(&fires);
        let w = scope.watch(
            |scope| scope.get("n"),
            move |_, _, _| f.set(f.get() + 1),
        );
        scope.flush().unwrap();
        assert_eq!(scope.watcher_count(), 1);
        drop(w);
        assert_eq!(scope.watcher_count(), 0);
        scope.apply(|s| s.set("n", Value::Int(9))).unwrap();
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn watcher_registered_during_digest_fires_same_transaction() {
        let scope = Scope::root();
        scope.set("n", Value::Int(0));
        let inner_fired = Rc::new(Cell::new(false));
        let handles: Rc<RefCell<Vec<WatchHandle>>> = Rc::new(RefCell::new(Vec::new()));
        let fired = Rc::clone(&inner_fired);
        let held = Rc::clone(&handles);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |_, _, scope| {
                let fired = Rc::clone(&fired);
                let handle = scope.watch(
                    |_| Value::Int(42),
                    move |_, _, _| fired.set(true),
                );
                held.borrow_mut().push(handle);
            },
        );
        scope.flush().unwrap();
        assert!(inner_fired.get(), "new watcher fires before digest settles");
    }

    #[test]
    fn cascading_watchers_settle() {
        let scope = Scope::root();
        scope.set("a", Value::Int(1));
        let _w1 = scope.watch(
            |scope| scope.get("a"),
            |new, _, scope| {
                let doubled = new.as_i64().unwrap_or(0) * 2;
                scope.set("b", Value::Int(doubled));
            },
        );
        let seen_b = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen_b);
        let _w2 = scope.watch(
            |scope| scope.get("b"),
            move |new, _, _| s.borrow_mut().push(new.clone()),
        );
        scope.flush().unwrap();
        scope.apply(|sc| sc.set("a", Value::Int(5))).unwrap();
        assert_eq!(scope.get("b"), Value::Int(10));
        assert_eq!(*seen_b.borrow().last().unwrap(), Value::Int(10));
    }

    #[test]
    fn reentrant_apply_runs_inline() {
        let scope = Scope::root();
        scope.set("n", Value::Int(0));
        let _w = scope.watch(
            |scope| scope.get("n"),
            |new, _, scope| {
                if new == &Value::Int(1) {
                    // Reentrant transaction from inside a callback.
                    scope.apply(|s| s.set("n", Value::Int(2))).unwrap();
                }
            },
        );
        scope.flush().unwrap();
        scope.apply(|s| s.set("n", Value::Int(1))).unwrap();
        assert_eq!(scope.get("n"), Value::Int(2));
    }

    #[test]
    fn deferred_tasks_run_after_digest() {
        let scope = Scope::root();
        scope.set("n", Value::Int(0));
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |_, _, scope| {
                o1.borrow_mut().push("watch");
                let o = Rc::clone(&o1);
                scope.defer(move || o.borrow_mut().push("deferred"));
            },
        );
        scope.flush().unwrap();
        o2.borrow_mut().push("after-flush");
        assert_eq!(*order.borrow(), vec!["watch", "deferred", "after-flush"]);
    }

    #[test]
    fn deferred_without_transaction_waits_for_next_flush() {
        let scope = Scope::root();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        scope.defer(move || r.set(true));
        assert!(!ran.get());
        scope.flush().unwrap();
        assert!(ran.get());
    }

    #[test]
    fn child_reads_through_writes_shadow() {
        let scope = Scope::root();
        scope.set("x", Value::Int(1));
        let child = scope.child();
        assert_eq!(child.get("x"), Value::Int(1));
        child.set("x", Value::Int(2));
        assert_eq!(child.get("x"), Value::Int(2));
        assert_eq!(scope.get("x"), Value::Int(1), "parent unaffected");
    }

    #[test]
    fn nested_path_set_get() {
        let scope = Scope::root();
        scope.set("a.b.c", Value::Int(3));
        assert_eq!(scope.get("a.b.c"), Value::Int(3));
        assert_eq!(scope.get("a.b.missing"), Value::Null);
        assert!(matches!(scope.get("a.b"), Value::Map(_)));
    }

    #[test]
    fn child_watchers_run_in_parent_digest() {
        let scope = Scope::root();
        let child = scope.child();
        child.set("n", Value::Int(0));
        let fires = counter();
        let f = Rc::clone(&fires);
        let _w = child.watch(
            |scope| scope.get("n"),
            move |_, _, _| f.set(f.get() + 1),
        );
        scope.flush().unwrap();
        assert_eq!(fires.get(), 1);
        scope.apply(|_| child.set("n", Value::Int(1))).unwrap();
        assert_eq!(fires.get(), 2);
    }

    #[test]
    fn destroyed_child_never_fires_again() {
        let scope = Scope::root();
        let child = scope.child();
        child.set("n", Value::Int(0));
        let fires = counter();
        let f = Rc::clone(&fires);
        let _w = child.watch(
            |scope| scope.get("n"),
            move |_, _, _| f.set(f.get() + 1),
        );
        scope.flush().unwrap();
        child.destroy();
        child.set("n", Value::Int(1));
        scope.flush().unwrap();
        assert_eq!(fires.get(), 1, "no fire after destroy");
        assert!(child.is_destroyed());
    }

    #[test]
    fn destroy_runs_hooks_once() {
        let scope = Scope::root();
        let child = scope.child();
        let runs = counter();
        let r = Rc::clone(&runs);
        child.on_destroy(move || r.set(r.get() + 1));
        child.destroy();
        child.destroy();
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn on_destroy_after_destroy_runs_immediately() {
        let scope = Scope::root();
        let child = scope.child();
        child.destroy();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        child.on_destroy(move || r.set(true));
        assert!(ran.get());
    }

    #[test]
    fn destroy_cascades_to_grandchildren() {
        let scope = Scope::root();
        let child = scope.child();
        let grandchild = child.child();
        child.destroy();
        assert!(grandchild.is_destroyed());
    }

    #[test]
    fn apply_on_destroyed_scope_errors() {
        let scope = Scope::root();
        let child = scope.child();
        child.destroy();
        assert_eq!(child.apply(|_| ()), Err(ScopeError::Destroyed));
    }

    #[test]
    fn watch_on_destroyed_scope_is_inert() {
        let scope = Scope::root();
        let child = scope.child();
        child.destroy();
        let w = child.watch(|_| Value::Null, |_, _, _| {});
        assert!(!w.is_active());
        assert_eq!(child.watcher_count(), 0);
    }
}
