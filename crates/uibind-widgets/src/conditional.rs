#![forbid(unsafe_code)]

//! Conditional attachment binding.
//!
//! A two-state machine over a [`Template`]: DETACHED (no clone present)
//! and ATTACHED (clone present, child scope live). Only falsy/truthy
//! edges of the watched condition act: the watch fingerprint is the
//! condition's truthiness, so a truthy-to-truthy value change produces an
//! equal fingerprint and cannot re-enter the state machine. Initial state
//! is DETACHED.
//!
//! Attaching creates a fresh child scope first, then hands it to the
//! template; detaching removes the template first, then destroys the
//! child scope, releasing every watcher and resource the clone owned.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use uibind_scope::{Expr, Scope, Value, WatchHandle};

/// Attach/detach surface for the transcluded content. The implementation
/// owns its clone handle; `detach` is only ever called after a matching
/// `attach`.
pub trait Template {
    /// Instantiate the content under a fresh child scope and insert it
    /// after the anchor.
    fn attach(&mut self, child: &Scope);

    /// Remove the content from the host.
    fn detach(&mut self);
}

/// State of a conditional binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    Detached,
    Attached,
}

struct CondShared {
    template: RefCell<Box<dyn Template>>,
    child: RefCell<Option<Scope>>,
    state: Cell<AttachState>,
}

impl CondShared {
    fn detach_now(&self) {
        self.template.borrow_mut().detach();
        if let Some(child) = self.child.borrow_mut().take() {
            child.destroy();
        }
        self.state.set(AttachState::Detached);
    }
}

/// Adds/removes templated content on a watched condition's edges.
pub struct ConditionalBinding {
    scope: Scope,
    condition: Expr,
    shared: Rc<CondShared>,
    watch: RefCell<Option<WatchHandle>>,
}

impl ConditionalBinding {
    pub fn new(scope: &Scope, condition: Expr, template: Box<dyn Template>) -> Rc<Self> {
        let shared = Rc::new(CondShared {
            template: RefCell::new(template),
            child: RefCell::new(None),
            state: Cell::new(AttachState::Detached),
        });
        let on_host_destroy = Rc::clone(&shared);
        scope.on_destroy(move || {
            if on_host_destroy.state.get() == AttachState::Attached {
                // The child scope was already destroyed by the cascade;
                // destroy() is idempotent.
                on_host_destroy.detach_now();
            }
        });
        Rc::new(Self {
            scope: scope.clone(),
            condition,
            shared,
            watch: RefCell::new(None),
        })
    }

    /// Register the condition watcher. The first digest establishes the
    /// initial state (attaching immediately if the condition is already
    /// truthy).
    pub fn attach(&self) {
        let condition = self.condition.clone();
        let fingerprint = move |scope: &Scope| {
            Value::Bool(condition.eval(scope, &uibind_scope::Locals::new()).is_truthy())
        };

        let shared = Rc::clone(&self.shared);
        let on_change = move |new: &Value, _: &Value, scope: &Scope| {
            let truthy = new.is_truthy();
            match (shared.state.get(), truthy) {
                (AttachState::Detached, true) => {
                    let child = scope.child();
                    shared.template.borrow_mut().attach(&child);
                    *shared.child.borrow_mut() = Some(child);
                    shared.state.set(AttachState::Attached);
                }
                (AttachState::Attached, false) => shared.detach_now(),
                // Initial falsy fire, and same-state edges the
                // truthiness fingerprint already filtered out.
                _ => {}
            }
        };

        *self.watch.borrow_mut() = Some(self.scope.watch(fingerprint, on_change));
    }

    /// Current state of the state machine.
    #[must_use]
    pub fn state(&self) -> AttachState {
        self.shared.state.get()
    }

    /// The live child scope while attached.
    #[must_use]
    pub fn child_scope(&self) -> Option<Scope> {
        self.shared.child.borrow().clone()
    }
}

impl std::fmt::Debug for ConditionalBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionalBinding")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct CountingTemplate {
        attaches: Rc<Cell<u32>>,
        detaches: Rc<Cell<u32>>,
        last_child: Rc<RefCell<Option<Scope>>>,
    }

    impl Template for CountingTemplate {
        fn attach(&mut self, child: &Scope) {
            self.attaches.set(self.attaches.get() + 1);
            *self.last_child.borrow_mut() = Some(child.clone());
        }

        fn detach(&mut self) {
            self.detaches.set(self.detaches.get() + 1);
        }
    }

    fn setup(scope: &Scope) -> (Rc<ConditionalBinding>, CountingTemplate) {
        let template = CountingTemplate::default();
        let binding = ConditionalBinding::new(
            scope,
            Expr::path("visible"),
            Box::new(template.clone()),
        );
        binding.attach();
        (binding, template)
    }

    #[test]
    fn initial_state_is_detached() {
        let scope = Scope::root();
        scope.set("visible", Value::Bool(false));
        let (binding, template) = setup(&scope);
        scope.flush().unwrap();
        assert_eq!(binding.state(), AttachState::Detached);
        assert_eq!(template.attaches.get(), 0);
    }

    #[test]
    fn already_truthy_condition_attaches_on_first_digest() {
        let scope = Scope::root();
        scope.set("visible", Value::Bool(true));
        let (binding, template) = setup(&scope);
        scope.flush().unwrap();
        assert_eq!(binding.state(), AttachState::Attached);
        assert_eq!(template.attaches.get(), 1);
    }

    #[test]
    fn edge_sequence_counts_creations_and_destructions() {
        let scope = Scope::root();
        scope.set("visible", Value::Bool(false));
        let (binding, template) = setup(&scope);
        scope.flush().unwrap();

        for step in [true, true, false, true] {
            scope.apply(|s| s.set("visible", Value::Bool(step))).unwrap();
        }
        assert_eq!(template.attaches.get(), 2, "true→true creates nothing");
        assert_eq!(template.detaches.get(), 1);
        assert_eq!(binding.state(), AttachState::Attached);

        // Host teardown accounts for the final destruction.
        scope.destroy();
        assert_eq!(template.detaches.get(), 2);
        assert_eq!(binding.state(), AttachState::Detached);
    }

    #[test]
    fn truthiness_not_value_drives_edges() {
        let scope = Scope::root();
        scope.set("visible", Value::Int(1));
        let (_binding, template) = setup(&scope);
        scope.flush().unwrap();
        assert_eq!(template.attaches.get(), 1);

        // Different value, same truthiness: no edge.
        scope.apply(|s| s.set("visible", Value::Int(7))).unwrap();
        assert_eq!(template.attaches.get(), 1);
        assert_eq!(template.detaches.get(), 0);

        scope.apply(|s| s.set("visible", Value::Int(0))).unwrap();
        assert_eq!(template.detaches.get(), 1);
    }

    #[test]
    fn detach_destroys_child_scope_and_its_watchers() {
        let scope = Scope::root();
        scope.set("visible", Value::Bool(true));
        let (binding, template) = setup(&scope);
        scope.flush().unwrap();

        let child = binding.child_scope().expect("attached");
        let fired = Rc::new(Cell::new(0u32));
        let f = Rc::clone(&fired);
        let _w = child.watch(
            |scope| scope.get("visible"),
            move |_, _, _| f.set(f.get() + 1),
        );
        scope.flush().unwrap();
        assert_eq!(fired.get(), 1);

        scope.apply(|s| s.set("visible", Value::Bool(false))).unwrap();
        assert!(child.is_destroyed());
        assert!(binding.child_scope().is_none());

        // The clone's watcher is gone with its scope.
        scope.apply(|s| s.set("visible", Value::Bool(true))).unwrap();
        assert_eq!(fired.get(), 1);
        let _ = template;
    }

    #[test]
    fn each_attachment_gets_a_fresh_child_scope() {
        let scope = Scope::root();
        scope.set("visible", Value::Bool(true));
        let (binding, template) = setup(&scope);
        scope.flush().unwrap();
        let first = binding.child_scope().unwrap();

        scope.apply(|s| s.set("visible", Value::Bool(false))).unwrap();
        scope.apply(|s| s.set("visible", Value::Bool(true))).unwrap();
        let second = binding.child_scope().unwrap();
        assert!(first.is_destroyed());
        assert!(!second.is_destroyed());
        assert_eq!(template.attaches.get(), 2);
    }
}
