#![forbid(unsafe_code)]

//! Visibility class binding.
//!
//! Toggles marker classes on a host element instead of manipulating
//! display state directly, leaving the actual presentation to the host's
//! stylesheet. Three modes: `Show` adds/removes the show class, `Hide`
//! adds/removes the hide class, `Toggle` swaps one for the other.

use std::cell::RefCell;
use std::rc::Rc;

use uibind_scope::{Expr, Locals, Scope, Value, WatchHandle};

/// Class applied when content should be shown.
pub const SHOW_CLASS: &str = "ui-show";
/// Class applied when content should be hidden.
pub const HIDE_CLASS: &str = "ui-hide";

/// Host surface for class manipulation. Both operations are idempotent.
pub trait ClassTarget {
    fn add_class(&mut self, class: &str);
    fn remove_class(&mut self, class: &str);
}

/// How the watched condition maps to classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityMode {
    Show,
    Hide,
    Toggle,
}

/// Watches a condition's truthiness and toggles marker classes.
pub struct VisibilityBinding {
    scope: Scope,
    mode: VisibilityMode,
    condition: Expr,
    target: Rc<RefCell<dyn ClassTarget>>,
    watch: RefCell<Option<WatchHandle>>,
}

impl VisibilityBinding {
    pub fn new(
        scope: &Scope,
        mode: VisibilityMode,
        condition: Expr,
        target: Rc<RefCell<dyn ClassTarget>>,
    ) -> Self {
        Self {
            scope: scope.clone(),
            mode,
            condition,
            target,
            watch: RefCell::new(None),
        }
    }

    /// Register the condition watcher. The first digest applies the
    /// classes for the current state.
    pub fn attach(&self) {
        let condition = self.condition.clone();
        let fingerprint =
            move |scope: &Scope| Value::Bool(condition.eval(scope, &Locals::new()).is_truthy());

        let mode = self.mode;
        let target = Rc::clone(&self.target);
        let on_change = move |new: &Value, _: &Value, _: &Scope| {
            let mut target = target.borrow_mut();
            apply_classes(&mut *target, mode, new.is_truthy());
        };

        *self.watch.borrow_mut() = Some(self.scope.watch(fingerprint, on_change));
    }
}

fn apply_classes(target: &mut dyn ClassTarget, mode: VisibilityMode, truthy: bool) {
    match (mode, truthy) {
        (VisibilityMode::Show, true) => target.add_class(SHOW_CLASS),
        (VisibilityMode::Show, false) => target.remove_class(SHOW_CLASS),
        (VisibilityMode::Hide, true) => target.add_class(HIDE_CLASS),
        (VisibilityMode::Hide, false) => target.remove_class(HIDE_CLASS),
        (VisibilityMode::Toggle, true) => {
            target.remove_class(HIDE_CLASS);
            target.add_class(SHOW_CLASS);
        }
        (VisibilityMode::Toggle, false) => {
            target.remove_class(SHOW_CLASS);
            target.add_class(HIDE_CLASS);
        }
    }
}

impl std::fmt::Debug for VisibilityBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityBinding")
            .field("mode", &self.mode)
            .finish()
    }
}
