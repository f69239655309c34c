#![forbid(unsafe_code)]

//! Expressions evaluated against a scope.
//!
//! An [`Expr`] is the Rust-side stand-in for a declared attribute
//! expression: a closure over the scope plus whatever [`Locals`] the caller
//! injects at evaluation time (`$value` in validators, `$event`/`$params`
//! in event handlers). Expressions are cheap to clone and share.

use std::rc::Rc;

use crate::scope::Scope;
use crate::value::Value;

/// Injected evaluation-time values, in insertion order.
///
/// Lookups are linear; locals carry at most a handful of entries.
#[derive(Clone, Default)]
pub struct Locals {
    entries: Vec<(String, Value)>,
}

impl Locals {
    /// No injected values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    /// Look up an injected value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Locals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// An expression evaluable against a [`Scope`] with injected [`Locals`].
#[derive(Clone)]
pub struct Expr {
    eval: Rc<dyn Fn(&Scope, &Locals) -> Value>,
}

impl Expr {
    /// Wrap a closure as an expression.
    pub fn new(f: impl Fn(&Scope, &Locals) -> Value + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// An expression that reads a dotted model path.
    #[must_use]
    pub fn path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(move |scope, _| scope.get(&path))
    }

    /// A constant expression.
    #[must_use]
    pub fn constant(value: Value) -> Self {
        Self::new(move |_, _| value.clone())
    }

    /// Evaluate against the scope.
    #[must_use]
    pub fn eval(&self, scope: &Scope, locals: &Locals) -> Value {
        (self.eval)(scope, locals)
    }
}

impl std::fmt::Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expr").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_lookup() {
        let locals = Locals::new()
            .with("$value", Value::Int(7))
            .with("$event", Value::from("click"));
        assert_eq!(locals.get("$value"), Some(&Value::Int(7)));
        assert_eq!(locals.get("$event"), Some(&Value::from("click")));
        assert_eq!(locals.get("$params"), None);
        assert!(!locals.is_empty());
    }

    #[test]
    fn constant_expr() {
        let scope = Scope::root();
        let e = Expr::constant(Value::Int(42));
        assert_eq!(e.eval(&scope, &Locals::new()), Value::Int(42));
    }

    #[test]
    fn path_expr_reads_model() {
        let scope = Scope::root();
        scope.set("user.name", Value::from("ada"));
        let e = Expr::path("user.name");
        assert_eq!(e.eval(&scope, &Locals::new()), Value::from("ada"));
        assert_eq!(Expr::path("user.missing").eval(&scope, &Locals::new()), Value::Null);
    }

    #[test]
    fn closure_expr_sees_locals() {
        let scope = Scope::root();
        let e = Expr::new(|_, locals| {
            let v = locals.get("$value").and_then(Value::as_f64).unwrap_or(0.0);
            Value::Bool(v > 5.0)
        });
        let yes = Locals::new().with("$value", Value::Int(10));
        let no = Locals::new().with("$value", Value::Int(3));
        assert_eq!(e.eval(&scope, &yes), Value::Bool(true));
        assert_eq!(e.eval(&scope, &no), Value::Bool(false));
    }
}
