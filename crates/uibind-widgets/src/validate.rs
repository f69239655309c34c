#![forbid(unsafe_code)]

//! Validation binding.
//!
//! Installs declared validators as both parsers and formatters on a
//! [`FieldController`], so validation triggers on view edits and model
//! changes alike. Each validator evaluates its expression with the
//! candidate value injected as `$value`, sets its named validity flag,
//! and passes the value through on success, or stops the chain on
//! failure, leaving the produced value `Null` (the undefined marker).
//!
//! A validation failure is an expected negative outcome, not an error:
//! nothing is thrown, the flag flips.
//!
//! The optional watch declaration re-runs validators against the current
//! model value when unrelated model paths change, without requiring the
//! validated field's own value to move.

use std::cell::RefCell;
use std::rc::Rc;

use uibind_bridge::FieldController;
use uibind_scope::{Expr, Locals, Scope, Value, WatchHandle};

/// Implicit key used when a single bare expression is declared.
pub const DEFAULT_KEY: &str = "validator";

/// Declared validators: one bare expression, or an ordered map of error
/// key → expression.
pub enum ValidatorSpec {
    Single(Expr),
    Keyed(Vec<(String, Expr)>),
}

/// Companion watch declaration.
pub enum ValidateWatch {
    /// Re-run every validator when the expression's value changes.
    All(Expr),
    /// Re-run only the named validator when its expression changes.
    Keyed(Vec<(String, Expr)>),
}

type ValidatorFn = Rc<dyn Fn(&Value) -> Option<Value>>;

/// Binds declared validators to a field.
pub struct ValidateBinding {
    scope: Scope,
    field: FieldController,
    validators: Vec<(String, ValidatorFn)>,
    watches: RefCell<Vec<WatchHandle>>,
}

impl ValidateBinding {
    /// Install the declared validators on the field. Installation order
    /// is declaration order.
    pub fn new(scope: &Scope, field: &FieldController, spec: ValidatorSpec) -> Rc<Self> {
        let pairs = match spec {
            ValidatorSpec::Single(expr) => vec![(DEFAULT_KEY.to_owned(), expr)],
            ValidatorSpec::Keyed(pairs) => pairs,
        };
        let mut validators: Vec<(String, ValidatorFn)> = Vec::with_capacity(pairs.len());
        for (key, expr) in pairs {
            let validator = make_validator(scope, field, &key, expr);
            field.push_parser(Rc::clone(&validator));
            field.push_formatter(Rc::clone(&validator));
            validators.push((key, validator));
        }
        Rc::new(Self {
            scope: scope.clone(),
            field: field.clone(),
            validators,
            watches: RefCell::new(Vec::new()),
        })
    }

    /// Register the companion watch declaration.
    pub fn watch(&self, declaration: ValidateWatch) {
        let mut watches = self.watches.borrow_mut();
        match declaration {
            ValidateWatch::All(expr) => {
                let validators: Vec<ValidatorFn> =
                    self.validators.iter().map(|(_, v)| Rc::clone(v)).collect();
                let field = self.field.clone();
                watches.push(self.scope.watch_expr(expr, move |_, _, _| {
                    let current = field.model_value();
                    for validator in &validators {
                        let _ = validator(&current);
                    }
                }));
            }
            ValidateWatch::Keyed(pairs) => {
                for (key, expr) in pairs {
                    let Some((_, validator)) =
                        self.validators.iter().find(|(k, _)| *k == key)
                    else {
                        continue;
                    };
                    let validator = Rc::clone(validator);
                    let field = self.field.clone();
                    watches.push(self.scope.watch_expr(expr, move |_, _, _| {
                        let _ = validator(&field.model_value());
                    }));
                }
            }
        }
    }

    /// Declared validator keys, in installation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.validators.iter().map(|(k, _)| k.as_str())
    }
}

fn make_validator(scope: &Scope, field: &FieldController, key: &str, expr: Expr) -> ValidatorFn {
    let scope = scope.clone();
    let field = field.clone();
    let key = key.to_owned();
    Rc::new(move |value: &Value| {
        let verdict = expr.eval(&scope, &Locals::new().with("$value", value.clone()));
        if verdict.is_truthy() {
            field.set_validity(key.clone(), true);
            Some(value.clone())
        } else {
            field.set_validity(key.clone(), false);
            None
        }
    })
}

impl std::fmt::Debug for ValidateBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidateBinding")
            .field("validators", &self.validators.len())
            .finish()
    }
}
