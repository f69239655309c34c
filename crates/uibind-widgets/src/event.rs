#![forbid(unsafe_code)]

//! General-purpose event binding.
//!
//! Maps host event names to expressions. On firing, the expression is
//! evaluated with two injected locals, `$event` (the raw payload) and
//! `$params` (any extra arguments the emitter supplied beyond the
//! payload), inside one mutation transaction, so scope watchers observe
//! the result immediately.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;
use uibind_bridge::{EventHub, HandlerGuard};
use uibind_scope::{Expr, Locals, Scope, Value};

/// Binds named host events to expressions.
pub struct EventBinding {
    scope: Scope,
    handlers: Vec<(String, Expr)>,
    guards: RefCell<Vec<HandlerGuard>>,
}

impl EventBinding {
    pub fn new(scope: &Scope, handlers: Vec<(String, Expr)>) -> Self {
        Self {
            scope: scope.clone(),
            handlers,
            guards: RefCell::new(Vec::new()),
        }
    }

    /// Deliver an event directly. Every declared handler for `name` runs,
    /// in declaration order. Returns how many ran.
    pub fn dispatch(&self, name: &str, event: &Value, params: &[Value]) -> usize {
        let mut fired = 0;
        for (declared, expr) in &self.handlers {
            if declared != name {
                continue;
            }
            fired += 1;
            run_handler(&self.scope, expr, event, params);
        }
        fired
    }

    /// Subscribe every declared handler to a host event hub. Guards are
    /// held by the binding; dropping the binding unsubscribes.
    pub fn attach(&self, hub: &EventHub) {
        let mut guards = self.guards.borrow_mut();
        guards.clear();
        for (name, expr) in &self.handlers {
            let scope = self.scope.clone();
            let expr = expr.clone();
            guards.push(hub.on(name.clone(), move |payload, params| {
                run_handler(&scope, &expr, payload, params);
            }));
        }
    }
}

fn run_handler(scope: &Scope, expr: &Expr, event: &Value, params: &[Value]) {
    let locals = Locals::new()
        .with("$event", event.clone())
        .with("$params", Value::List(params.to_vec()));
    let expr = expr.clone();
    let result = scope.apply(move |scope| {
        expr.eval(scope, &locals);
    });
    if let Err(e) = result {
        error!(error = %e, "event handler transaction failed");
    }
}

impl std::fmt::Debug for EventBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBinding")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn dispatch_evaluates_matching_handlers() {
        let scope = Scope::root();
        scope.set("counter", Value::Int(0));
        let binding = EventBinding::new(
            &scope,
            vec![
                (
                    "focus".into(),
                    Expr::new(|scope, _| {
                        let n = scope.get("counter").as_i64().unwrap_or(0);
                        scope.set("counter", Value::Int(n + 1));
                        Value::Null
                    }),
                ),
                ("blur".into(), Expr::constant(Value::Null)),
            ],
        );
        assert_eq!(binding.dispatch("focus", &Value::Null, &[]), 1);
        assert_eq!(binding.dispatch("focus", &Value::Null, &[]), 1);
        assert_eq!(scope.get("counter"), Value::Int(2));
        assert_eq!(binding.dispatch("unknown", &Value::Null, &[]), 0);
    }

    #[test]
    fn event_and_params_injected() {
        let scope = Scope::root();
        let seen = Rc::new(RefCell::new((Value::Null, Value::Null)));
        let s = Rc::clone(&seen);
        let binding = EventBinding::new(
            &scope,
            vec![(
                "custom".into(),
                Expr::new(move |_, locals| {
                    *s.borrow_mut() = (
                        locals.get("$event").cloned().unwrap_or(Value::Null),
                        locals.get("$params").cloned().unwrap_or(Value::Null),
                    );
                    Value::Null
                }),
            )],
        );
        binding.dispatch("custom", &Value::from("payload"), &[Value::Int(1), Value::Int(2)]);
        let (event, params) = seen.borrow().clone();
        assert_eq!(event, Value::from("payload"));
        assert_eq!(params, Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn mutation_runs_inside_transaction() {
        let scope = Scope::root();
        scope.set("n", Value::Int(0));
        let observed = Rc::new(Cell::new(0i64));
        let o = Rc::clone(&observed);
        let _w = scope.watch(
            |scope| scope.get("n"),
            move |new, _, _| o.set(new.as_i64().unwrap_or(0)),
        );
        scope.flush().unwrap();

        let binding = EventBinding::new(
            &scope,
            vec![(
                "click".into(),
                Expr::new(|scope, _| {
                    scope.set("n", Value::Int(42));
                    Value::Null
                }),
            )],
        );
        binding.dispatch("click", &Value::Null, &[]);
        assert_eq!(observed.get(), 42, "watchers flushed by the handler transaction");
    }

    #[test]
    fn hub_attachment_delivers() {
        let scope = Scope::root();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let binding = EventBinding::new(
            &scope,
            vec![(
                "change".into(),
                Expr::new(move |_, _| {
                    h.set(h.get() + 1);
                    Value::Null
                }),
            )],
        );
        let hub = EventHub::new();
        binding.attach(&hub);
        hub.emit("change", &Value::Null, &[]);
        assert_eq!(hits.get(), 1);
        drop(binding);
        hub.emit("change", &Value::Null, &[]);
        assert_eq!(hits.get(), 1, "dropping the binding unsubscribes");
    }
}
