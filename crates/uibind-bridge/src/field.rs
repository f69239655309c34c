#![forbid(unsafe_code)]

//! Duplex field controller.
//!
//! A [`FieldController`] is the value channel between a host input field
//! and the model: view edits run the parser chain and land in the model
//! sink; model changes run the formatter chain and land in the render
//! sink. Validators hang named validity flags off the same pipeline.
//!
//! # Invariants
//!
//! 1. Parsers run in registration order; formatters run in reverse
//!    registration order (the last-installed formatter sees the raw model
//!    value first).
//! 2. A pipeline stage returning `None` marks the value invalid: the
//!    chain stops and the produced value is `Null` (the undefined
//!    marker).
//! 3. The value channel never touches widget configuration; pushing a
//!    value cannot trigger a configuration rebuild.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use uibind_scope::Value;

/// One pipeline stage. `None` stops the chain and yields `Null`.
pub type PipeFn = dyn Fn(&Value) -> Option<Value>;

struct FieldInner {
    view_value: RefCell<Value>,
    model_value: RefCell<Value>,
    parsers: RefCell<Vec<Rc<PipeFn>>>,
    formatters: RefCell<Vec<Rc<PipeFn>>>,
    validity: RefCell<AHashMap<String, bool>>,
    render: RefCell<Option<Box<dyn Fn(&Value)>>>,
    model_sink: RefCell<Option<Box<dyn Fn(&Value)>>>,
}

/// Clone-able handle to one field's duplex channel.
#[derive(Clone)]
pub struct FieldController {
    inner: Rc<FieldInner>,
}

impl Default for FieldController {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(FieldInner {
                view_value: RefCell::new(Value::Null),
                model_value: RefCell::new(Value::Null),
                parsers: RefCell::new(Vec::new()),
                formatters: RefCell::new(Vec::new()),
                validity: RefCell::new(AHashMap::new()),
                render: RefCell::new(None),
                model_sink: RefCell::new(None),
            }),
        }
    }

    /// Append a parser (view → model direction).
    pub fn push_parser(&self, parser: Rc<PipeFn>) {
        self.inner.parsers.borrow_mut().push(parser);
    }

    /// Append a formatter (model → view direction).
    pub fn push_formatter(&self, formatter: Rc<PipeFn>) {
        self.inner.formatters.borrow_mut().push(formatter);
    }

    /// Install the sink receiving parsed model values.
    pub fn set_model_sink(&self, sink: impl Fn(&Value) + 'static) {
        *self.inner.model_sink.borrow_mut() = Some(Box::new(sink));
    }

    /// Install the render sink receiving formatted view values.
    pub fn set_render(&self, render: impl Fn(&Value) + 'static) {
        *self.inner.render.borrow_mut() = Some(Box::new(render));
    }

    /// Set a named validity flag.
    pub fn set_validity(&self, key: impl Into<String>, valid: bool) {
        self.inner.validity.borrow_mut().insert(key.into(), valid);
    }

    /// Read a named validity flag.
    #[must_use]
    pub fn validity(&self, key: &str) -> Option<bool> {
        self.inner.validity.borrow().get(key).copied()
    }

    /// Whether every validity flag is currently true.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.validity.borrow().values().all(|v| *v)
    }

    #[must_use]
    pub fn view_value(&self) -> Value {
        self.inner.view_value.borrow().clone()
    }

    #[must_use]
    pub fn model_value(&self) -> Value {
        self.inner.model_value.borrow().clone()
    }

    /// View edit entry point: store the view value, run the parser chain,
    /// store the result, and feed the model sink.
    pub fn set_view_value(&self, value: Value) {
        *self.inner.view_value.borrow_mut() = value.clone();
        let parsers: Vec<Rc<PipeFn>> = self.inner.parsers.borrow().clone();
        let parsed = run_chain(value, parsers.iter());
        *self.inner.model_value.borrow_mut() = parsed.clone();
        if let Some(sink) = self.inner.model_sink.borrow().as_ref() {
            sink(&parsed);
        }
    }

    /// Model change entry point: store the model value, run the formatter
    /// chain in reverse order, store the result, and render it.
    pub fn set_model_value(&self, value: Value) {
        *self.inner.model_value.borrow_mut() = value.clone();
        let formatters: Vec<Rc<PipeFn>> = self.inner.formatters.borrow().clone();
        let formatted = run_chain(value, formatters.iter().rev());
        *self.inner.view_value.borrow_mut() = formatted.clone();
        if let Some(render) = self.inner.render.borrow().as_ref() {
            render(&formatted);
        }
    }

    /// Re-render the current view value.
    pub fn render_now(&self) {
        if let Some(render) = self.inner.render.borrow().as_ref() {
            render(&self.inner.view_value.borrow());
        }
    }
}

fn run_chain<'a>(start: Value, stages: impl Iterator<Item = &'a Rc<PipeFn>>) -> Value {
    let mut current = start;
    for stage in stages {
        match stage(&current) {
            Some(next) => current = next,
            None => return Value::Null,
        }
    }
    current
}

impl std::fmt::Debug for FieldController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldController")
            .field("view", &self.view_value())
            .field("model", &self.model_value())
            .field("valid", &self.is_valid())
            .finish()
    }
}
