#![forbid(unsafe_code)]

//! Date picker binding.
//!
//! Two independent channels run through this adapter:
//!
//! - **Configuration**: the effective configuration (declared options over
//!   shared defaults) is deep-compared as the watch fingerprint; any
//!   change tears the picker down and recreates it.
//! - **Value**: a [`FieldController`] duplex channel. View edits (typed
//!   text, widget picks) run the parser chain and land in the model
//!   inside a transaction; model changes run the formatter chain and are
//!   pushed to the widget's displayed value.
//!
//! The channels never cross: pushing a value cannot change the
//! configuration fingerprint, so a keystroke never recreates the widget.
//!
//! Values pushed to the widget must be `Date` (or `Null` to clear);
//! anything else is a `TypeMismatch`, surfaced, never coerced; install a
//! [`DateFormat`] when the model stores strings.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;
use uibind_bridge::{
    BindError, ConfigMap, ConfigRegistry, FieldController, SyncBridge, WidgetDriver,
};
use uibind_scope::{CivilDate, Expr, Locals, Scope, Value, WatchHandle};

/// Binds a date picker widget to a model path.
pub struct DateBinding {
    scope: Scope,
    bridge: Rc<SyncBridge>,
    field: FieldController,
    model_path: String,
    options: Option<Expr>,
    watches: RefCell<Vec<WatchHandle>>,
    last_error: Rc<RefCell<Option<BindError>>>,
}

impl DateBinding {
    /// Shared-config kind key for this binding.
    pub const KIND: &'static str = "date";

    /// Create the binding. The driver must expose `set_date` and
    /// `get_date`.
    pub fn new(
        scope: &Scope,
        driver: Rc<dyn WidgetDriver>,
        registry: Rc<ConfigRegistry>,
        model_path: impl Into<String>,
        options: Option<Expr>,
    ) -> Result<Rc<Self>, BindError> {
        let bridge = Rc::new(SyncBridge::new(
            driver,
            registry,
            Self::KIND,
            ConfigMap::new(),
            &["set_date", "get_date"],
        )?);
        let field = FieldController::new();
        let last_error = Rc::new(RefCell::new(None));

        let binding = Rc::new(Self {
            scope: scope.clone(),
            bridge: Rc::clone(&bridge),
            field: field.clone(),
            model_path: model_path.into(),
            options,
            watches: RefCell::new(Vec::new()),
            last_error: Rc::clone(&last_error),
        });

        // Parsed view values land in the model. The sink runs inside the
        // transaction started by notify_*.
        let sink_scope = scope.clone();
        let sink_path = binding.model_path.clone();
        field.set_model_sink(move |value| sink_scope.set(&sink_path, value.clone()));

        // Formatted model values are pushed to the live widget.
        let render_bridge = Rc::clone(&bridge);
        let render_error = Rc::clone(&last_error);
        field.set_render(move |value| {
            if let Err(e) = push_to_widget(&render_bridge, value) {
                error!(kind = DateBinding::KIND, error = %e, "date display failed");
                *render_error.borrow_mut() = Some(e);
            }
        });

        scope.on_destroy(move || bridge.teardown());
        Ok(binding)
    }

    /// The field controller (for installing formats and validators).
    #[must_use]
    pub fn field(&self) -> &FieldController {
        &self.field
    }

    /// Register the configuration and value watchers. The first digest
    /// builds the widget and displays the current model value.
    pub fn attach(&self) {
        let mut watches = self.watches.borrow_mut();
        watches.clear();

        // Configuration channel: deep-compare the effective configuration.
        let bridge = Rc::clone(&self.bridge);
        let options = self.options.clone();
        let field = self.field.clone();
        let config_fingerprint = {
            let bridge = Rc::clone(&bridge);
            let options = options.clone();
            move |scope: &Scope| {
                let declared = declared_options(options.as_ref(), scope);
                bridge.effective(&declared).to_value()
            }
        };
        let config_on_change = move |_: &Value, _: &Value, scope: &Scope| {
            let declared = declared_options(options.as_ref(), scope);
            match bridge.rebuild(&declared) {
                // Re-display onto the freshly created handle.
                Ok(true) => field.render_now(),
                Ok(false) => {}
                Err(e) => error!(kind = DateBinding::KIND, error = %e, "date rebuild failed"),
            }
        };
        watches.push(self.scope.watch(config_fingerprint, config_on_change));

        // Value channel: independent of the configuration watcher.
        let path = self.model_path.clone();
        let field = self.field.clone();
        watches.push(self.scope.watch(
            move |scope: &Scope| scope.get(&path),
            move |new: &Value, _: &Value, _: &Scope| field.set_model_value(new.clone()),
        ));
    }

    /// Widget-originated pick: route the selected value through the
    /// parser chain into the model, inside one transaction.
    pub fn notify_select(&self, value: Value) {
        self.push_view_value(value);
    }

    /// Direct edit of the bound input (typed text).
    pub fn notify_input(&self, value: Value) {
        self.push_view_value(value);
    }

    fn push_view_value(&self, value: Value) {
        let field = self.field.clone();
        let result = self.scope.apply(move |_| field.set_view_value(value));
        if let Err(e) = result {
            error!(kind = Self::KIND, error = %e, "view value transaction failed");
        }
    }

    /// Most recent surfaced error (e.g. a type mismatch), if any.
    #[must_use]
    pub fn take_error(&self) -> Option<BindError> {
        self.last_error.borrow_mut().take()
    }

    /// Completed rebuild count of the underlying bridge.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.bridge.generation()
    }

    /// Whether a live widget instance exists.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.bridge.is_live()
    }
}

fn declared_options(options: Option<&Expr>, scope: &Scope) -> ConfigMap {
    let value = options.map_or(Value::Null, |e| e.eval(scope, &Locals::new()));
    match ConfigMap::from_value(&value) {
        Ok(map) => map,
        Err(msg) => {
            error!(kind = DateBinding::KIND, %msg, "declared options ignored");
            ConfigMap::new()
        }
    }
}

fn push_to_widget(bridge: &SyncBridge, value: &Value) -> Result<(), BindError> {
    match value {
        Value::Date(_) | Value::Null => {
            if bridge.is_live() {
                bridge.invoke("set_date", std::slice::from_ref(value))?;
            }
            Ok(())
        }
        other => Err(BindError::TypeMismatch {
            expected: "date",
            actual: other.type_name().to_owned(),
        }),
    }
}

impl std::fmt::Debug for DateBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateBinding")
            .field("model_path", &self.model_path)
            .field("live", &self.bridge.is_live())
            .field("generation", &self.bridge.generation())
            .finish()
    }
}

/// Parser/formatter pair converting between string model values and
/// `Date` view values.
pub struct DateFormat;

impl DateFormat {
    /// Install ISO-8601 conversion on a field: string model values format
    /// into `Date` view values, and `Date` view values parse back into
    /// ISO strings. Unparseable strings stop the chain (value becomes
    /// `Null`); non-string, non-date values pass through the formatter
    /// untouched so plain `Date` models keep working.
    pub fn install_iso(field: &FieldController) {
        field.push_formatter(Rc::new(|value| match value {
            Value::Str(s) => CivilDate::parse_iso(s).ok().map(Value::Date),
            other => Some(other.clone()),
        }));
        field.push_parser(Rc::new(|value| match value {
            Value::Date(d) => Some(Value::Str(d.to_string())),
            Value::Null => Some(Value::Null),
            _ => None,
        }));
    }
}
