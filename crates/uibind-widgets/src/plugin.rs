#![forbid(unsafe_code)]

//! Generic plugin binding.
//!
//! Invokes one declared method on an arbitrary widget with merged options
//! (shared defaults for the widget's name overlaid by declared options).
//! The method is validated against the driver's capability descriptor at
//! bind time — a missing method fails the binding immediately, never a
//! later call.
//!
//! Invocation is deferred by one scheduler tick so it runs after the
//! current digest settles: model mutations are visible to the host before
//! the widget reads them. An optional refresh expression re-fires the
//! (deferred) invocation on every change.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::error;
use uibind_bridge::{BindError, ConfigMap, ConfigRegistry, SyncBridge, WidgetDriver};
use uibind_scope::{Expr, Locals, Scope, Value, WatchHandle};

/// Binds one widget method invocation to the scope, with optional
/// refresh-driven re-invocation.
pub struct PluginBinding {
    scope: Scope,
    bridge: Rc<SyncBridge>,
    method: String,
    options: Option<Expr>,
    refresh: Option<Expr>,
    watch: RefCell<Option<WatchHandle>>,
}

impl PluginBinding {
    /// Create the binding. Shared configuration is keyed by the driver's
    /// widget name. `method` must be in the driver's capabilities.
    pub fn new(
        scope: &Scope,
        driver: Rc<dyn WidgetDriver>,
        registry: Rc<ConfigRegistry>,
        method: impl Into<String>,
        options: Option<Expr>,
        refresh: Option<Expr>,
    ) -> Result<Rc<Self>, BindError> {
        let method = method.into();
        let kind = driver.name().to_owned();
        let bridge = Rc::new(SyncBridge::new(
            driver,
            registry,
            kind,
            ConfigMap::new(),
            &[method.as_str()],
        )?);
        let teardown = Rc::clone(&bridge);
        scope.on_destroy(move || teardown.teardown());
        Ok(Rc::new(Self {
            scope: scope.clone(),
            bridge,
            method,
            options,
            refresh,
            watch: RefCell::new(None),
        }))
    }

    /// Register the invocation watcher. With no refresh expression the
    /// plugin is invoked once (deferred) on the first digest; with one,
    /// every change of the refresh value re-invokes.
    pub fn attach(&self) {
        let fingerprint = self
            .refresh
            .clone()
            .unwrap_or_else(|| Expr::constant(Value::Null));

        let bridge = Rc::clone(&self.bridge);
        let method = self.method.clone();
        let options = self.options.clone();
        let on_change = move |_: &Value, _: &Value, scope: &Scope| {
            schedule_invoke(scope, &bridge, &method, options.as_ref());
        };

        *self.watch.borrow_mut() = Some(self.scope.watch_expr(fingerprint, on_change));
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

fn schedule_invoke(scope: &Scope, bridge: &Rc<SyncBridge>, method: &str, options: Option<&Expr>) {
    let bridge = Rc::clone(bridge);
    let method = method.to_owned();
    let options = options.cloned();
    let scheduler = scope.clone();
    let scope = scope.clone();
    scheduler.defer(move || {
        let declared_value = options
            .as_ref()
            .map_or(Value::Null, |e| e.eval(&scope, &Locals::new()));
        let declared = match ConfigMap::from_value(&declared_value) {
            Ok(map) => map,
            Err(msg) => {
                error!(widget = bridge.widget_name(), %msg, "plugin options ignored");
                ConfigMap::new()
            }
        };
        let result = (|| -> Result<(), BindError> {
            if !bridge.is_live() {
                bridge.rebuild(&declared)?;
            }
            let effective = bridge.effective(&declared);
            bridge.invoke(&method, &[effective.to_value()])?;
            Ok(())
        })();
        if let Err(e) = result {
            error!(widget = bridge.widget_name(), error = %e, "plugin invocation failed");
        }
    });
}

impl std::fmt::Debug for PluginBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginBinding")
            .field("widget", &self.bridge.widget_name())
            .field("method", &self.method)
            .finish()
    }
}
