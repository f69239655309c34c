#![forbid(unsafe_code)]

//! Calendar binding.
//!
//! Watches a declared collection of event sources through a weighted
//! length fingerprint and rebuilds the calendar widget on change. The
//! fingerprint is a heuristic, not a precise change detector: it sums the
//! lengths of all inner sequences plus the outer length, so a push/pop
//! inside a nested source is seen cheaply without deep equality. Replacing
//! an element with another of equal length is invisible to it; that is an
//! accepted limitation, and the `equals_tracker` expression exists as the
//! escape hatch: callers bump a counter to force a rebuild the heuristic
//! cannot see.
//!
//! Rebuilds capture the widget's current view (`get_view`) before
//! teardown and feed it back as `default_view`, below the shared and
//! declared layers, so navigation state survives recreation.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{error, warn};
use uibind_bridge::{BindError, ConfigMap, ConfigRegistry, SyncBridge, WidgetDriver};
use uibind_scope::{Expr, Locals, Scope, Value, WatchHandle};

/// Weighted length fingerprint over a source collection.
///
/// `tracker = Σ len(e) for sequence elements e; fingerprint = tracker +
/// len(sources) + equals_tracker` (the tracker term is included only when
/// numeric). Non-sequence elements (e.g. external query descriptors)
/// contribute only to the outer length.
#[must_use]
pub fn source_fingerprint(sources: &Value, equals_tracker: &Value) -> Value {
    let mut total: i64 = 0;
    if let Some(items) = sources.as_list() {
        total += items.len() as i64;
        for item in items {
            if let Some(inner) = item.as_list() {
                total += inner.len() as i64;
            }
        }
    }
    match equals_tracker {
        Value::Int(n) => Value::Int(total + n),
        Value::Float(f) => Value::Float(total as f64 + f),
        _ => Value::Int(total),
    }
}

/// Binds a calendar widget to a declared source collection.
pub struct CalendarBinding {
    scope: Scope,
    bridge: Rc<SyncBridge>,
    sources: Expr,
    equals_tracker: Option<Expr>,
    options: Option<Expr>,
    watch: RefCell<Option<WatchHandle>>,
}

impl CalendarBinding {
    /// Shared-config kind key for this binding.
    pub const KIND: &'static str = "calendar";

    /// Create the binding. The driver must expose `get_view`; that is
    /// validated here, not at rebuild time.
    pub fn new(
        scope: &Scope,
        driver: Rc<dyn WidgetDriver>,
        registry: Rc<ConfigRegistry>,
        sources: Expr,
        equals_tracker: Option<Expr>,
        options: Option<Expr>,
    ) -> Result<Rc<Self>, BindError> {
        let bridge = Rc::new(SyncBridge::new(
            driver,
            registry,
            Self::KIND,
            ConfigMap::new(),
            &["get_view"],
        )?);
        let binding = Rc::new(Self {
            scope: scope.clone(),
            bridge: Rc::clone(&bridge),
            sources,
            equals_tracker,
            options,
            watch: RefCell::new(None),
        });
        scope.on_destroy(move || bridge.teardown());
        Ok(binding)
    }

    /// Register the source watcher. The first digest after attach
    /// performs the initial build.
    pub fn attach(&self) {
        let sources = self.sources.clone();
        let tracker = self.equals_tracker.clone();
        let tracker_warned = Rc::new(Cell::new(false));
        let fingerprint = move |scope: &Scope| {
            let sources = sources.eval(scope, &Locals::new());
            let tracker = tracker
                .as_ref()
                .map_or(Value::Null, |e| e.eval(scope, &Locals::new()));
            if !tracker.is_null() && !tracker.is_numeric() && !tracker_warned.replace(true) {
                warn!(
                    kind = CalendarBinding::KIND,
                    tracker_type = tracker.type_name(),
                    "non-numeric equals tracker ignored"
                );
            }
            source_fingerprint(&sources, &tracker)
        };

        let bridge = Rc::clone(&self.bridge);
        let sources = self.sources.clone();
        let options = self.options.clone();
        let on_change = move |_: &Value, _: &Value, scope: &Scope| {
            if let Err(e) = rebuild(&bridge, &sources, options.as_ref(), scope) {
                error!(kind = CalendarBinding::KIND, error = %e, "calendar rebuild failed");
            }
        };

        *self.watch.borrow_mut() = Some(self.scope.watch(fingerprint, on_change));
    }

    /// Force a rebuild outside the watcher (e.g. host-driven refresh).
    pub fn rebuild_now(&self) -> Result<(), BindError> {
        rebuild(&self.bridge, &self.sources, self.options.as_ref(), &self.scope)
    }

    /// Invoke a method on the live calendar widget (e.g. navigation).
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, BindError> {
        self.bridge.invoke(method, args)
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

fn rebuild(
    bridge: &SyncBridge,
    sources: &Expr,
    options: Option<&Expr>,
    scope: &Scope,
) -> Result<(), BindError> {
    let declared_value = options.map_or(Value::Null, |e| e.eval(scope, &Locals::new()));
    let declared = ConfigMap::from_value(&declared_value).map_err(BindError::MalformedConfig)?;

    let mut base = ConfigMap::new();
    base.insert("event_sources", sources.eval(scope, &Locals::new()));
    if bridge.is_live() {
        // Carry the current view across recreation; shared config and
        // declared options may still override it.
        if let Ok(view) = bridge.invoke("get_view", &[]) {
            if !view.is_null() {
                base.insert("default_view", view);
            }
        }
    }
    bridge.rebuild_with_base(&base, &declared)?;
    Ok(())
}

impl std::fmt::Debug for CalendarBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalendarBinding")
            .field("live", &self.bridge.is_live())
            .field("generation", &self.bridge.generation())
            .finish()
    }
}
