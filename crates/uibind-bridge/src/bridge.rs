#![forbid(unsafe_code)]

//! The rebuild engine.
//!
//! A [`SyncBridge`] owns exactly one widget handle for one binding. Each
//! rebuild assembles the effective configuration, tears the old handle
//! down (absent handle: no-op), creates a fresh instance from the driver,
//! and runs the re-bind hook so handlers attach to the new handle.
//!
//! # Invariants
//!
//! 1. Required methods are validated against the driver's capability
//!    descriptor in `new`; `rebuild` never discovers a missing method.
//! 2. Rebuild is idempotent: two rebuilds with the same effective
//!    configuration leave the same observable widget state.
//! 3. A rebuild triggered from within a rebuild (widget callback → model
//!    mutation → watcher → rebuild) is suppressed by an explicit guard,
//!    not broken by luck. The guard resets even if the driver panics.
//! 4. The generation counter increments once per completed rebuild.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};
use uibind_scope::Value;

use crate::config::{ConfigMap, ConfigRegistry};
use crate::error::BindError;
use crate::widget::{WidgetDriver, WidgetInstance};

/// Hook run after each rebuild with the new handle and its configuration.
pub type RebuildHook = Rc<dyn Fn(&mut dyn WidgetInstance, &ConfigMap)>;

/// Resets the in-rebuild flag even on unwind.
struct RebuildGuard<'a>(&'a Cell<bool>);

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Owns the widget handle and the model→widget rebuild path for one
/// binding instance.
pub struct SyncBridge {
    driver: Rc<dyn WidgetDriver>,
    registry: Rc<ConfigRegistry>,
    kind: String,
    builtin: ConfigMap,
    handle: RefCell<Option<Box<dyn WidgetInstance>>>,
    rebuild_hook: RefCell<Option<RebuildHook>>,
    rebuilding: Cell<bool>,
    generation: Cell<u64>,
}

impl SyncBridge {
    /// Create a bridge for one binding. `kind` keys the registry's shared
    /// configuration layer; `builtin` is the adapter's own defaults.
    /// Every method in `required` must appear in the driver's capability
    /// descriptor, otherwise binding fails here and now.
    pub fn new(
        driver: Rc<dyn WidgetDriver>,
        registry: Rc<ConfigRegistry>,
        kind: impl Into<String>,
        builtin: ConfigMap,
        required: &[&str],
    ) -> Result<Self, BindError> {
        let capabilities = driver.capabilities();
        for method in required {
            if !capabilities.contains(method) {
                return Err(BindError::MissingCapability {
                    widget: driver.name().to_owned(),
                    method: (*method).to_owned(),
                });
            }
        }
        Ok(Self {
            driver,
            registry,
            kind: kind.into(),
            builtin,
            handle: RefCell::new(None),
            rebuild_hook: RefCell::new(None),
            rebuilding: Cell::new(false),
            generation: Cell::new(0),
        })
    }

    /// Install the hook that re-binds handlers on every new handle.
    pub fn set_rebuild_hook(&self, hook: impl Fn(&mut dyn WidgetInstance, &ConfigMap) + 'static) {
        *self.rebuild_hook.borrow_mut() = Some(Rc::new(hook));
    }

    /// Assemble the effective configuration for `declared` without
    /// touching the widget.
    #[must_use]
    pub fn effective(&self, declared: &ConfigMap) -> ConfigMap {
        ConfigMap::assemble(&self.builtin, self.registry.shared(&self.kind), declared)
    }

    fn effective_with_base(&self, base: &ConfigMap, declared: &ConfigMap) -> ConfigMap {
        let lower = ConfigMap::assemble(&self.builtin, None, base);
        ConfigMap::assemble(&lower, self.registry.shared(&self.kind), declared)
    }

    /// Tear down and recreate the widget handle with the effective
    /// configuration. Returns `Ok(false)` when suppressed by the
    /// reentrancy guard, `Ok(true)` on a completed rebuild.
    pub fn rebuild(&self, declared: &ConfigMap) -> Result<bool, BindError> {
        self.rebuild_with_base(&ConfigMap::new(), declared)
    }

    /// Like [`SyncBridge::rebuild`], with an extra per-rebuild layer of
    /// defaults sitting between the builtin defaults and the shared
    /// configuration. Adapters use this for state computed at rebuild
    /// time (e.g. carrying a widget's current view across recreation).
    pub fn rebuild_with_base(
        &self,
        base: &ConfigMap,
        declared: &ConfigMap,
    ) -> Result<bool, BindError> {
        if self.rebuilding.get() {
            debug!(kind = %self.kind, "nested rebuild suppressed");
            return Ok(false);
        }
        self.rebuilding.set(true);
        let _guard = RebuildGuard(&self.rebuilding);

        let effective = self.effective_with_base(base, declared);
        self.teardown();
        let mut instance = self.driver.create(&effective)?;
        let hook = self.rebuild_hook.borrow().clone();
        if let Some(hook) = hook {
            hook(instance.as_mut(), &effective);
        }
        *self.handle.borrow_mut() = Some(instance);
        self.generation.set(self.generation.get() + 1);
        trace!(kind = %self.kind, generation = self.generation.get(), "rebuilt widget");
        Ok(true)
    }

    /// Destroy the current handle, if any. Absent handle: no-op.
    pub fn teardown(&self) {
        if let Some(mut old) = self.handle.borrow_mut().take() {
            old.destroy();
        }
    }

    /// Invoke a method on the live handle.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, BindError> {
        let mut handle = self.handle.borrow_mut();
        let instance = handle.as_mut().ok_or_else(|| BindError::NoInstance {
            widget: self.driver.name().to_owned(),
        })?;
        instance.invoke(method, args).map_err(BindError::Widget)
    }

    /// Whether a live handle exists.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.handle.borrow().is_some()
    }

    /// Completed rebuild count. Bumps once per rebuild; a stable
    /// generation across a digest proves no rebuild happened.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// The driver's widget family name.
    #[must_use]
    pub fn widget_name(&self) -> &str {
        self.driver.name()
    }
}

impl std::fmt::Debug for SyncBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBridge")
            .field("kind", &self.kind)
            .field("widget", &self.driver.name())
            .field("live", &self.is_live())
            .field("generation", &self.generation.get())
            .finish()
    }
}
