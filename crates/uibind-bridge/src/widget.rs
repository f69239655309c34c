#![forbid(unsafe_code)]

//! The widget collaborator seam.
//!
//! A [`WidgetDriver`] is the factory and capability descriptor for one
//! widget family; a [`WidgetInstance`] is one live, stateful widget
//! attached to one host node. Instances are synchronous and safe to
//! destroy-then-recreate; the bridge never patches one in place unless an
//! adapter explicitly does so through `invoke`.
//!
//! Capability validation happens once, at bind time, against
//! [`WidgetDriver::capabilities`]: an unknown method is a configuration
//! defect, not a runtime condition.

use core::fmt;

use uibind_scope::Value;

use crate::config::ConfigMap;

/// Errors from the widget collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    /// `invoke` was called with a method the instance does not implement.
    UnknownMethod { widget: String, method: String },
    /// The widget failed internally.
    Failed { widget: String, message: String },
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMethod { widget, method } => {
                write!(f, "widget '{widget}' cannot invoke unknown method '{method}'")
            }
            Self::Failed { widget, message } => {
                write!(f, "widget '{widget}' failed: {message}")
            }
        }
    }
}

impl std::error::Error for WidgetError {}

/// One live widget instance.
pub trait WidgetInstance {
    /// Invoke a widget method with positional arguments.
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, WidgetError>;

    /// Release widget resources. Called once, before the instance is
    /// dropped on rebuild or final teardown.
    fn destroy(&mut self) {}
}

/// Factory and capability descriptor for a widget family.
pub trait WidgetDriver {
    /// Widget family name, used in configuration keys and diagnostics.
    fn name(&self) -> &str;

    /// Methods instances of this driver respond to. Validated against a
    /// binding's required methods at bind time.
    fn capabilities(&self) -> &[&str];

    /// Create a fresh instance configured with `config`.
    fn create(&self, config: &ConfigMap) -> Result<Box<dyn WidgetInstance>, WidgetError>;
}
