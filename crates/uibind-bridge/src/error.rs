#![forbid(unsafe_code)]

//! Binding error taxonomy.
//!
//! Structural problems (missing capability, malformed configuration) are
//! fatal at bind time. Per-event problems surface as `Result`s at the call
//! site and are logged, never allowed to unwind the scheduler. Validation
//! failures are not errors at all; they travel through validity flags on
//! the [`FieldController`](crate::FieldController).

use core::fmt;

use uibind_scope::ScopeError;

use crate::widget::WidgetError;

/// Errors raised by bindings and the sync bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// A required widget method is absent from the driver's capability
    /// descriptor. Raised at bind time only.
    MissingCapability { widget: String, method: String },
    /// Declared options or a combination spec could not be interpreted.
    /// Raised at bind time only.
    MalformedConfig(String),
    /// A value pushed across the bridge has the wrong type.
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },
    /// An operation needed a live widget instance and none exists.
    NoInstance { widget: String },
    /// The widget collaborator failed.
    Widget(WidgetError),
    /// The scope scheduler failed.
    Scope(ScopeError),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCapability { widget, method } => {
                write!(f, "widget '{widget}' has no method '{method}'")
            }
            Self::MalformedConfig(msg) => write!(f, "malformed configuration: {msg}"),
            Self::TypeMismatch { expected, actual } => {
                write!(f, "expected a {expected} value, got {actual}")
            }
            Self::NoInstance { widget } => {
                write!(f, "widget '{widget}' has no live instance")
            }
            Self::Widget(e) => write!(f, "widget error: {e}"),
            Self::Scope(e) => write!(f, "scope error: {e}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Widget(e) => Some(e),
            Self::Scope(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WidgetError> for BindError {
    fn from(e: WidgetError) -> Self {
        Self::Widget(e)
    }
}

impl From<ScopeError> for BindError {
    fn from(e: ScopeError) -> Self {
        Self::Scope(e)
    }
}
