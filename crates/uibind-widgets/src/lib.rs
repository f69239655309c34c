#![forbid(unsafe_code)]

//! Adapter bindings for uibind.
//!
//! Each module instantiates the sync bridge for one widget family or host
//! concern: the adapter supplies the fingerprint function, the merge
//! policy, the forward call surface, and (where the widget talks back)
//! reverse propagation into the model.

pub mod calendar;
pub mod conditional;
pub mod date;
pub mod event;
pub mod keymap;
pub mod plugin;
pub mod validate;
pub mod visibility;

pub use calendar::{CalendarBinding, source_fingerprint};
pub use conditional::{AttachState, ConditionalBinding, Template};
pub use date::{DateBinding, DateFormat};
pub use event::EventBinding;
pub use keymap::{Combination, KeyEvent, KeyMode, KeypressBinding, Modifiers};
pub use plugin::PluginBinding;
pub use validate::{ValidateBinding, ValidateWatch, ValidatorSpec};
pub use visibility::{ClassTarget, VisibilityBinding, VisibilityMode};
