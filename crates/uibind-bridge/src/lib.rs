#![forbid(unsafe_code)]

//! Synchronization bridge between a reactive scope and imperative widgets.
//!
//! This crate provides the machinery every adapter binding is built from:
//!
//! - [`ConfigMap`] / [`ConfigRegistry`]: layered widget configuration with
//!   copy-on-merge assembly (builtin defaults → registry shared config →
//!   per-instance declared options).
//! - [`WidgetDriver`] / [`WidgetInstance`]: the widget collaborator seam.
//!   Drivers declare a capability descriptor; required methods are
//!   validated once at bind time, never at call time.
//! - [`SyncBridge`]: idempotent teardown-then-recreate of one widget
//!   instance per binding, with an explicit reentrancy guard and a
//!   generation counter.
//! - [`FieldController`]: the duplex value channel (parser/formatter
//!   chains, named validity flags, render sink).
//! - [`EventHub`]: named-event fan-out with RAII handler guards.
//!
//! # Invariants
//!
//! 1. Assembling an effective configuration never mutates its inputs.
//! 2. Tearing down an absent widget handle is a no-op, not an error.
//! 3. A rebuild triggered from within a rebuild is suppressed, not
//!    recursed into.
//! 4. Handlers bound to a previous widget handle are invalidated by a
//!    rebuild; the re-bind hook runs against every new handle.

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod field;
pub mod widget;

pub use bridge::SyncBridge;
pub use config::{ConfigMap, ConfigRegistry};
pub use error::BindError;
pub use events::{EventHub, HandlerGuard};
pub use field::FieldController;
pub use widget::{WidgetDriver, WidgetError, WidgetInstance};
