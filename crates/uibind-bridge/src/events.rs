#![forbid(unsafe_code)]

//! Named-event fan-out for host surfaces.
//!
//! An [`EventHub`] stands in for a host element's native event surface:
//! adapters subscribe by event name and receive the event payload plus any
//! extra arguments the emitter supplied. Subscriptions are RAII
//! [`HandlerGuard`]s; dropping a guard (or the binding that holds it)
//! removes the handler before the next emit.
//!
//! Handlers fire in registration order. Emission snapshots the handler
//! list first, so a handler may subscribe or unsubscribe without
//! corrupting the in-flight emit.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use uibind_scope::Value;

type Handler = Rc<dyn Fn(&Value, &[Value])>;

struct HandlerSlot {
    id: u64,
    handler: Handler,
}

struct HubInner {
    handlers: RefCell<AHashMap<String, Vec<HandlerSlot>>>,
    next_id: Cell<u64>,
}

/// Clone-able named-event multiplexer.
#[derive(Clone)]
pub struct EventHub {
    inner: Rc<HubInner>,
}

/// RAII guard for one subscription.
pub struct HandlerGuard {
    hub: Weak<HubInner>,
    event: String,
    id: u64,
}

impl Drop for HandlerGuard {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            if let Some(slots) = hub.handlers.borrow_mut().get_mut(&self.event) {
                slots.retain(|slot| slot.id != self.id);
            }
        }
    }
}

impl std::fmt::Debug for HandlerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerGuard")
            .field("event", &self.event)
            .finish()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHub {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(HubInner {
                handlers: RefCell::new(AHashMap::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Subscribe to a named event.
    #[must_use]
    pub fn on(&self, event: impl Into<String>, handler: impl Fn(&Value, &[Value]) + 'static) -> HandlerGuard {
        let event = event.into();
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .handlers
            .borrow_mut()
            .entry(event.clone())
            .or_default()
            .push(HandlerSlot {
                id,
                handler: Rc::new(handler),
            });
        HandlerGuard {
            hub: Rc::downgrade(&self.inner),
            event,
            id,
        }
    }

    /// Emit an event. Returns the number of handlers that ran.
    pub fn emit(&self, event: &str, payload: &Value, params: &[Value]) -> usize {
        let snapshot: Vec<Handler> = self
            .inner
            .handlers
            .borrow()
            .get(event)
            .map(|slots| slots.iter().map(|s| Rc::clone(&s.handler)).collect())
            .unwrap_or_default();
        for handler in &snapshot {
            handler(payload, params);
        }
        snapshot.len()
    }

    /// Number of live handlers for an event.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner
            .handlers
            .borrow()
            .get(event)
            .map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.inner.handlers.borrow();
        let total: usize = handlers.values().map(Vec::len).sum();
        f.debug_struct("EventHub")
            .field("events", &handlers.len())
            .field("handlers", &total)
            .finish()
    }
}
