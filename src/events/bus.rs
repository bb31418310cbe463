//! Synchronous publish/subscribe bus for named events.
//!
//! [`EventBus`] decouples producers (input edges, lifecycle transitions) from
//! consumers (subsystem behaviors). Dispatch is synchronous and runs on the
//! caller's thread, in subscription order, over a **snapshot** of the listener
//! list taken at trigger time: subscriptions and unsubscriptions performed by
//! a listener during dispatch do not affect the current pass.
//!
//! ## Rules
//! - Listener identity is the `Rc` allocation; subscribing the same handle
//!   twice is a no-op.
//! - Triggering an event with zero subscribers is a no-op, never an error.
//! - A listener returning [`ListenerError`](crate::ListenerError) does not
//!   abort dispatch; the bus logs a diagnostic and continues.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::warn;

use crate::events::listener::ListenerRef;

/// Named-event publish/subscribe bus with synchronous dispatch.
///
/// Single-threaded by design: handles are `Rc`-based and the bus is `!Send`.
/// A multi-threaded host must serialize access to the scheduler/bus pair
/// behind its own lock.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<String, Vec<ListenerRef>>>,
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `listener` to `event`.
    ///
    /// Idempotent: if a clone of the same `Rc` is already subscribed to this
    /// event, nothing changes.
    pub fn subscribe(&self, event: impl Into<String>, listener: ListenerRef) {
        let event = event.into();
        let mut listeners = self.listeners.borrow_mut();
        let entry = listeners.entry(event).or_default();
        if !entry.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            entry.push(listener);
        }
    }

    /// Batch-subscribes a set of `(event, listener)` pairs.
    pub fn subscribe_all<S, I>(&self, entries: I)
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, ListenerRef)>,
    {
        for (event, listener) in entries {
            self.subscribe(event, listener);
        }
    }

    /// Removes one listener from `event` (matched by `Rc` identity).
    ///
    /// Unknown events or listeners are ignored.
    pub fn unsubscribe(&self, event: &str, listener: &ListenerRef) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(entry) = listeners.get_mut(event) {
            entry.retain(|l| !Rc::ptr_eq(l, listener));
            if entry.is_empty() {
                listeners.remove(event);
            }
        }
    }

    /// Removes all listeners for `event`, or every listener on the bus when
    /// `event` is `None`.
    pub fn unsubscribe_all(&self, event: Option<&str>) {
        let mut listeners = self.listeners.borrow_mut();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    /// Returns how many listeners are currently subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    /// Synchronously invokes every listener subscribed to `event`, in
    /// subscription order, passing `payload`.
    ///
    /// Dispatch operates on a snapshot, so listeners may subscribe,
    /// unsubscribe, or trigger further events without affecting the current
    /// pass. Listener errors are logged and skipped.
    pub fn trigger(&self, event: &str, payload: Option<&dyn Any>) {
        let snapshot: Vec<ListenerRef> = match self.listeners.borrow().get(event) {
            Some(entry) => entry.clone(),
            None => return,
        };

        for listener in snapshot {
            if let Err(err) = listener.on_event(event, payload) {
                warn!(
                    event,
                    listener = listener.name(),
                    label = err.as_label(),
                    "listener error: {}",
                    err.as_message()
                );
            }
        }
    }
}
