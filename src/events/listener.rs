//! # Core listener trait
//!
//! `Listen` is the extension point for reacting to named events on the
//! [`EventBus`](crate::EventBus). Listeners are held as `Rc<dyn Listen>`; the
//! `Rc` allocation is the listener's identity, so subscribing clones of the
//! same `Rc` twice is a no-op.
//!
//! ## Contract
//! - `on_event` runs synchronously on the control-loop thread and must not
//!   block; long work belongs in a scheduled [`Process`](crate::Process).
//! - Returning an error does **not** abort dispatch to the remaining
//!   listeners; the bus reports it as a diagnostic and moves on.

use std::any::Any;
use std::rc::Rc;

use crate::error::ListenerError;

/// Shared handle to a listener (`Rc<dyn Listen>`).
pub type ListenerRef = Rc<dyn Listen>;

/// Contract for event listeners.
///
/// Called synchronously from [`EventBus::trigger`](crate::EventBus::trigger)
/// in subscription order. Implementations may call back into the scheduler or
/// the bus; such re-entrant mutations take effect after the current dispatch
/// pass.
pub trait Listen {
    /// Handles a single triggered event.
    ///
    /// # Parameters
    /// - `event`: name of the triggered event
    /// - `payload`: optional payload supplied by the trigger; downcast with
    ///   [`Any::downcast_ref`]
    fn on_event(&self, event: &str, payload: Option<&dyn Any>) -> Result<(), ListenerError>;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
