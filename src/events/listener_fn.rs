//! # Function-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(&str, Option<&dyn Any>) -> Result<(),
//! ListenerError>` so a handler can be subscribed without a dedicated type.
//!
//! ## Example
//! ```
//! use std::any::Any;
//! use tickvisor::{EventBus, ListenerError, ListenerFn};
//!
//! let bus = EventBus::new();
//! let hello = ListenerFn::rc("hello", |_event: &str, _payload: Option<&dyn Any>| {
//!     println!("mode entered");
//!     Ok(())
//! });
//!
//! bus.subscribe("teleop.init", hello);
//! bus.trigger("teleop.init", None);
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::rc::Rc;

use crate::error::ListenerError;
use crate::events::listener::Listen;

/// Function-backed listener implementation.
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F>
where
    F: Fn(&str, Option<&dyn Any>) -> Result<(), ListenerError> + 'static,
{
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::rc`] when you immediately need a
    /// [`ListenerRef`](crate::ListenerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the listener and returns it as a shared handle (`Rc<Self>`).
    ///
    /// Keep a clone of the returned handle if you intend to unsubscribe it
    /// later; the `Rc` allocation is the listener's identity.
    pub fn rc(name: impl Into<Cow<'static, str>>, f: F) -> Rc<Self> {
        Rc::new(Self::new(name, f))
    }
}

impl<F> Listen for ListenerFn<F>
where
    F: Fn(&str, Option<&dyn Any>) -> Result<(), ListenerError> + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &str, payload: Option<&dyn Any>) -> Result<(), ListenerError> {
        (self.f)(event, payload)
    }
}
