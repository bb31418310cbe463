//! Named events: listener contract and synchronous bus.
//!
//! This module groups the event **extension point** and the **bus** used by
//! input edges and lifecycle transitions to reach subsystem behaviors.
//!
//! ## Contents
//! - [`Listen`], [`ListenerRef`] listener contract and shared handle
//! - [`ListenerFn`] function-backed listener
//! - [`EventBus`] snapshot-dispatch publish/subscribe

mod bus;
mod listener;
mod listener_fn;

pub use bus::EventBus;
pub use listener::{Listen, ListenerRef};
pub use listener_fn::ListenerFn;
