//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints every event it is subscribed to on stdout in a
//! human-readable format. This is primarily useful for development,
//! debugging, and examples.
//!
//! ## Output format
//! ```text
//! [12:31:04.209] [event] teleop.init
//! [12:31:04.229] [event] teleop.periodic (payload)
//! ```

use std::any::Any;

use crate::error::ListenerError;
use crate::events::Listen;

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Prints a timestamped line per
/// triggered event for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Listen`] for
/// structured logging or telemetry.
#[derive(Default)]
pub struct LogWriter;

impl Listen for LogWriter {
    fn name(&self) -> &str {
        "log-writer"
    }

    fn on_event(&self, event: &str, payload: Option<&dyn Any>) -> Result<(), ListenerError> {
        let now = chrono::Local::now().format("%H:%M:%S%.3f");
        if payload.is_some() {
            println!("[{now}] [event] {event} (payload)");
        } else {
            println!("[{now}] [event] {event}");
        }
        Ok(())
    }
}
