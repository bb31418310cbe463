//! Error types used by the event bus and its listeners.
//!
//! The scheduler itself reports recoverable conditions through `bool`/`Option`
//! returns so that a control loop never aborts on a misbehaving process; the
//! one place an error *value* crosses an API boundary is a listener rejecting
//! an event, which [`EventBus::trigger`](crate::EventBus::trigger) catches and
//! reports as a diagnostic.
//!
//! [`ListenerError`] provides helper methods (`as_label`, `as_message`) for
//! logging and metrics.

use thiserror::Error;

/// # Errors produced by event listeners.
///
/// Returned from [`Listen::on_event`](crate::Listen::on_event). A listener
/// error never aborts dispatch: the bus logs it and continues with the
/// remaining listeners for the same trigger.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The listener could not handle the event.
    #[error("listener failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The payload did not have the type the listener expected.
    #[error("unexpected payload for event {event:?}")]
    BadPayload {
        /// Name of the triggered event.
        event: String,
    },
}

impl ListenerError {
    /// Builds a [`ListenerError::Failed`] from any displayable error.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        ListenerError::Failed {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tickvisor::ListenerError;
    ///
    /// let err = ListenerError::failed("boom");
    /// assert_eq!(err.as_label(), "listener_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ListenerError::Failed { .. } => "listener_failed",
            ListenerError::BadPayload { .. } => "listener_bad_payload",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ListenerError::Failed { error } => format!("error: {error}"),
            ListenerError::BadPayload { event } => format!("bad payload for event: {event}"),
        }
    }
}
