//! Built-in listeners.
//!
//! Only [`LogWriter`] lives here for now; real integrations (telemetry,
//! dashboards) belong to the host and implement [`Listen`](crate::Listen)
//! themselves.

mod log;

pub use log::LogWriter;
