//! # Process abstractions.
//!
//! This module provides the core process-related types:
//! - [`Process`] - trait for implementing cooperatively scheduled work
//! - [`Outcome`] - what a step reports back to the scheduler
//! - [`ProcessFn`] - function-backed process implementation

mod process;
mod process_fn;

pub use process::{Outcome, Process};
pub use process_fn::ProcessFn;
