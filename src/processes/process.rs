//! # Process abstraction for cooperatively scheduled work.
//!
//! This module defines the [`Process`] trait (synchronous, nonblocking) and the
//! [`Outcome`] a step reports back to the scheduler.
//!
//! A process is stepped once per control cycle while it is running. A step must
//! run to completion without blocking; work that needs to wait for a condition
//! tracks it as local state and re-checks on the next cycle.

use std::time::Duration;

/// What a single [`Process::step`] call tells the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep stepping this process on future ticks.
    Continue,
    /// The process is done; the scheduler tears it down via the same path as
    /// an explicit [`Scheduler::finish`](crate::Scheduler::finish).
    Finished,
    /// The process hit an unmet precondition; torn down via
    /// [`Scheduler::fail`](crate::Scheduler::fail).
    Failed,
}

/// # Mutually-exclusive, sequenceable unit of periodic work.
///
/// A `Process` has a stable [`name`](Process::name) (its registry identity), a
/// [`step`](Process::step) called once per tick while running, and lifecycle
/// hooks invoked by the scheduler on the matching transitions. The scheduler
/// takes exclusive ownership of every registered instance as
/// `Box<dyn Process>`; any state a process needs lives inside the concrete
/// type.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use tickvisor::{Outcome, Process};
///
/// struct Rotate {
///     remaining: Duration,
/// }
///
/// impl Process for Rotate {
///     fn name(&self) -> &str {
///         "rotate"
///     }
///
///     fn step(&mut self, elapsed: Duration) -> Outcome {
///         self.remaining = self.remaining.saturating_sub(elapsed);
///         if self.remaining.is_zero() {
///             Outcome::Finished
///         } else {
///             Outcome::Continue
///         }
///     }
/// }
/// ```
pub trait Process {
    /// Returns a stable, human-readable process name.
    ///
    /// The name is the registry key: two processes with the same name cannot
    /// be registered at the same time.
    fn name(&self) -> &str;

    /// Called once, synchronously, when the process is registered.
    fn on_start(&mut self) {}

    /// Called once when the process reaches `Finished` (explicitly or
    /// step-signaled) before it is released.
    fn on_finish(&mut self) {}

    /// Called once when the process reaches `Failed` before it is released.
    fn on_fail(&mut self) {}

    /// Advances the process by one control cycle.
    ///
    /// `elapsed` is the time since the previous tick. Must not block or
    /// suspend; there is no preemption inside a cycle.
    fn step(&mut self, elapsed: Duration) -> Outcome;
}
