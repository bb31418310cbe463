//! # Function-backed process (`ProcessFn`)
//!
//! [`ProcessFn`] wraps a step closure `F: FnMut(Duration) -> Outcome` so small
//! behaviors can be scheduled without a dedicated type. Lifecycle hooks are
//! optional and attached with the `with_*` builders.
//!
//! ## Example
//! ```
//! use std::time::Duration;
//! use tickvisor::{Outcome, ProcessFn, Scheduler};
//!
//! let sched = Scheduler::new();
//! let mut count = 0;
//! let blink = ProcessFn::boxed("blink", move |_elapsed: Duration| {
//!     count += 1;
//!     if count >= 3 { Outcome::Finished } else { Outcome::Continue }
//! });
//!
//! assert!(sched.start(blink, None, false));
//! ```

use std::borrow::Cow;
use std::time::Duration;

use crate::processes::process::{Outcome, Process};

/// Function-backed process implementation.
///
/// Owns a step closure plus optional boxed lifecycle hooks. Prefer
/// [`ProcessFn::boxed`] when the value is handed straight to
/// [`Scheduler::start`](crate::Scheduler::start).
pub struct ProcessFn<F> {
    name: Cow<'static, str>,
    step: F,
    on_start: Option<Box<dyn FnMut()>>,
    on_finish: Option<Box<dyn FnMut()>>,
    on_fail: Option<Box<dyn FnMut()>>,
}

impl<F> ProcessFn<F>
where
    F: FnMut(Duration) -> Outcome + 'static,
{
    /// Creates a new function-backed process.
    pub fn new(name: impl Into<Cow<'static, str>>, step: F) -> Self {
        Self {
            name: name.into(),
            step,
            on_start: None,
            on_finish: None,
            on_fail: None,
        }
    }

    /// Creates the process already boxed for registration.
    pub fn boxed(name: impl Into<Cow<'static, str>>, step: F) -> Box<Self> {
        Box::new(Self::new(name, step))
    }

    /// Attaches an `on_start` hook.
    pub fn with_on_start(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Attaches an `on_finish` hook.
    pub fn with_on_finish(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_finish = Some(Box::new(hook));
        self
    }

    /// Attaches an `on_fail` hook.
    pub fn with_on_fail(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_fail = Some(Box::new(hook));
        self
    }
}

impl<F> Process for ProcessFn<F>
where
    F: FnMut(Duration) -> Outcome + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_start(&mut self) {
        if let Some(hook) = self.on_start.as_mut() {
            hook();
        }
    }

    fn on_finish(&mut self) {
        if let Some(hook) = self.on_finish.as_mut() {
            hook();
        }
    }

    fn on_fail(&mut self) {
        if let Some(hook) = self.on_fail.as_mut() {
            hook();
        }
    }

    fn step(&mut self, elapsed: Duration) -> Outcome {
        (self.step)(elapsed)
    }
}
