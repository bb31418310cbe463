//! # Host-driver helper for mode-based control loops.
//!
//! [`HostDriver`] implements the host side of the lifecycle contract: it maps
//! operating modes to event names, triggers the mode's lifecycle event, and
//! then ticks the scheduler - always in that order, on the same thread.
//!
//! The host stays in charge of cadence: it calls [`HostDriver::enter`] once
//! at a mode boundary and [`HostDriver::cycle`] once per control cycle. The
//! driver measures the elapsed time between cycles itself; the first cycle
//! after `enter` uses [`DriverConfig::fallback_period`].
//!
//! ## Event names
//! ```text
//! Mode::Autonomous  enter -> "auto.init"      cycle -> "auto.periodic"
//! Mode::Teleop      enter -> "teleop.init"    cycle -> "teleop.periodic"
//! ```
//!
//! ## Example
//! ```
//! use std::rc::Rc;
//! use tickvisor::{DriverConfig, EventBus, HostDriver, Mode, Scheduler};
//!
//! let sched = Rc::new(Scheduler::new());
//! let bus = Rc::new(EventBus::new());
//! let driver = HostDriver::new(sched, bus, DriverConfig::default());
//!
//! driver.enter(Mode::Teleop);
//! driver.cycle(Mode::Teleop); // once per control cycle
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::core::Scheduler;
use crate::events::EventBus;

/// Operating mode of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Autonomous,
    Teleop,
}

impl Mode {
    /// Event triggered once when the mode is entered.
    pub fn init_event(self) -> &'static str {
        match self {
            Mode::Autonomous => "auto.init",
            Mode::Teleop => "teleop.init",
        }
    }

    /// Event triggered on every cycle of the mode, before the tick.
    pub fn periodic_event(self) -> &'static str {
        match self {
            Mode::Autonomous => "auto.periodic",
            Mode::Teleop => "teleop.periodic",
        }
    }
}

/// Configuration for [`HostDriver`].
///
/// ## Field semantics
/// - `fallback_period`: elapsed time assumed for the first cycle after
///   [`HostDriver::enter`], before a real inter-cycle measurement exists.
///   Defaults to 20 ms (a 50 Hz control loop).
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Elapsed time assumed when no previous cycle has been observed.
    pub fallback_period: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            fallback_period: Duration::from_millis(20),
        }
    }
}

/// Lifecycle driver tying an [`EventBus`] and a [`Scheduler`] together.
///
/// Guarantees the ordering the core relies on: the mode's lifecycle event is
/// triggered before the corresponding tick, on the caller's thread.
pub struct HostDriver {
    scheduler: Rc<Scheduler>,
    bus: Rc<EventBus>,
    config: DriverConfig,
    last_cycle: Cell<Option<Instant>>,
}

impl HostDriver {
    /// Creates a driver over an existing scheduler/bus pair.
    pub fn new(scheduler: Rc<Scheduler>, bus: Rc<EventBus>, config: DriverConfig) -> Self {
        Self {
            scheduler,
            bus,
            config,
            last_cycle: Cell::new(None),
        }
    }

    /// Signals a mode boundary: triggers the mode's init event and resets the
    /// cycle clock.
    pub fn enter(&self, mode: Mode) {
        debug!(mode = ?mode, "entering mode");
        self.last_cycle.set(None);
        self.bus.trigger(mode.init_event(), None);
    }

    /// Runs one control cycle: triggers the mode's periodic event, then ticks
    /// the scheduler with the measured elapsed time.
    pub fn cycle(&self, mode: Mode) {
        let now = Instant::now();
        let elapsed = match self.last_cycle.get() {
            Some(previous) => now.duration_since(previous),
            None => self.config.fallback_period,
        };
        self.last_cycle.set(Some(now));

        self.bus.trigger(mode.periodic_event(), None);
        self.scheduler.tick(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ListenerFn;
    use crate::processes::{Outcome, ProcessFn};
    use crate::State;
    use std::cell::RefCell;

    #[test]
    fn lifecycle_event_fires_before_tick() {
        let sched = Rc::new(Scheduler::new());
        let bus = Rc::new(EventBus::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let order_in = order.clone();
        bus.subscribe(
            "teleop.periodic",
            ListenerFn::rc("order", move |_event, _payload| {
                order_in.borrow_mut().push("event");
                Ok(())
            }),
        );
        let order_in = order.clone();
        sched.start(
            ProcessFn::boxed("probe", move |_elapsed| {
                order_in.borrow_mut().push("step");
                Outcome::Continue
            }),
            None,
            false,
        );

        let driver = HostDriver::new(sched.clone(), bus, DriverConfig::default());
        driver.enter(Mode::Teleop);
        driver.cycle(Mode::Teleop); // promotes the record
        driver.cycle(Mode::Teleop); // first step

        assert_eq!(*order.borrow(), vec!["event", "event", "step"]);
        assert_eq!(sched.query_state("probe"), Some(State::Running));
    }

    #[test]
    fn listener_started_process_runs_in_later_cycles() {
        let sched = Rc::new(Scheduler::new());
        let bus = Rc::new(EventBus::new());

        let sched_in = sched.clone();
        bus.subscribe(
            "auto.init",
            ListenerFn::rc("routine", move |_event, _payload| {
                sched_in.start(
                    ProcessFn::boxed("routine", |_elapsed| Outcome::Finished),
                    Some("drive"),
                    false,
                );
                Ok(())
            }),
        );

        let driver = HostDriver::new(sched.clone(), bus, DriverConfig::default());
        driver.enter(Mode::Autonomous);
        assert_eq!(sched.query_state("routine"), Some(State::Started));

        driver.cycle(Mode::Autonomous); // promote
        driver.cycle(Mode::Autonomous); // step signals Finished
        assert_eq!(sched.query_state("routine"), None);
    }
}
