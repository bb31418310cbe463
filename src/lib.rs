//! # tickvisor
//!
//! **Tickvisor** is a cooperative task-orchestration core for fixed-rate
//! control loops.
//!
//! It provides two tightly coupled primitives: a [`Scheduler`] for
//! mutually-exclusive, sequenceable units of periodic work ("processes"),
//! and a synchronous [`EventBus`] that decouples producers (input edges,
//! lifecycle transitions) from consumers (subsystem behaviors). The crate is
//! designed as the orchestration layer under a host-owned control loop, e.g.
//! a robot's periodic cycle.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!       host driver (external, fixed cadence)
//!          │ trigger(lifecycle event)        │ tick(elapsed)
//!          ▼                                 ▼
//! ┌─────────────────────┐          ┌──────────────────────────────┐
//! │      EventBus       │          │   Scheduler                  │
//! │  named events       │          │   - registry (name-keyed)    │
//! │  snapshot dispatch  │          │   - group exclusivity slots  │
//! └──────┬──────────────┘          │   - child sequencing         │
//!        │ on_event()              │   - per-tick state machine   │
//!        ▼                         └──────┬───────────────────────┘
//!   subsystem listeners                   │ step(elapsed)
//!        │ start()/start_sequence()       ▼
//!        └───────────────────────► Box<dyn Process>
//!                                  (on_start / step / on_finish / on_fail)
//! ```
//!
//! Steps and listeners may call back into the scheduler and the bus
//! synchronously, within the same tick; both tolerate re-entrant mutation
//! (snapshot dispatch on the bus, deferred teardown in the scheduler).
//!
//! ### Lifecycle
//! ```text
//! start() ──► Started ──next tick──► Running ──step──► Continue  (keep)
//!                                     │   ▲            Finished  (finish path)
//!            group start: default ────┘   │            Failed    (fail path)
//!            becomes Interrupted,         │
//!            non-default is Finished      └──next tick── Resumed ◄── group
//!                                                                    control
//!                                                                    returns
//! ```
//!
//! ## Features
//! | Area           | Description                                                   | Key types / traits           |
//! |----------------|---------------------------------------------------------------|------------------------------|
//! | **Processes**  | Define periodic work as types or closures.                    | [`Process`], [`ProcessFn`]   |
//! | **Scheduling** | Groups, interruption/resumption, sequencing, queries.         | [`Scheduler`], [`State`]     |
//! | **Events**     | Named events, snapshot dispatch, isolated listener failures.  | [`EventBus`], [`Listen`], [`ListenerFn`] |
//! | **Errors**     | Typed listener errors with log-friendly labels.               | [`ListenerError`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//! - `driver`: exposes the [`HostDriver`] lifecycle helper and [`Mode`] map.
//!
//! ## Example
//! ```
//! use std::time::Duration;
//! use tickvisor::{Outcome, ProcessFn, Scheduler};
//!
//! let sched = Scheduler::new();
//!
//! // A default behavior holds the "drive" group whenever nothing else runs.
//! sched.start(
//!     ProcessFn::boxed("drive-idle", |_elapsed| Outcome::Continue),
//!     Some("drive"),
//!     true,
//! );
//!
//! // A timed action takes the group over and gives it back when done.
//! let mut remaining = Duration::from_millis(60);
//! sched.start(
//!     ProcessFn::boxed("rotate-90", move |elapsed| {
//!         remaining = remaining.saturating_sub(elapsed);
//!         if remaining.is_zero() {
//!             Outcome::Finished
//!         } else {
//!             Outcome::Continue
//!         }
//!     }),
//!     Some("drive"),
//!     false,
//! );
//!
//! // Host control loop: one tick per cycle.
//! for _ in 0..6 {
//!     sched.tick(Duration::from_millis(20));
//! }
//! assert_eq!(sched.query_state("rotate-90"), None);
//! assert!(sched.contains("drive-idle"));
//! ```

mod core;
mod error;
mod events;
mod processes;

// ---- Public re-exports ----

pub use crate::core::{Scheduler, State};
pub use crate::error::ListenerError;
pub use crate::events::{EventBus, Listen, ListenerFn, ListenerRef};
pub use crate::processes::{Outcome, Process, ProcessFn};

// Optional: expose the host-driver lifecycle helper.
// Enable with: `--features driver`
#[cfg(feature = "driver")]
mod driver;
#[cfg(feature = "driver")]
pub use crate::driver::{DriverConfig, HostDriver, Mode};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
mod listeners;
#[cfg(feature = "logging")]
pub use crate::listeners::LogWriter;
