//! Scheduling core: records, groups, and the scheduler.
//!
//! The only public API from this module is [`Scheduler`] and the [`State`]
//! it reports from queries.
//!
//! Internal modules:
//! - [`record`]: per-process scheduling metadata and the state machine;
//! - [`group`]: per-group exclusivity slots;
//! - [`scheduler`]: registration, displacement, sequencing, tick.

mod group;
mod record;
mod scheduler;

pub use record::State;
pub use scheduler::Scheduler;
