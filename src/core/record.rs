//! # Scheduling state and per-process record.
//!
//! [`State`] is the scheduler-side lifecycle of a registered process, with a
//! validated transition table. [`ProcessRecord`] wraps one owned process
//! instance together with its scheduling metadata; records are only modified
//! by the [`Scheduler`](crate::Scheduler).
//!
//! ## Lifecycle
//! ```text
//! start() ──► Started ──next tick──► Running ◄──next tick── Resumed
//!                │                    │  ▲                     ▲
//!                │     group start ───┘  └─── group returns ───┘
//!                │                    │        (Interrupted)
//!                ▼                    ▼
//!            Finished / Failed (terminal, record removed)
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use tracing::error;

use crate::processes::Process;

/// Scheduler-side state of a registered process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Registered this cycle; `on_start` has run, first step happens after
    /// the next tick promotes the record to `Running`.
    Started,
    /// Stepped once per tick.
    Running,
    /// Displaced group default; waits for group control to return.
    Interrupted,
    /// Group control returned; promoted to `Running` and stepped on the next
    /// tick.
    Resumed,
    /// Terminal: completed. The record is removed from the registry.
    Finished,
    /// Terminal: signaled an unmet precondition. The record is removed.
    Failed,
}

impl State {
    /// Returns true for `Finished`/`Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Finished | State::Failed)
    }

    /// Returns true for states holding a group slot
    /// (`Started`/`Running`/`Resumed`).
    pub fn is_active(self) -> bool {
        matches!(self, State::Started | State::Running | State::Resumed)
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            State::Started => "started",
            State::Running => "running",
            State::Interrupted => "interrupted",
            State::Resumed => "resumed",
            State::Finished => "finished",
            State::Failed => "failed",
        }
    }

    /// Validates one edge of the transition table.
    pub(crate) fn can_transition_to(self, next: State) -> bool {
        use State::*;
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (_, Started) => false,
            (Started | Resumed, Running) => true,
            (Started | Running | Resumed, Interrupted) => true,
            (Interrupted, Resumed) => true,
            (_, Finished | Failed) => true,
            _ => false,
        }
    }
}

/// Terminal outcome applied during teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminal {
    Finished,
    Failed,
}

impl Terminal {
    pub(crate) fn state(self) -> State {
        match self {
            Terminal::Finished => State::Finished,
            Terminal::Failed => State::Failed,
        }
    }
}

/// Terminal outcome requested while the record's process was executing.
///
/// Applied when the process is checked back in; `sequence` remembers whether
/// child sequencing / default resumption should run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingTerminal {
    pub terminal: Terminal,
    pub sequence: bool,
}

/// Scheduling metadata wrapping one owned process instance.
pub(crate) struct ProcessRecord {
    /// The owned process; `None` while checked out into user code.
    pub process: Option<Box<dyn Process>>,
    pub state: State,
    pub group: Option<String>,
    pub group_default: bool,
    /// Not-yet-started processes queued to run after this record finishes.
    pub children: VecDeque<Box<dyn Process>>,
    pub started_at: Instant,
    pub last_run_at: Option<Instant>,
    pub pending: Option<PendingTerminal>,
}

impl ProcessRecord {
    pub fn new(
        process: Box<dyn Process>,
        group: Option<String>,
        group_default: bool,
        children: VecDeque<Box<dyn Process>>,
    ) -> Self {
        Self {
            process: Some(process),
            state: State::Started,
            group,
            group_default,
            children,
            started_at: Instant::now(),
            last_run_at: None,
            pending: None,
        }
    }

    /// Applies a validated state transition.
    ///
    /// Illegal transitions assert in debug builds; release builds log and
    /// skip the transition so the control loop keeps running.
    pub fn set_state(&mut self, next: State) {
        if self.state.can_transition_to(next) {
            self.state = next;
        } else {
            debug_assert!(
                false,
                "illegal transition {} -> {}",
                self.state.as_label(),
                next.as_label()
            );
            error!(
                from = self.state.as_label(),
                to = next.as_label(),
                "illegal state transition skipped"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [State::Finished, State::Failed] {
            assert!(from.is_terminal());
            for to in [
                State::Started,
                State::Running,
                State::Interrupted,
                State::Resumed,
                State::Finished,
                State::Failed,
            ] {
                assert!(!from.can_transition_to(to), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn started_is_never_a_target() {
        for from in [State::Started, State::Running, State::Interrupted, State::Resumed] {
            assert!(!from.can_transition_to(State::Started));
        }
    }

    #[test]
    fn table_edges() {
        assert!(State::Started.can_transition_to(State::Running));
        assert!(State::Resumed.can_transition_to(State::Running));
        assert!(State::Running.can_transition_to(State::Interrupted));
        assert!(State::Interrupted.can_transition_to(State::Resumed));
        assert!(State::Running.can_transition_to(State::Finished));
        assert!(State::Running.can_transition_to(State::Failed));
        assert!(State::Interrupted.can_transition_to(State::Finished));

        assert!(!State::Running.can_transition_to(State::Resumed));
        assert!(!State::Interrupted.can_transition_to(State::Running));
    }
}
