//! # Process scheduler - cooperative, group-exclusive, sequenceable.
//!
//! [`Scheduler`] owns every registered process record, enforces group
//! exclusivity, advances state once per tick, and resolves child sequencing.
//!
//! ## Architecture
//! ```text
//! host driver ── tick(elapsed) ──► Scheduler
//!                                    │ snapshot of registration order
//!                                    ▼
//!                          per record: Started → Running (skip this cycle)
//!                                      Resumed → Running, then step
//!                                      Running → step(elapsed)
//!                                    │
//!                                    ├─ Outcome::Continue  → keep
//!                                    ├─ Outcome::Finished  → finish() path
//!                                    └─ Outcome::Failed    → fail() path
//! ```
//!
//! ## Rules
//! - The scheduler exclusively owns each registered `Box<dyn Process>`;
//!   registry identity is the process name.
//! - Per group, at most one record is `Started`/`Running`/`Resumed`; all other
//!   members are `Interrupted`.
//! - User code (`step`, lifecycle hooks, listeners reached from a step) runs
//!   with no internal borrow held, so it may call back into the scheduler
//!   synchronously. A re-entrant `finish`/`fail` against the record whose
//!   process is currently executing is deferred and applied when the step
//!   returns. A `start` installs the incoming record before the displaced
//!   record's terminal hook runs, so hooks always observe a claimed group.
//! - Recoverable conditions (duplicate name, unknown process) report through
//!   `bool`/`Option` returns plus a diagnostic; the control loop never aborts.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::core::group::GroupSlot;
use crate::core::record::{PendingTerminal, ProcessRecord, State, Terminal};
use crate::processes::{Outcome, Process};

/// How a checked-out process was settled on check-in.
enum Settled {
    /// Process stored back into its record.
    Stored,
    /// A terminal outcome was requested re-entrantly while the process ran.
    Pending(PendingTerminal),
    /// The record vanished; the instance is released.
    Gone,
}

/// Cooperative scheduler for mutually-exclusive, sequenceable processes.
///
/// Single-threaded by design: construct one instance, wrap it in an
/// [`Rc`](std::rc::Rc), and hand clones to every collaborator. A
/// multi-threaded host must serialize access behind its own lock.
#[derive(Default)]
pub struct Scheduler {
    records: RefCell<HashMap<String, ProcessRecord>>,
    groups: RefCell<HashMap<String, GroupSlot>>,
    /// Registration order; `tick` snapshots this for deterministic stepping.
    order: RefCell<Vec<String>>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new process and runs its `on_start` synchronously.
    ///
    /// Returns `false` (no state change) if the name is already registered,
    /// or if `is_default` is set and `group` already has a default.
    ///
    /// If `group` already has an active record, the new one claims the group
    /// first and the previous one then yields: the group default transitions
    /// to `Interrupted`, a non-default record is finished (`on_finish`,
    /// queued children discarded). `is_default` is ignored for ungrouped
    /// processes.
    pub fn start(&self, process: Box<dyn Process>, group: Option<&str>, is_default: bool) -> bool {
        self.start_internal(process, group.map(str::to_owned), is_default, VecDeque::new())
    }

    /// Registers a chain of processes where each starts once its predecessor
    /// finishes.
    ///
    /// The first element is started immediately; the remainder is attached as
    /// its children. Returns `false` without side effects if the list is
    /// empty or the first element's name is already registered.
    pub fn start_sequence(&self, processes: Vec<Box<dyn Process>>, group: Option<&str>) -> bool {
        let mut queue: VecDeque<Box<dyn Process>> = processes.into();
        match queue.pop_front() {
            Some(first) => self.start_internal(first, group.map(str::to_owned), false, queue),
            None => {
                debug!("start_sequence: empty process list");
                false
            }
        }
    }

    /// Explicitly finishes a process: `Finished`, `on_finish`, removal.
    ///
    /// If the record has queued children the next child starts immediately in
    /// the same group, inheriting the default flag and the remaining children
    /// (sequencing takes priority over default resumption). Only a childless
    /// finish resumes an `Interrupted` group default. Returns `false` for
    /// unknown names.
    ///
    /// Callable from within the process's own `step`; teardown is then
    /// deferred until the step returns, with `on_finish` firing exactly once.
    pub fn finish(&self, name: &str) -> bool {
        let sequence = {
            let mut records = self.records.borrow_mut();
            let Some(rec) = records.get_mut(name) else {
                debug!(process = name, "finish: unknown process");
                return false;
            };
            if rec.pending.is_some() {
                return true;
            }
            // An interrupted record does not hold the group; finishing it
            // neither sequences children nor resumes the default.
            let sequence = rec.state != State::Interrupted;
            if rec.process.is_none() {
                rec.pending = Some(PendingTerminal {
                    terminal: Terminal::Finished,
                    sequence,
                });
                return true;
            }
            sequence
        };
        self.teardown(name, Terminal::Finished, sequence, None)
    }

    /// Fails a process: `Failed`, `on_fail`, removal.
    ///
    /// Failure never starts queued children and never resumes the group
    /// default; the group stays idle until the next explicit `start`.
    /// Returns `false` for unknown names. Deferred like [`finish`] when
    /// called from within the process's own `step`.
    ///
    /// [`finish`]: Scheduler::finish
    pub fn fail(&self, name: &str) -> bool {
        {
            let mut records = self.records.borrow_mut();
            let Some(rec) = records.get_mut(name) else {
                debug!(process = name, "fail: unknown process");
                return false;
            };
            if rec.pending.is_some() {
                return true;
            }
            if rec.process.is_none() {
                rec.pending = Some(PendingTerminal {
                    terminal: Terminal::Failed,
                    sequence: false,
                });
                return true;
            }
        }
        self.teardown(name, Terminal::Failed, false, None)
    }

    /// Advances every runnable record by one control cycle.
    ///
    /// Iterates a snapshot of the registration order, so records added or
    /// removed by a step (or by listeners a step triggers) do not disturb the
    /// current pass; a newly started record is stepped from the next tick.
    ///
    /// `Started` records are promoted to `Running` without being stepped this
    /// cycle; `Resumed` records are promoted and stepped. A step outcome of
    /// `Finished`/`Failed` routes through the same paths as the explicit
    /// [`finish`](Scheduler::finish)/[`fail`](Scheduler::fail) calls.
    pub fn tick(&self, elapsed: Duration) {
        let snapshot: Vec<String> = self.order.borrow().clone();
        for name in snapshot {
            let checked_out = {
                let mut records = self.records.borrow_mut();
                match records.get_mut(&name) {
                    // Removed earlier in this pass.
                    None => None,
                    Some(rec) => match rec.state {
                        State::Started => {
                            // Promote only: on_start already ran inside
                            // start(), the first step happens next cycle.
                            rec.set_state(State::Running);
                            None
                        }
                        State::Resumed => {
                            rec.set_state(State::Running);
                            rec.process.take()
                        }
                        State::Running => rec.process.take(),
                        _ => None,
                    },
                }
            };

            if let Some(mut process) = checked_out {
                let outcome = process.step(elapsed);
                self.check_in(&name, process, Some(outcome));
            }
        }
    }

    // ---------------------------
    // Read-only accessors
    // ---------------------------

    /// Returns the scheduling state of a registered process.
    pub fn query_state(&self, name: &str) -> Option<State> {
        self.records.borrow().get(name).map(|rec| rec.state)
    }

    /// Returns the time elapsed since the process was registered.
    pub fn time_since_start(&self, name: &str) -> Option<Duration> {
        self.records
            .borrow()
            .get(name)
            .map(|rec| rec.started_at.elapsed())
    }

    /// Returns the time elapsed since the process was last stepped, or `None`
    /// if it is unknown or has never been stepped.
    pub fn time_since_last_run(&self, name: &str) -> Option<Duration> {
        self.records
            .borrow()
            .get(name)
            .and_then(|rec| rec.last_run_at)
            .map(|at| at.elapsed())
    }

    /// Returns true if a process with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.records.borrow().contains_key(name)
    }

    /// Returns registered process names in registration order.
    pub fn list(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    /// Returns the number of registered processes.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Returns true if no processes are registered.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Returns the name of the record currently holding `group`, if any.
    pub fn group_active(&self, group: &str) -> Option<String> {
        self.groups
            .borrow()
            .get(group)
            .and_then(|slot| slot.active.clone())
    }

    // ---------------------------
    // Internals
    // ---------------------------

    fn start_internal(
        &self,
        process: Box<dyn Process>,
        group: Option<String>,
        is_default: bool,
        children: VecDeque<Box<dyn Process>>,
    ) -> bool {
        let name = process.name().to_string();

        if self.records.borrow().contains_key(&name) {
            warn!(process = %name, "start rejected: name already registered");
            return false;
        }

        // Claim the group slot: remember who has to yield, reject a second
        // default before any state changes.
        let displaced = match group.as_deref() {
            Some(g) => {
                let mut groups = self.groups.borrow_mut();
                if is_default && groups.get(g).is_some_and(|slot| slot.default.is_some()) {
                    warn!(process = %name, group = g, "start rejected: group already has a default");
                    return false;
                }
                groups.entry(g.to_string()).or_default().active.take()
            }
            None => None,
        };

        let grouped_default = is_default && group.is_some();
        self.records.borrow_mut().insert(
            name.clone(),
            ProcessRecord::new(process, group.clone(), grouped_default, children),
        );
        self.order.borrow_mut().push(name.clone());

        if let Some(g) = group.as_deref() {
            let mut groups = self.groups.borrow_mut();
            let slot = groups.entry(g.to_string()).or_default();
            slot.active = Some(name.clone());
            if grouped_default {
                slot.default = Some(name.clone());
            }
        }
        debug!(
            process = %name,
            group = group.as_deref().unwrap_or("-"),
            default = grouped_default,
            "process started"
        );

        // The displaced record yields only after the incoming one holds the
        // slot: its terminal hook may call back into the scheduler and must
        // observe the group as taken (a hook-driven start displaces the
        // incoming record properly, a colliding name hits the duplicate
        // check).
        if let Some(current) = displaced {
            self.displace(&current);
        }

        // on_start runs synchronously inside this call, with no borrow held.
        // A displaced record's hook may already have torn the new record
        // down; check-out then yields nothing and the hook is skipped.
        if let Some(mut process) = self.check_out(&name) {
            process.on_start();
            self.check_in(&name, process, None);
        }
        true
    }

    /// Makes a group's active record yield to an incoming one.
    fn displace(&self, name: &str) {
        let teardown_now = {
            let mut records = self.records.borrow_mut();
            match records.get_mut(name) {
                None => false,
                Some(rec) if rec.group_default => {
                    rec.set_state(State::Interrupted);
                    debug!(process = name, "group default interrupted");
                    false
                }
                Some(rec) => {
                    // The incoming process claims the group; the displaced
                    // chain is abandoned.
                    rec.children.clear();
                    if rec.process.is_none() {
                        rec.pending = Some(PendingTerminal {
                            terminal: Terminal::Finished,
                            sequence: false,
                        });
                        false
                    } else {
                        true
                    }
                }
            }
        };
        if teardown_now {
            self.teardown(name, Terminal::Finished, false, None);
        }
    }

    /// Removes a record, fires the terminal hook, and runs follow-ups
    /// (child sequencing or default resumption) when `sequence` is set.
    ///
    /// `process_override` carries the instance when the caller already holds
    /// it checked out (deferred terminals).
    fn teardown(
        &self,
        name: &str,
        terminal: Terminal,
        sequence: bool,
        process_override: Option<Box<dyn Process>>,
    ) -> bool {
        let mut rec = match self.records.borrow_mut().remove(name) {
            Some(rec) => rec,
            None => return false,
        };
        self.order.borrow_mut().retain(|n| n != name);

        if let Some(g) = rec.group.as_deref() {
            let mut groups = self.groups.borrow_mut();
            let remove_slot = match groups.get_mut(g) {
                Some(slot) => {
                    if slot.active.as_deref() == Some(name) {
                        slot.active = None;
                    }
                    if slot.default.as_deref() == Some(name) {
                        slot.default = None;
                    }
                    slot.is_empty()
                }
                None => false,
            };
            if remove_slot {
                groups.remove(g);
            }
        }

        rec.set_state(terminal.state());
        debug!(process = name, state = terminal.state().as_label(), "process removed");

        let mut process = process_override.or_else(|| rec.process.take());
        if let Some(p) = process.as_deref_mut() {
            match terminal {
                Terminal::Finished => p.on_finish(),
                Terminal::Failed => p.on_fail(),
            }
        }

        if terminal == Terminal::Finished && sequence {
            if let Some(next) = rec.children.pop_front() {
                // Sequencing takes priority over default resumption; the
                // child inherits the default flag and the remaining chain.
                if !self.start_internal(next, rec.group.clone(), rec.group_default, rec.children) {
                    warn!(process = name, "sequence aborted: next child rejected");
                }
            } else {
                self.resume_default(rec.group.as_deref());
            }
        }
        true
    }

    /// Resumes a group's interrupted default, if present.
    fn resume_default(&self, group: Option<&str>) {
        let Some(g) = group else { return };
        let Some(default_name) = self
            .groups
            .borrow()
            .get(g)
            .and_then(|slot| slot.default.clone())
        else {
            return;
        };

        let resumed = {
            let mut records = self.records.borrow_mut();
            match records.get_mut(&default_name) {
                Some(rec) if rec.state == State::Interrupted => {
                    rec.set_state(State::Resumed);
                    true
                }
                _ => false,
            }
        };
        if resumed {
            if let Some(slot) = self.groups.borrow_mut().get_mut(g) {
                slot.active = Some(default_name.clone());
            }
            debug!(process = %default_name, group = g, "group default resumed");
        }
    }

    /// Takes the owned process out of its record for a user-code call.
    fn check_out(&self, name: &str) -> Option<Box<dyn Process>> {
        self.records
            .borrow_mut()
            .get_mut(name)
            .and_then(|rec| rec.process.take())
    }

    /// Returns a checked-out process to its record and settles the call:
    /// applies a deferred terminal if one was requested re-entrantly,
    /// otherwise routes the step outcome through `finish`/`fail`.
    fn check_in(&self, name: &str, process: Box<dyn Process>, outcome: Option<Outcome>) {
        let mut slot = Some(process);
        let settled = {
            let mut records = self.records.borrow_mut();
            match records.get_mut(name) {
                None => Settled::Gone,
                Some(rec) => {
                    if outcome.is_some() {
                        rec.last_run_at = Some(Instant::now());
                    }
                    match rec.pending.take() {
                        Some(pending) => Settled::Pending(pending),
                        None => {
                            rec.process = slot.take();
                            Settled::Stored
                        }
                    }
                }
            }
        };

        match settled {
            Settled::Pending(pending) => {
                if let Some(process) = slot.take() {
                    self.teardown(name, pending.terminal, pending.sequence, Some(process));
                }
            }
            Settled::Stored => match outcome {
                Some(Outcome::Finished) => {
                    self.finish(name);
                }
                Some(Outcome::Failed) => {
                    self.fail(name);
                }
                _ => {}
            },
            Settled::Gone => {
                debug!(process = name, "check-in: record vanished, releasing instance");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, ListenerFn};
    use crate::processes::ProcessFn;
    use std::rc::Rc;

    const DT: Duration = Duration::from_millis(20);

    /// Process that records every hook/step call into a shared log and plays
    /// back a scripted list of step outcomes (then continues forever).
    struct Probe {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        plan: VecDeque<Outcome>,
    }

    impl Probe {
        fn boxed(
            name: &'static str,
            log: &Rc<RefCell<Vec<String>>>,
            plan: &[Outcome],
        ) -> Box<Self> {
            Box::new(Self {
                name,
                log: log.clone(),
                plan: plan.iter().copied().collect(),
            })
        }
    }

    impl Process for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn on_start(&mut self) {
            self.log.borrow_mut().push(format!("{}:start", self.name));
        }

        fn on_finish(&mut self) {
            self.log.borrow_mut().push(format!("{}:finish", self.name));
        }

        fn on_fail(&mut self) {
            self.log.borrow_mut().push(format!("{}:fail", self.name));
        }

        fn step(&mut self, _elapsed: Duration) -> Outcome {
            self.log.borrow_mut().push(format!("{}:step", self.name));
            self.plan.pop_front().unwrap_or(Outcome::Continue)
        }
    }

    fn log() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn entries(log: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
        log.borrow().clone()
    }

    fn count(log: &Rc<RefCell<Vec<String>>>, entry: &str) -> usize {
        log.borrow().iter().filter(|e| *e == entry).count()
    }

    /// At most one record per group in `Started`/`Running`/`Resumed`.
    fn assert_group_exclusive(sched: &Scheduler, group: &str) {
        let records = sched.records.borrow();
        let active = records
            .values()
            .filter(|r| r.group.as_deref() == Some(group) && r.state.is_active())
            .count();
        assert!(active <= 1, "group {group} has {active} active records");
    }

    #[test]
    fn started_is_promoted_without_stepping() {
        let sched = Scheduler::new();
        let log = log();
        assert!(sched.start(Probe::boxed("p", &log, &[]), None, false));

        assert_eq!(sched.query_state("p"), Some(State::Started));
        assert_eq!(entries(&log), vec!["p:start"]);

        sched.tick(DT);
        assert_eq!(sched.query_state("p"), Some(State::Running));
        assert_eq!(count(&log, "p:step"), 0);

        sched.tick(DT);
        assert_eq!(count(&log, "p:step"), 1);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let sched = Scheduler::new();
        let log = log();
        assert!(sched.start(Probe::boxed("p", &log, &[]), None, false));
        assert!(!sched.start(Probe::boxed("p", &log, &[]), None, false));

        // Only the first registration ran on_start.
        assert_eq!(count(&log, "p:start"), 1);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn second_group_default_is_rejected() {
        let sched = Scheduler::new();
        let log = log();
        assert!(sched.start(Probe::boxed("d1", &log, &[]), Some("g"), true));
        assert!(!sched.start(Probe::boxed("d2", &log, &[]), Some("g"), true));
        assert_eq!(sched.query_state("d2"), None);
        assert_eq!(sched.group_active("g").as_deref(), Some("d1"));
    }

    #[test]
    fn non_default_active_is_finished_by_new_start() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("p1", &log, &[]), Some("g"), false);
        sched.tick(DT);

        assert!(sched.start(Probe::boxed("p2", &log, &[]), Some("g"), false));

        // p1 finished (hook fired once) and p2 started inside the same call.
        assert_eq!(sched.query_state("p1"), None);
        assert_eq!(count(&log, "p1:finish"), 1);
        assert_eq!(sched.query_state("p2"), Some(State::Started));
        assert_group_exclusive(&sched, "g");
    }

    #[test]
    fn default_active_is_interrupted_then_resumed() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("d", &log, &[]), Some("g"), true);
        sched.tick(DT);
        assert_eq!(sched.query_state("d"), Some(State::Running));

        sched.start(Probe::boxed("p", &log, &[]), Some("g"), false);
        assert_eq!(sched.query_state("d"), Some(State::Interrupted));
        assert_eq!(count(&log, "d:finish"), 0);
        assert_group_exclusive(&sched, "g");

        assert!(sched.finish("p"));
        assert_eq!(sched.query_state("d"), Some(State::Resumed));
        assert_eq!(sched.group_active("g").as_deref(), Some("d"));

        // Resumed records are promoted and stepped on the next tick.
        sched.tick(DT);
        assert_eq!(sched.query_state("d"), Some(State::Running));
        assert!(count(&log, "d:step") >= 1);
    }

    #[test]
    fn sequence_walks_children_and_resumes_default() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("d", &log, &[]), Some("g"), true);
        sched.tick(DT);

        assert!(sched.start_sequence(
            vec![
                Probe::boxed("a", &log, &[]),
                Probe::boxed("b", &log, &[]),
                Probe::boxed("c", &log, &[]),
            ],
            Some("g"),
        ));
        assert_eq!(sched.query_state("d"), Some(State::Interrupted));
        assert_eq!(sched.query_state("a"), Some(State::Started));
        assert_eq!(sched.query_state("b"), None);

        assert!(sched.finish("a"));
        assert_eq!(sched.query_state("b"), Some(State::Started));
        assert_eq!(sched.query_state("d"), Some(State::Interrupted));
        assert_group_exclusive(&sched, "g");

        assert!(sched.finish("b"));
        assert_eq!(sched.query_state("c"), Some(State::Started));

        assert!(sched.finish("c"));
        assert_eq!(sched.query_state("d"), Some(State::Resumed));
        assert_eq!(
            entries(&log),
            vec![
                "d:start", "a:start", "a:finish", "b:start", "b:finish", "c:start", "c:finish",
            ]
        );
    }

    #[test]
    fn chain_completes_after_default_is_gone() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("d", &log, &[]), Some("g"), true);
        sched.start_sequence(
            vec![Probe::boxed("a", &log, &[]), Probe::boxed("b", &log, &[])],
            Some("g"),
        );

        // Finish the interrupted default: its slot clears, then finish the
        // chain head; the child must not try to resume a gone default.
        assert!(sched.finish("d"));
        assert!(sched.finish("a"));
        assert_eq!(sched.query_state("b"), Some(State::Started));
        assert!(sched.finish("b"));
        assert!(sched.is_empty());
    }

    #[test]
    fn step_signaled_finish_matches_explicit_finish() {
        let sched = Scheduler::new();
        let log = log();
        // Finishes on its 3rd step.
        sched.start(
            Probe::boxed("p", &log, &[Outcome::Continue, Outcome::Continue, Outcome::Finished]),
            None,
            false,
        );

        sched.tick(DT); // promote
        sched.tick(DT);
        sched.tick(DT);
        assert_eq!(sched.query_state("p"), Some(State::Running));

        sched.tick(DT); // 3rd step signals Finished
        assert_eq!(sched.query_state("p"), None);
        assert_eq!(count(&log, "p:step"), 3);
        assert_eq!(count(&log, "p:finish"), 1);
    }

    #[test]
    fn step_signaled_finish_starts_children() {
        let sched = Scheduler::new();
        let log = log();
        sched.start_sequence(
            vec![
                Probe::boxed("a", &log, &[Outcome::Finished]),
                Probe::boxed("b", &log, &[]),
            ],
            Some("g"),
        );

        sched.tick(DT); // promote a
        sched.tick(DT); // a's step signals Finished -> b starts
        assert_eq!(sched.query_state("a"), None);
        assert_eq!(count(&log, "a:finish"), 1);
        assert_eq!(sched.query_state("b"), Some(State::Started));
    }

    #[test]
    fn failure_neither_sequences_nor_resumes() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("d", &log, &[]), Some("g"), true);
        sched.start_sequence(
            vec![
                Probe::boxed("a", &log, &[Outcome::Failed]),
                Probe::boxed("b", &log, &[]),
            ],
            Some("g"),
        );

        sched.tick(DT); // promote
        sched.tick(DT); // a's step signals Failed

        assert_eq!(sched.query_state("a"), None);
        assert_eq!(count(&log, "a:fail"), 1);
        assert_eq!(sched.query_state("b"), None);
        assert_eq!(sched.query_state("d"), Some(State::Interrupted));
        assert_eq!(sched.group_active("g"), None);
    }

    #[test]
    fn failure_isolation_across_records_in_one_tick() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("bad", &log, &[Outcome::Failed]), None, false);
        sched.start(Probe::boxed("good", &log, &[]), None, false);

        sched.tick(DT); // promote both
        sched.tick(DT); // bad fails; good must still be stepped

        assert_eq!(sched.query_state("bad"), None);
        assert_eq!(count(&log, "good:step"), 1);
    }

    #[test]
    fn displacement_discards_queued_children() {
        let sched = Scheduler::new();
        let log = log();
        sched.start_sequence(
            vec![Probe::boxed("a", &log, &[]), Probe::boxed("b", &log, &[])],
            Some("g"),
        );

        assert!(sched.start(Probe::boxed("c", &log, &[]), Some("g"), false));
        assert_eq!(count(&log, "a:finish"), 1);
        assert_eq!(sched.query_state("b"), None, "displaced chain is abandoned");

        assert!(sched.finish("c"));
        assert!(sched.is_empty());
    }

    #[test]
    fn unknown_names_report_absent() {
        let sched = Scheduler::new();
        assert!(!sched.finish("ghost"));
        assert!(!sched.fail("ghost"));
        assert_eq!(sched.query_state("ghost"), None);
        assert_eq!(sched.time_since_start("ghost"), None);
        assert_eq!(sched.time_since_last_run("ghost"), None);
    }

    #[test]
    fn time_accessors_track_registration_and_steps() {
        let sched = Scheduler::new();
        let log = log();
        sched.start(Probe::boxed("p", &log, &[]), None, false);

        assert!(sched.time_since_start("p").is_some());
        assert_eq!(sched.time_since_last_run("p"), None);

        sched.tick(DT); // promote
        assert_eq!(sched.time_since_last_run("p"), None);

        sched.tick(DT); // first step
        assert!(sched.time_since_last_run("p").is_some());
    }

    #[test]
    fn listener_can_start_process_during_trigger() {
        let sched = Rc::new(Scheduler::new());
        let bus = Rc::new(EventBus::new());
        let log = log();

        let sched_in = sched.clone();
        let log_in = log.clone();
        bus.subscribe(
            "teleop.init",
            ListenerFn::rc("arm-starter", move |_event, _payload| {
                sched_in.start(Probe::boxed("armed", &log_in, &[]), None, false);
                Ok(())
            }),
        );

        bus.trigger("teleop.init", None);
        assert_eq!(sched.query_state("armed"), Some(State::Started));
        assert_eq!(bus.listener_count("teleop.init"), 1);

        sched.tick(DT);
        assert_eq!(sched.query_state("armed"), Some(State::Running));
    }

    #[test]
    fn step_can_start_other_processes_reentrantly() {
        let sched = Rc::new(Scheduler::new());
        let bus = Rc::new(EventBus::new());
        let log = log();

        let sched_in = sched.clone();
        let log_in = log.clone();
        bus.subscribe(
            "edge",
            ListenerFn::rc("spawner", move |_event, _payload| {
                sched_in.start(Probe::boxed("spawned", &log_in, &[]), None, false);
                Ok(())
            }),
        );

        let bus_in = bus.clone();
        sched.start(
            ProcessFn::boxed("poller", move |_elapsed| {
                bus_in.trigger("edge", None);
                Outcome::Finished
            }),
            None,
            false,
        );

        sched.tick(DT); // promote poller
        sched.tick(DT); // poller steps: triggers edge, spawns, then finishes

        assert_eq!(sched.query_state("poller"), None);
        assert_eq!(sched.query_state("spawned"), Some(State::Started));

        sched.tick(DT);
        assert_eq!(sched.query_state("spawned"), Some(State::Running));
    }

    #[test]
    fn reentrant_finish_of_stepping_process_is_deferred() {
        let sched = Rc::new(Scheduler::new());
        let bus = Rc::new(EventBus::new());
        let log = log();

        let sched_in = sched.clone();
        bus.subscribe(
            "abort",
            ListenerFn::rc("aborter", move |_event, _payload| {
                // Finishes the process that is executing right now.
                assert!(sched_in.finish("looper"));
                Ok(())
            }),
        );

        let bus_in = bus.clone();
        let looper = ProcessFn::new("looper", move |_elapsed| {
            bus_in.trigger("abort", None);
            Outcome::Continue
        })
        .with_on_finish({
            let log = log.clone();
            move || log.borrow_mut().push("looper:finish".into())
        });
        sched.start(Box::new(looper), None, false);

        sched.tick(DT); // promote
        sched.tick(DT); // step triggers abort -> deferred teardown

        assert_eq!(sched.query_state("looper"), None);
        assert_eq!(count(&log, "looper:finish"), 1);
    }

    #[test]
    fn reentrant_displacement_of_stepping_process_is_deferred() {
        let sched = Rc::new(Scheduler::new());
        let log = log();

        let sched_in = sched.clone();
        let log_in = log.clone();
        let incumbent = ProcessFn::new("incumbent", move |_elapsed| {
            // Starts a rival in its own group mid-step.
            assert!(sched_in.start(Probe::boxed("rival", &log_in, &[]), Some("g"), false));
            Outcome::Continue
        })
        .with_on_finish({
            let log = log.clone();
            move || log.borrow_mut().push("incumbent:finish".into())
        });
        sched.start(Box::new(incumbent), Some("g"), false);

        sched.tick(DT); // promote
        sched.tick(DT); // step: rival displaces incumbent while it runs

        assert_eq!(sched.query_state("incumbent"), None);
        assert_eq!(count(&log, "incumbent:finish"), 1);
        assert_eq!(sched.query_state("rival"), Some(State::Started));
        assert_group_exclusive(&sched, "g");
    }

    #[test]
    fn start_from_finish_hook_keeps_group_exclusive() {
        let sched = Rc::new(Scheduler::new());
        let log = log();

        // Displaced by a later start; its on_finish grabs the group back.
        let sched_in = sched.clone();
        let log_in = log.clone();
        let incumbent = ProcessFn::new("incumbent", |_elapsed| Outcome::Continue)
            .with_on_finish(move || {
                sched_in.start(Probe::boxed("q", &log_in, &[]), Some("g"), false);
            });
        sched.start(Box::new(incumbent), Some("g"), false);
        sched.tick(DT);

        assert!(sched.start(Probe::boxed("p2", &log, &[]), Some("g"), false));

        // The hook saw the group already claimed by p2, so its start
        // displaced p2 instead of racing it: exactly one record holds g.
        assert_group_exclusive(&sched, "g");
        assert_eq!(sched.query_state("incumbent"), None);
        assert_eq!(sched.query_state("p2"), None);
        assert_eq!(sched.query_state("q"), Some(State::Started));
        assert_eq!(sched.group_active("g").as_deref(), Some("q"));
    }

    #[test]
    fn colliding_start_from_finish_hook_is_rejected() {
        let sched = Rc::new(Scheduler::new());
        let log = log();

        // Its on_finish tries to register the same name as the incoming
        // record; the duplicate check must see that record already installed.
        let sched_in = sched.clone();
        let log_in = log.clone();
        let incumbent = ProcessFn::new("incumbent", |_elapsed| Outcome::Continue)
            .with_on_finish(move || {
                assert!(!sched_in.start(Probe::boxed("p2", &log_in, &[]), Some("g"), false));
            });
        sched.start(Box::new(incumbent), Some("g"), false);
        sched.tick(DT);

        assert!(sched.start(Probe::boxed("p2", &log, &[]), Some("g"), false));

        assert_group_exclusive(&sched, "g");
        assert_eq!(sched.query_state("p2"), Some(State::Started));
        assert_eq!(sched.list().iter().filter(|n| *n == "p2").count(), 1);
        assert_eq!(count(&log, "p2:start"), 1);

        // The surviving record is stepped exactly once per tick.
        sched.tick(DT); // promote
        sched.tick(DT);
        assert_eq!(count(&log, "p2:step"), 1);
    }

    #[test]
    fn start_from_start_hook_defers_own_displacement() {
        let sched = Rc::new(Scheduler::new());
        let log = log();

        // Starts a rival in its own group from its on_start hook, displacing
        // itself while it is checked out.
        let sched_in = sched.clone();
        let log_in = log.clone();
        let eager = ProcessFn::new("eager", |_elapsed| Outcome::Continue)
            .with_on_start(move || {
                assert!(sched_in.start(Probe::boxed("winner", &log_in, &[]), Some("g"), false));
            })
            .with_on_finish({
                let log = log.clone();
                move || log.borrow_mut().push("eager:finish".into())
            });
        assert!(sched.start(Box::new(eager), Some("g"), false));

        assert_eq!(sched.query_state("eager"), None);
        assert_eq!(count(&log, "eager:finish"), 1);
        assert_eq!(sched.query_state("winner"), Some(State::Started));
        assert_group_exclusive(&sched, "g");
    }
}
