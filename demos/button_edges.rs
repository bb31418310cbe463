//! # Button edge detection over the event bus
//!
//! Demonstrates an input-polling process that raises events on state edges,
//! and a listener that reacts by scheduling work re-entrantly:
//! - `button.pressed` / `button.released` are triggered from inside a step
//! - the pressed listener starts a short "grab" action in the same cycle
//!
//! Run with:
//! ```text
//! cargo run --example button_edges --features logging
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use tickvisor::{EventBus, ListenerFn, ListenerRef, LogWriter, Outcome, ProcessFn, Scheduler};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let sched = Rc::new(Scheduler::new());
    let bus = Rc::new(EventBus::new());

    // Simulated input: flipped by the "operator" below.
    let button = Rc::new(Cell::new(false));

    let log: ListenerRef = Rc::new(LogWriter);
    bus.subscribe_all([
        ("button.pressed", log.clone()),
        ("button.released", log),
    ]);

    // Pressing the button kicks off a short grab action.
    let sched_in = sched.clone();
    bus.subscribe(
        "button.pressed",
        ListenerFn::rc("grab-on-press", move |_event, _payload| {
            let mut remaining = Duration::from_millis(40);
            sched_in.start(
                ProcessFn::boxed("grab", move |elapsed| {
                    remaining = remaining.saturating_sub(elapsed);
                    if remaining.is_zero() {
                        println!("    grab: closed");
                        Outcome::Finished
                    } else {
                        Outcome::Continue
                    }
                }),
                Some("grabber"),
                false,
            );
            Ok(())
        }),
    );

    // Polling process: raises an event whenever the button state changes.
    let bus_in = bus.clone();
    let button_in = button.clone();
    let mut previous = false;
    sched.start(
        ProcessFn::boxed("button-poller", move |_elapsed| {
            let current = button_in.get();
            if current != previous {
                let event = if current { "button.pressed" } else { "button.released" };
                bus_in.trigger(event, None);
            }
            previous = current;
            Outcome::Continue
        }),
        None,
        false,
    );

    // Scripted operator: press on cycle 3, release on cycle 7.
    for cycle in 0..10 {
        match cycle {
            3 => button.set(true),
            7 => button.set(false),
            _ => {}
        }
        sched.tick(Duration::from_millis(20));
        println!("cycle {cycle}: registered={:?}", sched.list());
    }
}
