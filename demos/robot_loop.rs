//! # Mode-driven control loop
//!
//! Demonstrates the core pieces working together:
//! - A group default that holds the drivetrain whenever nothing else runs
//! - An autonomous routine registered as a sequence on `auto.init`
//! - Group exclusivity (the routine interrupts the default, then gives it back)
//! - The `HostDriver` triggering lifecycle events before every tick
//!
//! Run with:
//! ```text
//! cargo run --example robot_loop --features driver,logging
//! ```

use std::rc::Rc;
use std::thread;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use tickvisor::{
    DriverConfig, EventBus, HostDriver, ListenerFn, LogWriter, Mode, Outcome, ProcessFn,
    Scheduler,
};

const GROUP_DRIVE: &str = "drive";

/// Timed action: occupies the drive group for `duration`, then finishes.
fn timed(name: &'static str, duration: Duration) -> Box<dyn tickvisor::Process> {
    let mut remaining = duration;
    ProcessFn::boxed(name, move |elapsed| {
        remaining = remaining.saturating_sub(elapsed);
        if remaining.is_zero() {
            println!("    {name}: done");
            Outcome::Finished
        } else {
            Outcome::Continue
        }
    })
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    fmt().with_env_filter(filter).init();

    let sched = Rc::new(Scheduler::new());
    let bus = Rc::new(EventBus::new());

    let log: tickvisor::ListenerRef = Rc::new(LogWriter);
    bus.subscribe_all([
        ("auto.init", log.clone()),
        ("auto.periodic", log.clone()),
        ("teleop.init", log.clone()),
        ("teleop.periodic", log),
    ]);

    // Default drivetrain behavior: runs whenever no routine holds the group.
    sched.start(
        ProcessFn::boxed("drive-idle", |_elapsed| {
            // Real code would read operator input and drive the motors here.
            Outcome::Continue
        }),
        Some(GROUP_DRIVE),
        true,
    );

    // Autonomous routine: forward, then rotate, as a sequence in the group.
    let sched_in = sched.clone();
    bus.subscribe(
        "auto.init",
        ListenerFn::rc("auto-routine", move |_event, _payload| {
            sched_in.start_sequence(
                vec![
                    timed("auto-forward", Duration::from_millis(100)),
                    timed("auto-rotate", Duration::from_millis(60)),
                ],
                Some(GROUP_DRIVE),
            );
            Ok(())
        }),
    );

    let driver = HostDriver::new(sched.clone(), bus, DriverConfig::default());

    println!("== autonomous ==");
    driver.enter(Mode::Autonomous);
    for _ in 0..12 {
        driver.cycle(Mode::Autonomous);
        thread::sleep(Duration::from_millis(20));
    }
    println!("registered after autonomous: {:?}", sched.list());

    println!("== teleop ==");
    driver.enter(Mode::Teleop);
    for _ in 0..3 {
        driver.cycle(Mode::Teleop);
        thread::sleep(Duration::from_millis(20));
    }
    println!("registered after teleop: {:?}", sched.list());
}
