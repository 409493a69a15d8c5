//! Blocking control loop around `WasherController::tick`.
//!
//! The loop sleeps on the controller's own clock, so with a `ManualClock` a
//! full wash replays instantly and deterministically.

use std::sync::atomic::{AtomicBool, Ordering};

use washer_traits::{OutputStage, Panel};

use crate::controller::WasherController;
use crate::cycle::SystemState;
use crate::error::Result;
use crate::status::WasherEvent;

/// What a finished run looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub cycles_completed: u32,
    pub final_state: SystemState,
}

/// Tick until `shutdown` is set or the controller clock passes `until_ms`.
///
/// `before_tick` runs first on every iteration with the current time, so
/// callers can feed inputs; `on_events` sees every non-empty batch of events.
/// An error from either callback ends the loop and is returned.
pub fn run_loop<P, O, B, E>(
    washer: &mut WasherController<P, O>,
    shutdown: &AtomicBool,
    until_ms: Option<u64>,
    mut before_tick: B,
    mut on_events: E,
) -> Result<RunSummary>
where
    P: Panel,
    O: OutputStage,
    B: FnMut(u64) -> Result<()>,
    E: FnMut(u64, &[WasherEvent]) -> Result<()>,
{
    let start_ms = washer.now_ms();
    let mut ticks: u64 = 0;
    tracing::info!(until_ms, "control loop start");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        let now = washer.now_ms();
        if until_ms.is_some_and(|end| now > end) {
            break;
        }

        before_tick(now)?;
        let events = washer.tick();
        ticks += 1;
        if !events.is_empty() {
            on_events(now, &events)?;
        }

        let pause = washer.poll_interval();
        washer.clock().sleep(pause);
    }

    let summary = RunSummary {
        ticks,
        elapsed_ms: washer.now_ms().saturating_sub(start_ms),
        cycles_completed: washer.cycles_completed(),
        final_state: washer.state(),
    };
    tracing::info!(
        ticks = summary.ticks,
        elapsed_ms = summary.elapsed_ms,
        cycles = summary.cycles_completed,
        state = %summary.final_state,
        "control loop stopped"
    );
    Ok(summary)
}
