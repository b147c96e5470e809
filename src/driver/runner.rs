//! Blocking entry point for the automation loop.
//!
//! Wires the real sampler and input backend into the state machine, sets
//! up the ctrl-c handler, and drives `step()` until the terminal state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use crate::capture::ScreenSampler;
use crate::config::BotConfig;
use crate::driver::state::BotContext;
use crate::input::EnigoDriver;

/// Termination predicate for a run.
///
/// The same driver serves "run N rounds", "run until rewards once" (one
/// round), "run for a duration", and "run until interrupted"; only this
/// rule differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// Run until ctrl-c.
    Unlimited,
    /// Stop after this many completed rounds.
    Rounds(u32),
    /// Stop once this much wall-clock time has elapsed, checked before
    /// each pattern and between rounds.
    Duration(Duration),
}

impl StopRule {
    /// Whether the run should end, checked between rounds.
    pub fn satisfied(&self, rounds_completed: u32, elapsed: Duration) -> bool {
        match self {
            StopRule::Unlimited => false,
            StopRule::Rounds(max) => rounds_completed >= *max,
            StopRule::Duration(limit) => elapsed >= *limit,
        }
    }

    /// Whether the time budget ran out, checked mid-round before each
    /// pattern so a duration-limited run does not start another cycle.
    pub fn time_expired(&self, elapsed: Duration) -> bool {
        matches!(self, StopRule::Duration(limit) if elapsed >= *limit)
    }
}

/// Runs the automation loop until the stop rule or ctrl-c ends it.
///
/// Ctrl-c is honored at poll-loop boundaries only; the session report is
/// printed in every case, including interruption.
pub fn run(config: BotConfig, stop: StopRule) -> Result<()> {
    let abort = Arc::new(AtomicBool::new(false));
    {
        let abort = abort.clone();
        ctrlc::set_handler(move || {
            abort.store(true, Ordering::SeqCst);
        })
        .context("failed to set ctrl-c handler")?;
    }

    let sampler = ScreenSampler::primary()?;
    let input = EnigoDriver::new()?;

    info!("=== glazebot ===");
    match stop {
        StopRule::Unlimited => info!("running until ctrl-c"),
        StopRule::Rounds(n) => info!("running {n} round(s)"),
        StopRule::Duration(d) => info!("running for {:.0}s", d.as_secs_f32()),
    }
    info!("stand behind the trigger area before the countdown ends");

    let mut ctx = BotContext::new(config, sampler, input, stop, abort);
    while ctx.step()? {}

    ctx.stats.log_report();
    Ok(())
}
