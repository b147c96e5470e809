//! Automation driver for the minigame.
//!
//! This module provides:
//! - The perception watchers over sampled screen regions (`sensors`)
//! - The round state machine and session statistics (`state`)
//! - The blocking runner with stop rules and ctrl-c wiring (`runner`)

pub mod runner;
pub mod sensors;
pub mod state;

pub use runner::{run, StopRule};
pub use sensors::Perception;
pub use state::{BotContext, BotState, MarkerWait, SessionStats};
