//! Synthetic input boundary.
//!
//! This module provides:
//! - The `InputDriver` trait the rest of the bot emits input through
//! - The enigo-backed implementation (`backend`)
//! - The `ActionDispatcher` mapping decoded elements to key presses and
//!   driving the rewards claim click sequence (`dispatcher`)

pub mod backend;
pub mod dispatcher;

pub use backend::{EnigoDriver, InputDriver};
pub use dispatcher::ActionDispatcher;
