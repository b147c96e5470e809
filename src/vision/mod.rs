//! Color-space perception for the minigame.
//!
//! This module provides:
//! - RGB to HSV conversion (`hsv`)
//! - Pixel-count classification against calibrated color rules (`rules`)
//! - Pattern decoding with red/green conflict resolution (`pattern`)

pub mod hsv;
pub mod pattern;
pub mod rules;

pub use pattern::{DetectionResult, Element, ElementSet};
pub use rules::{ColorRule, Detection, HsvRange};
