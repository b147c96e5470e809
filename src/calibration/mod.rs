//! One-off calibration and diagnostic utilities.
//!
//! These print values for a human operator to transcribe into
//! config.json; nothing here is consumed programmatically by the
//! automation loop.
//!
//! This module provides:
//! - Cursor-based region coordinate capture (`coords`)
//! - Color-mask dumps and a one-shot detection test (`masks`)
//! - A live marker transition monitor (`marker`)

pub mod coords;
pub mod marker;
pub mod masks;

pub use coords::capture_region_coords;
pub use marker::watch_marker;
pub use masks::{dump_masks, run_detection_test};
