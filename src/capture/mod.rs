//! Screen capture boundary.
//!
//! The rest of the bot talks to the screen through the `RegionSampler`
//! trait so the driver can run under tests with scripted images. The real
//! implementation grabs the primary monitor via xcap and crops.

pub mod screen;

pub use screen::{RegionSampler, ScreenSampler};
