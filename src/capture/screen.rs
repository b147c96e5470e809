//! Region sampling from the primary monitor.

use anyhow::{anyhow, Context, Result};
use image::imageops::crop_imm;
use image::RgbaImage;
use xcap::Monitor;

use crate::config::Region;

/// Produces a color image of a rectangular screen area.
///
/// Implementations must tolerate being polled at up to ~20 Hz.
pub trait RegionSampler {
    fn sample(&mut self, region: &Region) -> Result<RgbaImage>;
}

/// Real sampler backed by xcap full-monitor capture plus a crop.
///
/// Capturing the whole monitor per sample is wasteful but xcap exposes no
/// sub-region grab, and a full 1080p frame is still comfortably inside the
/// polling budget.
pub struct ScreenSampler {
    monitor: Monitor,
}

impl ScreenSampler {
    /// Opens the primary monitor.
    pub fn primary() -> Result<Self> {
        let monitors = Monitor::all().context("failed to enumerate monitors")?;
        let monitor = monitors
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no monitor found"))?;
        Ok(Self { monitor })
    }
}

impl RegionSampler for ScreenSampler {
    fn sample(&mut self, region: &Region) -> Result<RgbaImage> {
        let frame = self
            .monitor
            .capture_image()
            .map_err(|e| anyhow!("screen capture failed: {e}"))?;

        let x = region.x.max(0) as u32;
        let y = region.y.max(0) as u32;
        if x >= frame.width() || y >= frame.height() {
            return Err(anyhow!(
                "region origin ({}, {}) outside the {}x{} frame",
                region.x,
                region.y,
                frame.width(),
                frame.height()
            ));
        }
        let width = region.width.min(frame.width() - x);
        let height = region.height.min(frame.height() - y);

        Ok(crop_imm(&frame, x, y, width, height).to_image())
    }
}
