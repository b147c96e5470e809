//! Perception watchers over sampled screen regions.
//!
//! Each watcher is a single classifier call against its configured region
//! and rule. A failed capture propagates; an unreadable image merely
//! classifies as absent.

use anyhow::Result;

use crate::capture::RegionSampler;
use crate::config::BotConfig;
use crate::vision::pattern::{detect_elements, resolve, DetectionResult, ElementSet};
use crate::vision::rules::classify;

/// Converts screen regions into the driver's symbolic state.
pub struct Perception<S> {
    sampler: S,
}

impl<S: RegionSampler> Perception<S> {
    pub fn new(sampler: S) -> Self {
        Self { sampler }
    }

    #[cfg(test)]
    pub(crate) fn sampler_ref(&self) -> &S {
        &self.sampler
    }

    /// Whether the completion checkmark is currently showing.
    ///
    /// Only ever used edge-triggered; the driver waits for transitions,
    /// never for a sustained level.
    pub fn marker_present(&mut self, config: &BotConfig) -> Result<bool> {
        let img = self.sampler.sample(&config.marker_region)?;
        Ok(classify(&img, &config.marker_rule).present)
    }

    /// Whether the end-of-session rewards panel is showing.
    pub fn rewards_visible(&mut self, config: &BotConfig) -> Result<bool> {
        let img = self.sampler.sample(&config.rewards_region)?;
        Ok(classify(&img, &config.rewards_rule).present)
    }

    /// Whether the player is standing outside the trigger zone.
    ///
    /// The blue indicator bar is only drawn while outside, so a pixel
    /// count above the threshold means "outside".
    pub fn outside_zone(&mut self, config: &BotConfig) -> Result<bool> {
        let img = self.sampler.sample(&config.zone_region)?;
        Ok(classify(&img, &config.zone_rule).present)
    }

    /// Samples the pattern region and decodes it into an element set.
    ///
    /// Returns the raw per-rule counts alongside the resolved set so the
    /// driver can log them.
    pub fn read_pattern(&mut self, config: &BotConfig) -> Result<(ElementSet, DetectionResult)> {
        let img = self.sampler.sample(&config.pattern_region)?;
        let raw = detect_elements(&img, &config.pattern_rules);
        Ok((resolve(&raw), raw))
    }
}
