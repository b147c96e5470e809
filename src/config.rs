//! Configuration for the automation bot.
//!
//! Loads settings from config.json at startup. Provides screen regions,
//! HSV color rules, keybinds, click targets, and timing parameters.
//! All values are fixed after load; the rest of the bot only reads them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::vision::{ColorRule, Element, HsvRange};

/// A rectangle in absolute screen pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// X position of the top-left corner
    pub x: i32,
    /// Y position of the top-left corner
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A point in absolute screen pixel coordinates (click targets).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Color rules for the five pattern elements.
///
/// Hue values use the OpenCV convention (0-179); saturation and value
/// are 0-255. The ranges were calibrated against mask dumps of real
/// pattern captures, so they are sharp on purpose.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternRules {
    pub green_glaze: ColorRule,
    pub red_glaze: ColorRule,
    pub blue_sprinkles: ColorRule,
    pub grapes: ColorRule,
    pub eyes: ColorRule,
}

impl PatternRules {
    /// Returns the rule for a pattern element.
    pub fn rule(&self, element: Element) -> &ColorRule {
        match element {
            Element::GreenGlaze => &self.green_glaze,
            Element::RedGlaze => &self.red_glaze,
            Element::BlueSprinkles => &self.blue_sprinkles,
            Element::Grapes => &self.grapes,
            Element::Eyes => &self.eyes,
        }
    }
}

impl Default for PatternRules {
    fn default() -> Self {
        Self {
            // Bright lime/neon green
            green_glaze: ColorRule::new(HsvRange::new([35, 150, 150], [85, 255, 255]), 1000),
            // Very sharp red/pink only; hue wraps around 0 so two ranges
            red_glaze: ColorRule::with_wrap(
                HsvRange::new([0, 180, 180], [8, 255, 255]),
                HsvRange::new([170, 180, 180], [180, 255, 255]),
                200,
            ),
            // Sharp blue/cyan dots
            blue_sprinkles: ColorRule::new(HsvRange::new([95, 120, 120], [115, 255, 255]), 100),
            // Sharp purple
            grapes: ColorRule::new(HsvRange::new([135, 100, 100], [155, 255, 255]), 40),
            // Dark brown/chocolate spots
            eyes: ColorRule::new(HsvRange::new([0, 25, 15], [30, 180, 85]), 60),
        }
    }
}

/// Key bindings for reacting to pattern elements and for movement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Keybinds {
    pub green_glaze: char,
    pub red_glaze: char,
    pub blue_sprinkles: char,
    pub grapes: char,
    pub eyes: char,
    /// Held direction key used to walk back into the trigger zone
    pub walk_back: char,
}

impl Keybinds {
    /// Returns the key bound to a pattern element.
    pub fn key(&self, element: Element) -> char {
        match element {
            Element::GreenGlaze => self.green_glaze,
            Element::RedGlaze => self.red_glaze,
            Element::BlueSprinkles => self.blue_sprinkles,
            Element::Grapes => self.grapes,
            Element::Eyes => self.eyes,
        }
    }
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            green_glaze: 'q',
            red_glaze: 'e',
            blue_sprinkles: 'a',
            grapes: 's',
            eyes: 'd',
            walk_back: 's',
        }
    }
}

/// Timing parameters, all in milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timing {
    /// Delay after start before the first round (alt-tab grace period)
    pub startup_delay_ms: u64,
    /// Poll interval for the marker-cycle and zone waits
    pub poll_interval_ms: u64,
    /// Delay before the first key press, letting the pattern finish rendering
    pub pre_press_delay_ms: u64,
    /// Delay between key presses so the input backend does not coalesce them
    pub key_delay_ms: u64,
    /// Cadence of walk-back presses while outside the trigger zone
    pub walk_cadence_ms: u64,
    /// Pause between rounds
    pub inter_round_delay_ms: u64,
    /// Settle time before each click in the rewards claim sequence
    pub claim_settle_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            startup_delay_ms: 5000,
            poll_interval_ms: 50,
            pre_press_delay_ms: 100,
            key_delay_ms: 50,
            walk_cadence_ms: 200,
            inter_round_delay_ms: 2000,
            claim_settle_ms: 2000,
        }
    }
}

fn default_pattern_region() -> Region {
    Region::new(1652, 188, 204, 202)
}

fn default_marker_region() -> Region {
    Region::new(1785, 191, 63, 65)
}

fn default_zone_region() -> Region {
    Region::new(1401, 131, 121, 51)
}

fn default_rewards_region() -> Region {
    Region::new(760, 430, 400, 200)
}

fn default_marker_rule() -> ColorRule {
    // White checkmark on the pattern card
    ColorRule::new(HsvRange::new([0, 0, 200], [180, 30, 255]), 50)
}

fn default_rewards_rule() -> ColorRule {
    // The claim button is a large solid green area; the high threshold
    // rejects incidental green pixels elsewhere in the region.
    ColorRule::new(HsvRange::new([35, 150, 150], [85, 255, 255]), 1500)
}

fn default_zone_rule() -> ColorRule {
    // Blue UI bar that is only visible while standing outside the zone
    ColorRule::new(HsvRange::new([85, 100, 100], [110, 255, 255]), 100)
}

fn default_claim_button() -> Point {
    Point { x: 960, y: 820 }
}

fn default_exit_button() -> Point {
    Point { x: 960, y: 985 }
}

fn default_screen_size() -> (u32, u32) {
    (1920, 1080)
}

fn default_park_inset() -> u32 {
    100
}

/// Complete bot configuration.
///
/// The default values are calibrated for a 1920x1080 screen with the game
/// window maximized. Any field can be overridden via config.json.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Region containing the pattern card
    #[serde(default = "default_pattern_region")]
    pub pattern_region: Region,
    /// Region containing the completion checkmark
    #[serde(default = "default_marker_region")]
    pub marker_region: Region,
    /// Region of the blue bar that indicates the player left the trigger zone
    #[serde(default = "default_zone_region")]
    pub zone_region: Region,
    /// Region sampled to detect the end-of-session rewards screen
    #[serde(default = "default_rewards_region")]
    pub rewards_region: Region,
    #[serde(default)]
    pub pattern_rules: PatternRules,
    #[serde(default = "default_marker_rule")]
    pub marker_rule: ColorRule,
    #[serde(default = "default_rewards_rule")]
    pub rewards_rule: ColorRule,
    #[serde(default = "default_zone_rule")]
    pub zone_rule: ColorRule,
    #[serde(default)]
    pub keybinds: Keybinds,
    /// Center of the "Claim" button on the rewards screen
    #[serde(default = "default_claim_button")]
    pub claim_button: Point,
    /// Center of the "Exit" button shown after claiming
    #[serde(default = "default_exit_button")]
    pub exit_button: Point,
    /// Screen dimensions, used to park the pointer after a claim
    #[serde(default = "default_screen_size")]
    pub screen_size: (u32, u32),
    /// Inset from the screen edges for the random pointer park
    #[serde(default = "default_park_inset")]
    pub park_inset: u32,
    #[serde(default)]
    pub timing: Timing,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            pattern_region: default_pattern_region(),
            marker_region: default_marker_region(),
            zone_region: default_zone_region(),
            rewards_region: default_rewards_region(),
            pattern_rules: PatternRules::default(),
            marker_rule: default_marker_rule(),
            rewards_rule: default_rewards_rule(),
            zone_rule: default_zone_rule(),
            keybinds: Keybinds::default(),
            claim_button: default_claim_button(),
            exit_button: default_exit_button(),
            screen_size: default_screen_size(),
            park_inset: default_park_inset(),
            timing: Timing::default(),
        }
    }
}

/// Loads configuration from an explicit path, or from config.json next to
/// the executable, falling back to the calibrated defaults.
pub fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    let config_path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
            .unwrap_or_else(|| PathBuf::from("config.json")),
    };

    if config_path.exists() {
        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: BotConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        log::info!("Config loaded from {}", config_path.display());
        return Ok(config);
    }

    if path.is_some() {
        anyhow::bail!("config file not found: {}", config_path.display());
    }

    log::info!("config.json not found, using default config");
    Ok(BotConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_json() {
        let config = BotConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: BotConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pattern_region, config.pattern_region);
        assert_eq!(parsed.keybinds.green_glaze, 'q');
        assert_eq!(parsed.timing.poll_interval_ms, 50);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{ "pattern_region": { "x": 10, "y": 20, "width": 30, "height": 40 } }"#;
        let config: BotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.pattern_region, Region::new(10, 20, 30, 40));
        assert_eq!(config.marker_region, Region::new(1785, 191, 63, 65));
        assert_eq!(config.pattern_rules.green_glaze.threshold, 1000);
    }

    #[test]
    fn test_element_key_table() {
        let keys = Keybinds::default();
        assert_eq!(keys.key(Element::GreenGlaze), 'q');
        assert_eq!(keys.key(Element::RedGlaze), 'e');
        assert_eq!(keys.key(Element::BlueSprinkles), 'a');
        assert_eq!(keys.key(Element::Grapes), 's');
        assert_eq!(keys.key(Element::Eyes), 'd');
    }
}
