//! Maps decoded pattern elements to input events.

use std::time::Duration;

use anyhow::Result;
use rand::Rng;

use crate::config::{BotConfig, Point};
use crate::input::backend::InputDriver;
use crate::vision::pattern::ElementSet;

/// Issues key presses and click sequences through an input driver.
///
/// Clicks trust fixed, operator-calibrated coordinates; nothing verifies
/// that a click landed on the intended control.
pub struct ActionDispatcher<I> {
    input: I,
}

impl<I: InputDriver> ActionDispatcher<I> {
    pub fn new(input: I) -> Self {
        Self { input }
    }

    #[cfg(test)]
    pub(crate) fn input_ref(&self) -> &I {
        &self.input
    }

    /// Presses the key for every active element in the set.
    ///
    /// Waits briefly before the first press so the pattern finishes
    /// rendering, and between presses so the input backend does not
    /// coalesce events.
    pub fn react(&mut self, elements: &ElementSet, config: &BotConfig) -> Result<()> {
        std::thread::sleep(Duration::from_millis(config.timing.pre_press_delay_ms));

        for element in elements.active() {
            self.input.press_key(config.keybinds.key(element))?;
            std::thread::sleep(Duration::from_millis(config.timing.key_delay_ms));
        }
        Ok(())
    }

    /// Single walk-back key press for the trigger-zone recovery loop.
    pub fn walk_backward(&mut self, config: &BotConfig) -> Result<()> {
        self.input.press_key(config.keybinds.walk_back)
    }

    /// Clicks through the rewards screen: claim, then exit, then parks the
    /// pointer at a random point away from the screen edges so it is not
    /// left hovering over anything interactive between sessions.
    pub fn claim_rewards(&mut self, config: &BotConfig) -> Result<()> {
        let settle = Duration::from_millis(config.timing.claim_settle_ms);

        std::thread::sleep(settle);
        self.click_at(config.claim_button)?;

        std::thread::sleep(settle);
        self.click_at(config.exit_button)?;

        let (width, height) = config.screen_size;
        let inset = config.park_inset;
        let mut rng = rand::thread_rng();
        let park_x = rng.gen_range(inset..width.saturating_sub(inset).max(inset + 1)) as i32;
        let park_y = rng.gen_range(inset..height.saturating_sub(inset).max(inset + 1)) as i32;
        self.input.move_mouse(park_x, park_y)?;

        Ok(())
    }

    /// Move, micro-wiggle, click.
    ///
    /// The one-pixel wiggle forces the game UI to re-evaluate hover state;
    /// without it a button the pointer was already resting on sometimes
    /// ignores the click.
    fn click_at(&mut self, point: Point) -> Result<()> {
        self.input.move_mouse(point.x, point.y)?;
        std::thread::sleep(Duration::from_millis(50));
        self.input.move_mouse(point.x + 1, point.y + 1)?;
        self.input.move_mouse(point.x, point.y)?;
        std::thread::sleep(Duration::from_millis(50));
        self.input.click()?;
        Ok(())
    }
}
