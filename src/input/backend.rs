//! Input backend trait and the enigo implementation.

use anyhow::{anyhow, Result};
use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

/// Fire-and-forget physical input events.
///
/// There is no acknowledgement channel; once issued an event is
/// irreversible. Implementations are swapped for recorders in tests.
pub trait InputDriver {
    /// Presses and releases a single character key.
    fn press_key(&mut self, key: char) -> Result<()>;
    /// Moves the pointer to an absolute screen coordinate.
    fn move_mouse(&mut self, x: i32, y: i32) -> Result<()>;
    /// Left-clicks at the current pointer position.
    fn click(&mut self) -> Result<()>;
}

/// Hardware-level input via enigo.
pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow!("failed to initialize input backend: {e}"))?;
        Ok(Self { enigo })
    }

    /// Current pointer position, used by the calibration tool.
    pub fn location(&self) -> Result<(i32, i32)> {
        self.enigo
            .location()
            .map_err(|e| anyhow!("failed to read pointer position: {e}"))
    }
}

impl InputDriver for EnigoDriver {
    fn press_key(&mut self, key: char) -> Result<()> {
        self.enigo
            .key(Key::Unicode(key), Direction::Click)
            .map_err(|e| anyhow!("key press '{key}' failed: {e}"))
    }

    fn move_mouse(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| anyhow!("pointer move to ({x}, {y}) failed: {e}"))
    }

    fn click(&mut self) -> Result<()> {
        self.enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| anyhow!("click failed: {e}"))
    }
}
