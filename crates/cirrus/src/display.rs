//! Display boundary: where per-tick brightness goes.

/// Receives the screen brightness derived on every advancing tick.
pub trait BrightnessActuator {
    /// Applies a brightness level.
    fn set_brightness(&mut self, level: u8);
}

/// Discards brightness updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullActuator;

impl BrightnessActuator for NullActuator {
    fn set_brightness(&mut self, _level: u8) {}
}

/// Keeps every brightness level it receives, oldest first.
#[derive(Clone, Debug, Default)]
pub struct RecordingActuator {
    levels: Vec<u8>,
}

impl RecordingActuator {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded levels.
    #[must_use]
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    /// Most recent level.
    #[must_use]
    pub fn last(&self) -> Option<u8> {
        self.levels.last().copied()
    }
}

impl BrightnessActuator for RecordingActuator {
    fn set_brightness(&mut self, level: u8) {
        self.levels.push(level);
    }
}

impl<F: FnMut(u8)> BrightnessActuator for F {
    fn set_brightness(&mut self, level: u8) {
        self(level);
    }
}

/// Rounds a brightness value to an actuator level.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn brightness_level(brightness: f64) -> u8 {
    brightness.round().clamp(0.0, 255.0) as u8
}
