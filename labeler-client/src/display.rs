//! Per-image viewing adjustments (never persisted)

/// Brightness as a percentage of the original image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightness(u16);

impl Brightness {
    pub const MIN: u16 = 50;
    pub const MAX: u16 = 150;
    pub const DEFAULT: u16 = 100;

    /// Clamp to the slider range
    pub fn new(percent: i32) -> Self {
        let clamped = percent.clamp(i32::from(Self::MIN), i32::from(Self::MAX));
        Self(clamped as u16)
    }

    pub fn percent(&self) -> u16 {
        self.0
    }

    /// Multiplier applied to pixel intensity
    pub fn factor(&self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
