//! Distance measurement type

use core::fmt;

use sonic_protocol::Frame;

/// A measured distance in whole millimetres
///
/// The A02 protocol carries a 16-bit millimetre count, so every value in
/// `0..=65535` is representable and nothing else is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Distance(u16);

impl Distance {
    /// Zero distance
    pub const ZERO: Self = Self(0);

    /// Largest distance the protocol can express
    pub const MAX: Self = Self(u16::MAX);

    /// Create from a millimetre count
    pub const fn from_millimeters(mm: u16) -> Self {
        Self(mm)
    }

    /// Distance in millimetres
    pub const fn millimeters(self) -> u16 {
        self.0
    }

    /// Distance in whole centimetres (truncated)
    pub const fn centimeters(self) -> u16 {
        self.0 / 10
    }

    /// Distance in metres
    pub fn meters(self) -> f32 {
        self.0 as f32 / 1000.0
    }

    /// Distance in inches
    pub fn inches(self) -> f32 {
        self.0 as f32 / 25.4
    }
}

impl From<Frame> for Distance {
    fn from(frame: Frame) -> Self {
        Self(frame.distance_mm())
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mm", self.0)
    }
}
