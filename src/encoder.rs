//! Visual encoding of earthquake magnitude.
//!
//! Pure functions mapping a magnitude to the marker color and radius used
//! on the map and in terminal output.

use serde::{Serialize, Serializer};

/// Minimum marker radius, so low-magnitude quakes stay visible.
pub const MIN_RADIUS: f64 = 6.0;

/// Solid marker color, one bracket per magnitude step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// < 2.0
    DeepBlue,
    /// 2.0 - 2.9
    VividBlue,
    /// 3.0 - 3.9
    BoldGreen,
    /// 4.0 - 4.9
    Yellow,
    /// 5.0 - 5.9
    BoldOrange,
    /// 6.0 - 6.9
    BoldRed,
    /// 7.0+
    DarkRed,
}

impl Color {
    /// HEX code for map rendering.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::DeepBlue => "#0033cc",
            Self::VividBlue => "#0066ff",
            Self::BoldGreen => "#009900",
            Self::Yellow => "#ffff00",
            Self::BoldOrange => "#ff9900",
            Self::BoldRed => "#ff0000",
            Self::DarkRed => "#990000",
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hex())
    }
}

/// Map a magnitude to its marker color.
///
/// Step function over fixed thresholds, tested from the highest bracket
/// downward; boundary values belong to the upper bracket. Every finite
/// magnitude maps to exactly one color.
#[must_use]
pub fn color_for(magnitude: f64) -> Color {
    if magnitude >= 7.0 {
        Color::DarkRed
    } else if magnitude >= 6.0 {
        Color::BoldRed
    } else if magnitude >= 5.0 {
        Color::BoldOrange
    } else if magnitude >= 4.0 {
        Color::Yellow
    } else if magnitude >= 3.0 {
        Color::BoldGreen
    } else if magnitude >= 2.0 {
        Color::VividBlue
    } else {
        Color::DeepBlue
    }
}

/// Map a magnitude to its marker radius.
///
/// `max(magnitude * 3, 6)`: unbounded above, floored at [`MIN_RADIUS`] so
/// zero and negative magnitudes still render visibly.
#[must_use]
pub fn radius_for(magnitude: f64) -> f64 {
    (magnitude * 3.0).max(MIN_RADIUS)
}
