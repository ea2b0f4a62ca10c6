//! Quarter-turn rotations.
//!
//! A [`Rotation`] is always one of 0, 90, 180 or 270 degrees. Stepping it
//! clockwise or counter-clockwise wraps modulo 360, so four steps in the
//! same direction return to the starting value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Rotation of an entry, in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "i64")]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees.
    Clockwise90,
    /// 180 degrees.
    Rotate180,
    /// 270 degrees.
    Clockwise270,
}

/// Direction of a single rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    /// +90 degrees.
    Clockwise,
    /// -90 degrees.
    CounterClockwise,
}

impl Rotation {
    /// All rotations in ascending order.
    pub const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Clockwise90,
        Rotation::Rotate180,
        Rotation::Clockwise270,
    ];

    /// Parse a rotation from degrees.
    ///
    /// Any multiple of 90 is accepted, including negative values and values
    /// of a full turn or more; the result is normalized into `[0, 360)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRotation`] if `degrees` is not a multiple of 90.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerge::rotation::Rotation;
    ///
    /// assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Clockwise270);
    /// assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Clockwise90);
    /// assert!(Rotation::from_degrees(45).is_err());
    /// ```
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(Error::InvalidRotation { degrees });
        }

        Ok(match degrees.rem_euclid(360) {
            0 => Self::None,
            90 => Self::Clockwise90,
            180 => Self::Rotate180,
            _ => Self::Clockwise270,
        })
    }

    /// Get rotation as degrees.
    pub fn as_degrees(&self) -> u16 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Rotate180 => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// One step clockwise (+90).
    pub fn clockwise(self) -> Self {
        self.step(RotateDirection::Clockwise)
    }

    /// One step counter-clockwise (-90).
    pub fn counter_clockwise(self) -> Self {
        self.step(RotateDirection::CounterClockwise)
    }

    /// One step in `direction`.
    pub fn step(self, direction: RotateDirection) -> Self {
        let delta = match direction {
            RotateDirection::Clockwise => 90,
            RotateDirection::CounterClockwise => -90,
        };
        self.add(delta)
    }

    /// Add a multiple of 90 degrees, wrapping modulo 360.
    ///
    /// Values that are not multiples of 90 are rounded down to the previous
    /// quarter turn.
    pub fn add(self, degrees: i64) -> Self {
        let total = i64::from(self.as_degrees()) + degrees;
        let snapped = total - total.rem_euclid(90);
        Self::from_degrees(snapped).unwrap_or_default()
    }

    /// Whether this rotation exchanges the horizontal and vertical axes.
    pub fn is_quarter_turn(&self) -> bool {
        matches!(self, Self::Clockwise90 | Self::Clockwise270)
    }

    /// Exact `(cos, sin)` of the rotation angle.
    pub fn cos_sin(&self) -> (i64, i64) {
        match self {
            Self::None => (1, 0),
            Self::Clockwise90 => (0, 1),
            Self::Rotate180 => (-1, 0),
            Self::Clockwise270 => (0, -1),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.as_degrees())
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.as_degrees()
    }
}

impl TryFrom<i64> for Rotation {
    type Error = Error;

    fn try_from(degrees: i64) -> Result<Self> {
        Self::from_degrees(degrees)
    }
}

/// Normalize a raw `/Rotate` value into `[0, 360)`.
///
/// PDF requires multiples of 90 but real files carry negative values and
/// full turns; both are accepted here.
pub fn normalize_degrees(degrees: i64) -> i64 {
    degrees.rem_euclid(360)
}
