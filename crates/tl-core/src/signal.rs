//! Traffic-light display state and orientation.

use std::fmt;

/// What a traffic light is currently showing.
///
/// The cycle order is GREEN → YELLOW → RED → GREEN, but which state a light
/// shows on a given step is decided entirely by its control algorithm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum LightState {
    /// Every light starts RED.
    #[default]
    Red,
    Yellow,
    Green,
}

impl LightState {
    #[inline]
    pub fn is_green(self) -> bool {
        self == LightState::Green
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LightState::Red    => "RED",
            LightState::Yellow => "YELLOW",
            LightState::Green  => "GREEN",
        };
        f.write_str(s)
    }
}

/// The traffic axis a light controls.  Fixed at creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Controls traffic moving along the x axis.
    Horizontal,
    /// Controls traffic moving along the y axis.
    Vertical,
}

impl Direction {
    /// Coordinate along the controlled axis.
    #[inline]
    pub fn along(self, p: crate::Point) -> f64 {
        match self {
            Direction::Horizontal => p.x,
            Direction::Vertical   => p.y,
        }
    }

    /// Coordinate across the controlled axis.
    #[inline]
    pub fn across(self, p: crate::Point) -> f64 {
        match self {
            Direction::Horizontal => p.y,
            Direction::Vertical   => p.x,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Horizontal => f.write_str("horizontal"),
            Direction::Vertical   => f.write_str("vertical"),
        }
    }
}
