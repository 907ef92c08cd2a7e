//! Color classification
//!
//! The TCS3200 reports each color channel as a square wave whose period
//! shrinks as the reflected intensity of that channel grows. The firmware
//! measures one period per filter and hands the triple to [`classify`].
//!
//! # Rules
//! - All three periods above the black threshold: the surface is black
//! - Any period of zero means the pulse timed out: unknown
//! - Otherwise the channel with the shortest period dominates
//!
//! [`ColorMap`] then turns the raw color into the [`Label`] the controllers
//! reason about. Each course section uses its own map.

use crate::sensor::Label;

/// Periods above this (µs) on every channel count as black
pub const BLACK_THRESHOLD_US: u32 = 200;

/// Raw classification result of the color sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Red,
    Green,
    Blue,
    Black,
    Unknown,
}

/// One measured period per filter, in microseconds. Zero means no pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorPeriods {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

/// Classifies a period triple into the dominant color
pub fn classify(periods: ColorPeriods, black_threshold: u32) -> Color {
    let ColorPeriods { red, green, blue } = periods;

    if red > black_threshold && green > black_threshold && blue > black_threshold {
        return Color::Black;
    }

    if red == 0 || green == 0 || blue == 0 {
        return Color::Unknown;
    }

    // ties go to the first channel, in red, green, blue order
    let shortest = red.min(green).min(blue);
    if shortest == red {
        Color::Red
    } else if shortest == green {
        Color::Green
    } else {
        Color::Blue
    }
}

/// Maps raw colors onto the labels of one course section
///
/// Colors that are not mapped resolve to [`Label::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorMap {
    pub path: Color,
    pub zone_a: Option<Color>,
    pub zone_b: Option<Color>,
}

impl ColorMap {
    /// Obstacle course: red path, blue payload zones
    pub const OBSTACLE_COURSE: Self = Self {
        path: Color::Red,
        zone_a: Some(Color::Blue),
        zone_b: None,
    };

    /// Line section: black guide line, no zones
    pub const LINE_SECTION: Self = Self {
        path: Color::Black,
        zone_a: None,
        zone_b: None,
    };

    /// Target section: black box in the center, blue margin, green circle
    pub const TARGET: Self = Self {
        path: Color::Black,
        zone_a: Some(Color::Blue),
        zone_b: Some(Color::Green),
    };

    /// Resolves a raw color to a label
    pub fn label(&self, color: Color) -> Label {
        if color == Color::Unknown {
            Label::Unknown
        } else if color == self.path {
            Label::Path
        } else if Some(color) == self.zone_a {
            Label::ZoneA
        } else if Some(color) == self.zone_b {
            Label::ZoneB
        } else {
            Label::Unknown
        }
    }

    /// A map is usable when the path color is a real color that no zone shares
    pub fn is_consistent(&self) -> bool {
        self.path != Color::Unknown
            && self.zone_a != Some(self.path)
            && self.zone_b != Some(self.path)
            && (self.zone_a.is_none() || self.zone_a != self.zone_b)
    }
}
