//! Sensor snapshot and adapter interface
//!
//! The controllers never talk to hardware. Every cycle the driver samples a
//! fresh [`SensorSnapshot`] through a [`SensorSuite`] and hands it to the
//! controller. Snapshots are never kept across cycles.

use crate::range::Range;

/// Dominant surface label under the color sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Label {
    /// The route to follow
    Path,
    /// Payload zone marking
    ZoneA,
    /// Second payload zone marking
    ZoneB,
    /// Background, ambiguous or failed reading
    Unknown,
}

impl Label {
    /// True for either payload zone
    pub fn is_zone(&self) -> bool {
        matches!(self, Label::ZoneA | Label::ZoneB)
    }
}

/// Binary line sensors left and right of the color sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Proximity {
    /// Left sensor sees the line
    pub left: bool,
    /// Right sensor sees the line
    pub right: bool,
}

/// Everything the controllers look at in one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSnapshot {
    pub label: Label,
    pub proximity: Proximity,
    pub range: Range,
}

impl SensorSnapshot {
    /// Snapshot handed to the controller when nothing was sampled
    ///
    /// Reads as "no path, nothing ahead". Controllers that skip sampling
    /// never look at it.
    pub const BLANK: Self = Self {
        label: Label::Unknown,
        proximity: Proximity {
            left: false,
            right: false,
        },
        range: Range::Clear,
    };

    /// Samples all sensors of a suite
    pub async fn sample<S: SensorSuite>(sensors: &mut S) -> Self {
        let label = sensors.current_color().await;
        let range = sensors.current_range().await;
        let proximity = sensors.current_proximity().await;
        Self {
            label,
            proximity,
            range,
        }
    }
}

/// Sensor adapter interface
///
/// Every query must finish within a bounded time and always produce a
/// value: ambiguous readings resolve to [`Label::Unknown`] or
/// [`Range::Clear`], never to an error.
#[allow(async_fn_in_trait)]
pub trait SensorSuite {
    /// Dominant label under the color sensor
    async fn current_color(&mut self) -> Label;

    /// Forward range
    async fn current_range(&mut self) -> Range;

    /// Line sensor pair
    async fn current_proximity(&mut self) -> Proximity;
}
