//! Ultrasonic range conversion
//!
//! The HC-SR04 answers a trigger pulse with an echo pulse whose width is the
//! round trip time of the sound. Sound covers one centimeter and back in
//! roughly 58µs, so the distance is the echo width divided by 58.
//!
//! A missing echo is not an error: nothing reflected within reach, so the
//! way ahead is treated as clear. The same goes for readings beyond the
//! sensor's rated range.

/// Round trip time of one centimeter (µs)
pub const ECHO_US_PER_CM: u32 = 58;

/// Readings beyond this distance are treated as clear
pub const MAX_RANGE_CM: u16 = 400;

/// Forward range reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Range {
    /// Something reflected at this distance (cm)
    Distance(u16),
    /// No echo within the sensor's reach
    Clear,
}

impl Range {
    /// Converts an echo pulse width (µs) into a range, zero meaning no echo
    pub fn from_echo(echo_us: u32) -> Self {
        if echo_us == 0 {
            return Range::Clear;
        }
        let cm = echo_us / ECHO_US_PER_CM;
        if cm > MAX_RANGE_CM as u32 {
            Range::Clear
        } else {
            Range::Distance(cm as u16)
        }
    }

    /// True if an object is strictly closer than `threshold_cm`
    pub fn is_within(&self, threshold_cm: u16) -> bool {
        match self {
            Range::Distance(cm) => *cm < threshold_cm,
            Range::Clear => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_echo_is_clear() {
        assert_eq!(Range::from_echo(0), Range::Clear);
    }

    #[test]
    fn test_echo_converts_to_centimeters() {
        assert_eq!(Range::from_echo(580), Range::Distance(10));
        assert_eq!(Range::from_echo(927), Range::Distance(15));
    }

    #[test]
    fn test_beyond_rated_range_is_clear() {
        assert_eq!(Range::from_echo(401 * ECHO_US_PER_CM), Range::Clear);
        assert_eq!(Range::from_echo(400 * ECHO_US_PER_CM), Range::Distance(400));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(Range::Distance(10).is_within(16));
        assert!(Range::Distance(15).is_within(16));
        assert!(!Range::Distance(16).is_within(16));
        assert!(!Range::Clear.is_within(16));
    }
}
