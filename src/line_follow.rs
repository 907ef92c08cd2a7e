//! Line section controller
//!
//! Follows the guide line with the color sensor on the line and one binary
//! line sensor on each side. While the color sensor sees the line the robot
//! drives straight. When it loses the line, whichever side sensor now sees
//! it tells which way to pivot; the correction ends as soon as the color
//! sensor finds the line again or the side sensor lets go of it.

use crate::config::LineFollowConfig;
use crate::directive::{ActuatorDirective, TurnDirection};
use crate::sensor::{Label, SensorSnapshot};

/// Line follower state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineFollowState {
    Forward,
    CorrectLeft,
    CorrectRight,
    Stopped,
}

/// Line section controller
#[derive(Debug, Clone)]
pub struct LineFollower {
    config: LineFollowConfig,
    state: LineFollowState,
}

impl LineFollower {
    pub fn new(config: LineFollowConfig) -> Self {
        Self {
            config,
            state: LineFollowState::Forward,
        }
    }

    pub fn state(&self) -> LineFollowState {
        self.state
    }

    /// Parks the robot until [`Self::resume`]
    pub fn stop(&mut self) {
        self.state = LineFollowState::Stopped;
    }

    pub fn resume(&mut self) {
        self.state = LineFollowState::Forward;
    }

    /// One control cycle
    pub fn step(&mut self, sensors: &SensorSnapshot) -> ActuatorDirective {
        let on_line = sensors.label == Label::Path;
        let proximity = sensors.proximity;

        self.state = match self.state {
            LineFollowState::Forward if !on_line && proximity.left => LineFollowState::CorrectLeft,
            LineFollowState::Forward if !on_line && proximity.right => LineFollowState::CorrectRight,
            LineFollowState::CorrectLeft if on_line || !proximity.left => LineFollowState::Forward,
            LineFollowState::CorrectRight if on_line || !proximity.right => LineFollowState::Forward,
            state => state,
        };

        match self.state {
            LineFollowState::Forward => ActuatorDirective::forward(self.config.line_speed),
            LineFollowState::CorrectLeft => self.correction(TurnDirection::Left),
            LineFollowState::CorrectRight => self.correction(TurnDirection::Right),
            LineFollowState::Stopped => ActuatorDirective::Stop,
        }
    }

    fn correction(&self, direction: TurnDirection) -> ActuatorDirective {
        ActuatorDirective::Pivot {
            direction,
            speed: self.config.correction_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Range;
    use crate::sensor::Proximity;

    fn snapshot(label: Label, left: bool, right: bool) -> SensorSnapshot {
        SensorSnapshot {
            label,
            proximity: Proximity { left, right },
            range: Range::Clear,
        }
    }

    #[test]
    fn test_on_line_drives_forward() {
        let mut follower = LineFollower::new(LineFollowConfig::DEFAULT);
        let directive = follower.step(&snapshot(Label::Path, true, true));
        assert_eq!(directive, ActuatorDirective::forward(59));
        assert_eq!(follower.state(), LineFollowState::Forward);
    }

    #[test]
    fn test_left_sensor_steers_left_until_line_found() {
        let mut follower = LineFollower::new(LineFollowConfig::DEFAULT);
        let directive = follower.step(&snapshot(Label::Unknown, true, false));
        assert_eq!(follower.state(), LineFollowState::CorrectLeft);
        assert_eq!(
            directive,
            ActuatorDirective::Pivot {
                direction: TurnDirection::Left,
                speed: 47
            }
        );

        follower.step(&snapshot(Label::Unknown, true, false));
        assert_eq!(follower.state(), LineFollowState::CorrectLeft);

        let directive = follower.step(&snapshot(Label::Path, true, false));
        assert_eq!(follower.state(), LineFollowState::Forward);
        assert_eq!(directive, ActuatorDirective::forward(59));
    }

    #[test]
    fn test_right_correction_ends_when_sensor_clears() {
        let mut follower = LineFollower::new(LineFollowConfig::DEFAULT);
        follower.step(&snapshot(Label::Unknown, false, true));
        assert_eq!(follower.state(), LineFollowState::CorrectRight);
        follower.step(&snapshot(Label::Unknown, false, false));
        assert_eq!(follower.state(), LineFollowState::Forward);
    }

    #[test]
    fn test_left_sensor_checked_first() {
        let mut follower = LineFollower::new(LineFollowConfig::DEFAULT);
        follower.step(&snapshot(Label::Unknown, true, true));
        assert_eq!(follower.state(), LineFollowState::CorrectLeft);
    }

    #[test]
    fn test_lost_line_without_side_hint_keeps_going() {
        let mut follower = LineFollower::new(LineFollowConfig::DEFAULT);
        let directive = follower.step(&snapshot(Label::Unknown, false, false));
        assert_eq!(follower.state(), LineFollowState::Forward);
        assert_eq!(directive, ActuatorDirective::forward(59));
    }

    #[test]
    fn test_stopped_until_resumed() {
        let mut follower = LineFollower::new(LineFollowConfig::DEFAULT);
        follower.stop();
        assert_eq!(
            follower.step(&snapshot(Label::Path, false, false)),
            ActuatorDirective::Stop
        );
        follower.resume();
        assert_eq!(
            follower.step(&snapshot(Label::Path, false, false)),
            ActuatorDirective::forward(59)
        );
    }
}
