//! Actuator directives
//!
//! A controller emits exactly one [`ActuatorDirective`] per cycle. Directives
//! are fire-and-forget: applying a new one supersedes whatever the previous
//! one started, nothing is queued.
//!
//! Speeds are signed percentages (-100..=100) per wheel, the same unit the
//! TB6612FNG driver takes.

/// Side of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// The other side
    pub fn opposite(self) -> Self {
        match self {
            TurnDirection::Left => TurnDirection::Right,
            TurnDirection::Right => TurnDirection::Left,
        }
    }
}

/// Gripper position; the servo has no position feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GripperPosition {
    Open,
    Closed,
}

/// One actuator command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorDirective {
    /// Both wheels at the given signed speeds
    Drive { left: i8, right: i8 },
    /// Turn in place: outer wheel forward, inner wheel backward
    Pivot { direction: TurnDirection, speed: i8 },
    /// Both wheels off
    Stop,
    /// Stop the wheels, then move the gripper
    Grip(GripperPosition),
}

impl ActuatorDirective {
    /// Straight forward
    pub const fn forward(speed: i8) -> Self {
        ActuatorDirective::Drive {
            left: speed,
            right: speed,
        }
    }

    /// Straight backward
    pub const fn backward(speed: i8) -> Self {
        ActuatorDirective::Drive {
            left: -speed,
            right: -speed,
        }
    }

    /// Forward arc curving toward `direction`: the wheel on that side runs slow
    pub const fn arc(direction: TurnDirection, inner: i8, outer: i8) -> Self {
        match direction {
            TurnDirection::Left => ActuatorDirective::Drive {
                left: inner,
                right: outer,
            },
            TurnDirection::Right => ActuatorDirective::Drive {
                left: outer,
                right: inner,
            },
        }
    }

    /// True if this directive moves the gripper
    pub fn is_manipulation(&self) -> bool {
        matches!(self, ActuatorDirective::Grip(_))
    }

    /// Hands the directive to the actuators
    ///
    /// Gripper directives request a stop before the gripper command. Adapters
    /// that carry the two out asynchronously must hold the gripper back until
    /// the drive has actually stopped.
    pub fn apply<D: DriveTrain, M: Manipulator>(&self, drive: &mut D, gripper: &mut M) {
        match *self {
            ActuatorDirective::Drive { left, right } => {
                if left == 0 && right == 0 {
                    drive.stop();
                } else {
                    drive.drive(left, right);
                }
            }
            ActuatorDirective::Pivot { direction, speed } => drive.pivot(direction, speed),
            ActuatorDirective::Stop => drive.stop(),
            ActuatorDirective::Grip(position) => {
                drive.stop();
                gripper.set(position);
            }
        }
    }
}

/// Differential drive, open loop
pub trait DriveTrain {
    /// Sets both wheel speeds (signed percent)
    fn drive(&mut self, left: i8, right: i8);

    /// Starts turning in place; runs until superseded
    fn pivot(&mut self, direction: TurnDirection, speed: i8);

    /// Both wheels off
    fn stop(&mut self);
}

/// Gripper actuator
pub trait Manipulator {
    fn set(&mut self, position: GripperPosition);
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        last_drive: Option<(i8, i8)>,
        last_grip: Option<GripperPosition>,
    }

    impl DriveTrain for Recorder {
        fn drive(&mut self, left: i8, right: i8) {
            self.calls.push("drive");
            self.last_drive = Some((left, right));
        }

        fn pivot(&mut self, _direction: TurnDirection, _speed: i8) {
            self.calls.push("pivot");
        }

        fn stop(&mut self) {
            self.calls.push("stop");
        }
    }

    impl Manipulator for Recorder {
        fn set(&mut self, position: GripperPosition) {
            self.calls.push("grip");
            self.last_grip = Some(position);
        }
    }

    #[test]
    fn test_arc_slows_the_inner_wheel() {
        assert_eq!(
            ActuatorDirective::arc(TurnDirection::Left, 41, 63),
            ActuatorDirective::Drive { left: 41, right: 63 }
        );
        assert_eq!(
            ActuatorDirective::arc(TurnDirection::Right, 41, 63),
            ActuatorDirective::Drive { left: 63, right: 41 }
        );
    }

    #[test]
    fn test_grip_stops_before_moving_the_gripper() {
        let mut drive = Recorder::default();
        let mut gripper = Recorder::default();
        ActuatorDirective::Grip(GripperPosition::Closed).apply(&mut drive, &mut gripper);
        assert_eq!(drive.calls, vec!["stop"]);
        assert_eq!(gripper.last_grip, Some(GripperPosition::Closed));
    }

    /// Drive and gripper writing into one log
    struct SharedLog<'a>(&'a RefCell<Vec<&'static str>>);

    impl DriveTrain for SharedLog<'_> {
        fn drive(&mut self, _left: i8, _right: i8) {
            self.0.borrow_mut().push("drive");
        }

        fn pivot(&mut self, _direction: TurnDirection, _speed: i8) {
            self.0.borrow_mut().push("pivot");
        }

        fn stop(&mut self) {
            self.0.borrow_mut().push("stop");
        }
    }

    impl Manipulator for SharedLog<'_> {
        fn set(&mut self, _position: GripperPosition) {
            self.0.borrow_mut().push("grip");
        }
    }

    #[test]
    fn test_stop_is_requested_before_the_gripper() {
        let log = RefCell::new(Vec::new());
        ActuatorDirective::Grip(GripperPosition::Open)
            .apply(&mut SharedLog(&log), &mut SharedLog(&log));
        assert_eq!(log.into_inner(), vec!["stop", "grip"]);
    }

    #[test]
    fn test_zero_drive_is_a_stop() {
        let mut drive = Recorder::default();
        let mut gripper = Recorder::default();
        ActuatorDirective::forward(0).apply(&mut drive, &mut gripper);
        assert_eq!(drive.calls, vec!["stop"]);
        assert!(gripper.calls.is_empty());
    }

    #[test]
    fn test_backward_negates_both_wheels() {
        let mut drive = Recorder::default();
        let mut gripper = Recorder::default();
        ActuatorDirective::backward(45).apply(&mut drive, &mut gripper);
        assert_eq!(drive.last_drive, Some((-45, -45)));
    }

    #[test]
    fn test_opposite_direction() {
        assert_eq!(TurnDirection::Left.opposite(), TurnDirection::Right);
        assert_eq!(TurnDirection::Right.opposite(), TurnDirection::Left);
    }
}
