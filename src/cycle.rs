//! Control cycle
//!
//! Glue between sensors, controllers and actuators for one cycle. The
//! firmware calls these from its ticker loop; tests call them with scripted
//! sensors and recording actuators.

use embassy_time::Instant;

use crate::directive::{ActuatorDirective, DriveTrain, Manipulator};
use crate::line_follow::{LineFollowState, LineFollower};
use crate::navigation::{self, ControllerContext, NavigationState};
use crate::sensor::{SensorSnapshot, SensorSuite};
use crate::target::{TargetSeeker, TargetState};

/// What one obstacle course cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub from: NavigationState,
    pub to: NavigationState,
    pub directive: ActuatorDirective,
}

impl CycleReport {
    pub fn transitioned(&self) -> bool {
        self.from != self.to
    }
}

/// Runs one obstacle course cycle
///
/// Sensors are only sampled when the controller looks at them. The clock is
/// read after sampling so deadlines are judged against the time the
/// decision is made.
pub async fn run_cycle<S, D, M>(
    ctx: &mut ControllerContext,
    sensors: &mut S,
    drive: &mut D,
    gripper: &mut M,
    clock: impl FnOnce() -> Instant,
) -> CycleReport
where
    S: SensorSuite,
    D: DriveTrain,
    M: Manipulator,
{
    let snapshot = if ctx.needs_sensors() {
        SensorSnapshot::sample(sensors).await
    } else {
        SensorSnapshot::BLANK
    };

    let from = ctx.state();
    let directive = navigation::step(&snapshot, clock(), ctx);
    directive.apply(drive, gripper);

    CycleReport {
        from,
        to: ctx.state(),
        directive,
    }
}

/// Runs one line section cycle, returning the state before and after
pub async fn run_line_cycle<S, D, M>(
    follower: &mut LineFollower,
    sensors: &mut S,
    drive: &mut D,
    gripper: &mut M,
) -> (LineFollowState, LineFollowState)
where
    S: SensorSuite,
    D: DriveTrain,
    M: Manipulator,
{
    let from = follower.state();
    let snapshot = if from == LineFollowState::Stopped {
        SensorSnapshot::BLANK
    } else {
        SensorSnapshot::sample(sensors).await
    };
    follower.step(&snapshot).apply(drive, gripper);
    (from, follower.state())
}

/// Runs one target section cycle, returning the state before and after
pub async fn run_target_cycle<S, D, M>(
    seeker: &mut TargetSeeker,
    sensors: &mut S,
    drive: &mut D,
    gripper: &mut M,
    clock: impl FnOnce() -> Instant,
) -> (TargetState, TargetState)
where
    S: SensorSuite,
    D: DriveTrain,
    M: Manipulator,
{
    let from = seeker.state();
    let snapshot = if seeker.needs_sensors() {
        SensorSnapshot::sample(sensors).await
    } else {
        SensorSnapshot::BLANK
    };
    seeker.step(&snapshot, clock()).apply(drive, gripper);
    (from, seeker.state())
}
