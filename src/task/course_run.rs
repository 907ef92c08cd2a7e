//! Course Run
//!
//! Owns the sensors and runs the section controllers on a fixed cadence.
//!
//! # Operation
//! - Waits for a start command from the orchestrator
//! - Builds a fresh controller for the section and validates its config
//! - Runs one cycle every [`CYCLE_PERIOD`] until the controller completes
//!   or a stop command arrives
//! - Parks the drive afterwards
//!
//! The obstacle course and the target section end on their own; the line
//! section runs until the operator stops it.

use crate::system::drive_command::{self, DriveLink};
use crate::system::event::{self, Events};
use crate::system::gripper_command::GripperLink;
use crate::system::resources::{ColorSensorResources, LineSensorResources, RangeSensorResources};
use crate::system::run_command::{self, Command};
use crate::system::sensors::{ColorSensor, CourseSensors, LineSensors, RangeSensor};
use crate::system::state::Section;
use course_robot::config::{LineFollowConfig, NavigationConfig, TargetConfig};
use course_robot::cycle::{run_cycle, run_line_cycle, run_target_cycle};
use course_robot::directive::{ActuatorDirective, GripperPosition};
use course_robot::line_follow::LineFollower;
use course_robot::navigation::{ControllerContext, NavigationState, Outcome};
use course_robot::target::{TargetSeeker, TargetState};
use defmt::{error, info};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Ticker};

/// Time between two control cycles
pub const CYCLE_PERIOD: Duration = Duration::from_millis(35);

#[embassy_executor::task]
pub async fn course_run(
    color: ColorSensorResources,
    range: RangeSensorResources,
    line: LineSensorResources,
) {
    let mut sensors = CourseSensors::new(
        ColorSensor::new(color),
        RangeSensor::new(range),
        LineSensors::new(line),
    );

    loop {
        let section = match run_command::wait().await {
            Command::Start(section) => section,
            Command::Stop => continue,
        };

        let run = async {
            match section {
                Section::ObstacleCourse => run_obstacle_course(&mut sensors).await,
                Section::LineSection => run_line_section(&mut sensors).await,
                Section::TargetSection => run_target_section(&mut sensors).await,
            }
        };

        match select(run, run_command::wait_for_stop()).await {
            Either::First(outcome) => {
                drive_command::update(drive_command::Command::Standby);
                event::send(Events::RunFinished(outcome)).await;
            }
            Either::Second(()) => {
                info!("{} stopped by operator", section);
                drive_command::update(drive_command::Command::Standby);
            }
        }
    }
}

/// Runs the obstacle course until the controller completes
async fn run_obstacle_course(sensors: &mut CourseSensors<'static>) -> Outcome {
    let config = NavigationConfig::DEFAULT;
    if let Err(e) = config.validate() {
        error!("Navigation config rejected: {}", e);
        return Outcome::Aborted;
    }
    sensors.set_colors(config.colors);

    let mut ctx = ControllerContext::new(config);
    let mut drive = DriveLink;
    let mut gripper = GripperLink;

    // empty claw on the way to the first zone
    ActuatorDirective::Grip(GripperPosition::Open).apply(&mut drive, &mut gripper);

    info!("Obstacle course started in {}", ctx.state());
    let mut ticker = Ticker::every(CYCLE_PERIOD);
    loop {
        let report = run_cycle(&mut ctx, sensors, &mut drive, &mut gripper, Instant::now).await;

        if report.transitioned() {
            info!("{} -> {} ({})", report.from, report.to, report.directive);
        }
        if report.to == NavigationState::Complete {
            info!(
                "Obstacle course complete after {} drop-offs",
                ctx.drop_offs()
            );
            return ctx.outcome();
        }

        ticker.next().await;
    }
}

/// Runs the line section; only a stop command ends it
async fn run_line_section(sensors: &mut CourseSensors<'static>) -> Outcome {
    let config = LineFollowConfig::DEFAULT;
    if let Err(e) = config.validate() {
        error!("Line follow config rejected: {}", e);
        return Outcome::Aborted;
    }
    sensors.set_colors(config.colors);

    let mut follower = LineFollower::new(config);
    let mut drive = DriveLink;
    let mut gripper = GripperLink;

    info!("Line section started");
    let mut ticker = Ticker::every(CYCLE_PERIOD);
    loop {
        let (from, to) = run_line_cycle(&mut follower, sensors, &mut drive, &mut gripper).await;
        if from != to {
            info!("line {} -> {}", from, to);
        }
        ticker.next().await;
    }
}

/// Runs the target section until the robot stops on the box
async fn run_target_section(sensors: &mut CourseSensors<'static>) -> Outcome {
    let config = TargetConfig::DEFAULT;
    if let Err(e) = config.validate() {
        error!("Target config rejected: {}", e);
        return Outcome::Aborted;
    }
    sensors.set_colors(config.colors);

    // placement and start time differ on every run, good enough for a heading
    let now = Instant::now();
    let mut seeker = TargetSeeker::new(config, now.as_ticks(), now);
    let mut drive = DriveLink;
    let mut gripper = GripperLink;

    info!("Target section started, heading {}", seeker.heading());
    let mut ticker = Ticker::every(CYCLE_PERIOD);
    loop {
        let (from, to) =
            run_target_cycle(&mut seeker, sensors, &mut drive, &mut gripper, Instant::now).await;
        if from != to {
            info!("target {} -> {}", from, to);
        }
        if to == TargetState::Complete {
            info!(
                "Target box found after {} restarts, last crossing {} ms",
                seeker.restarts(),
                seeker.crossing().as_millis()
            );
            return Outcome::Finished;
        }
        ticker.next().await;
    }
}
