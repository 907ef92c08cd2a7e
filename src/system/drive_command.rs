//! Drive Command Module
//!
//! Hands wheel commands from the controllers to the drive task. A new
//! command supersedes one the drive task has not picked up yet.
//!
//! The drive task reports every applied brake through [`STOPPED`]; the
//! gripper waits for that report before it moves.

use course_robot::directive::{DriveTrain, TurnDirection};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal for drive commands
pub static DRIVE: Signal<CriticalSectionRawMutex, Command> = Signal::new();

/// Sends a new drive command
pub fn update(command: Command) {
    DRIVE.signal(command);
}

/// Waits for a new drive command
pub async fn wait() -> Command {
    DRIVE.wait().await
}

/// Signal for brakes the drive task has applied
pub static STOPPED: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Reports an applied brake
pub fn acknowledge_stop() {
    STOPPED.signal(());
}

/// Waits until the drive task has applied a brake requested after the last wait
pub async fn wait_stopped() {
    STOPPED.wait().await
}

/// Drive commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Signed wheel speeds in percent (-100..=100)
    Drive { left: i8, right: i8 },
    /// Apply brakes to stop immediately
    Brake,
    /// Set the driver into standby
    Standby,
}

/// Drive train seen by the controllers, backed by the drive task
pub struct DriveLink;

impl DriveTrain for DriveLink {
    fn drive(&mut self, left: i8, right: i8) {
        update(Command::Drive { left, right });
    }

    fn pivot(&mut self, direction: TurnDirection, speed: i8) {
        let (left, right) = match direction {
            TurnDirection::Left => (-speed, speed),
            TurnDirection::Right => (speed, -speed),
        };
        update(Command::Drive { left, right });
    }

    fn stop(&mut self) {
        // forget brakes applied before this request
        STOPPED.reset();
        update(Command::Brake);
    }
}
