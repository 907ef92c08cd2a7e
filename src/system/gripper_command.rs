//! Gripper Command Module
//!
//! Hands gripper positions to the gripper task.

use course_robot::directive::{GripperPosition, Manipulator};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal for gripper positions
pub static GRIPPER: Signal<CriticalSectionRawMutex, GripperPosition> = Signal::new();

/// Requests a gripper position
pub fn update(position: GripperPosition) {
    GRIPPER.signal(position);
}

/// Waits for the next requested position
pub async fn wait() -> GripperPosition {
    GRIPPER.wait().await
}

/// Gripper seen by the controllers, backed by the gripper task
pub struct GripperLink;

impl Manipulator for GripperLink {
    fn set(&mut self, position: GripperPosition) {
        update(position);
    }
}
