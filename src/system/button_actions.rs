//! Button Actions Module
//!
//! Maps remote control buttons to operator actions:
//! - A: start the obstacle course, or stop a running section
//! - B: start the line section, or stop a running section
//! - C: stop whatever runs
//! - D: start the target section
//! - D held while idle: gripper open for loading, closes on release
use crate::system::drive_command::DriveLink;
use crate::system::event::{self, ButtonId, Events};
use crate::system::gripper_command::GripperLink;
use crate::system::state::{OperationMode, Section, SYSTEM_STATE};
use course_robot::directive::{ActuatorDirective, GripperPosition};

/// Enum representing the types of button actions
#[derive(Debug, Clone, Copy)]
pub enum ButtonActionType {
    /// Represents a short, single press of a button
    Press,
    /// Represents the moment a button is held down
    HoldStart,
    /// Represents the moment a held button is released
    HoldEnd,
}

/// Handles button actions based on the button ID and action type
pub async fn handle_button_action(button_id: ButtonId, action_type: ButtonActionType) {
    let mode = SYSTEM_STATE.lock().await.operation_mode;

    match (mode, button_id, action_type) {
        (OperationMode::Idle, ButtonId::A, ButtonActionType::Press) => {
            event::send(Events::OperationModeSet(OperationMode::Running(
                Section::ObstacleCourse,
            )))
            .await;
        }
        (OperationMode::Idle, ButtonId::B, ButtonActionType::Press) => {
            event::send(Events::OperationModeSet(OperationMode::Running(
                Section::LineSection,
            )))
            .await;
        }
        (OperationMode::Idle, ButtonId::D, ButtonActionType::Press) => {
            event::send(Events::OperationModeSet(OperationMode::Running(
                Section::TargetSection,
            )))
            .await;
        }
        (OperationMode::Running(_), ButtonId::A | ButtonId::B, ButtonActionType::Press)
        | (_, ButtonId::C, ButtonActionType::Press) => {
            event::send(Events::OperationModeSet(OperationMode::Idle)).await;
        }
        (OperationMode::Idle, ButtonId::D, ButtonActionType::HoldStart) => {
            ActuatorDirective::Grip(GripperPosition::Open)
                .apply(&mut DriveLink, &mut GripperLink);
        }
        (OperationMode::Idle, ButtonId::D, ButtonActionType::HoldEnd) => {
            ActuatorDirective::Grip(GripperPosition::Closed)
                .apply(&mut DriveLink, &mut GripperLink);
        }
        _ => (), // No action for other combinations
    }
}
