//! Orchestrator Module
//!
//! This module contains the main orchestrator task that manages the robot's overall behavior
//! by handling system events and coordinating state changes.

use crate::system::button_actions::{self, ButtonActionType};
use crate::system::event::{self, Events};
use crate::system::indicator;
use crate::system::run_command;
use crate::system::state::{OperationMode, SYSTEM_STATE};
use course_robot::navigation::Outcome;
use defmt::{info, warn};

/// Main orchestrator task
///
/// Listens for system events, updates the system state and starts or stops
/// the course run.
#[embassy_executor::task]
pub async fn orchestrate() {
    info!("Orchestrator started");
    loop {
        let event = event::wait().await;
        if let Some(state_change) = process_event(event).await {
            handle_state_changes(state_change).await;
        }
    }
}

/// Applies an event to the system state
///
/// Returns the event if it changed something worth reacting to.
async fn process_event(event: Events) -> Option<Events> {
    let mut state = SYSTEM_STATE.lock().await;

    match event {
        Events::OperationModeSet(new_mode) => {
            if state.operation_mode != new_mode {
                state.set_operation_mode(new_mode);
                Some(event)
            } else {
                None
            }
        }
        Events::RunFinished(outcome) => {
            state.finish_run(outcome);
            Some(event)
        }
        Events::ButtonPressed(_) | Events::ButtonHoldStart(_) | Events::ButtonHoldEnd(_) => {
            Some(event)
        }
    }
}

/// Performs the actions belonging to a state change
async fn handle_state_changes(event: Events) {
    match event {
        Events::OperationModeSet(OperationMode::Running(section)) => {
            info!("Starting {}", section);
            run_command::signal(run_command::Command::Start(section));
            indicator::update(true);
        }
        Events::OperationModeSet(OperationMode::Idle) => {
            info!("Stopping run");
            run_command::signal(run_command::Command::Stop);
            indicator::update(true);
        }
        Events::RunFinished(outcome) => {
            match outcome {
                Outcome::Aborted => warn!("Run aborted, path not found"),
                _ => info!("Run finished: {}", outcome),
            }
            indicator::update(true);
        }
        Events::ButtonPressed(button_id) => {
            info!("Handling button {} press", button_id);
            button_actions::handle_button_action(button_id, ButtonActionType::Press).await;
        }
        Events::ButtonHoldStart(button_id) => {
            info!("Handling button {} hold start", button_id);
            button_actions::handle_button_action(button_id, ButtonActionType::HoldStart).await;
        }
        Events::ButtonHoldEnd(button_id) => {
            info!("Handling button {} hold end", button_id);
            button_actions::handle_button_action(button_id, ButtonActionType::HoldEnd).await;
        }
    }
}
