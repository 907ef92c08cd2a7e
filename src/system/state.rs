//! System State Management
//!
//! Holds what the operator sees of the robot: which section is running and
//! how the last run ended. The controllers keep their own state; this is
//! only the outer shell the orchestrator and the indicator look at.
//!
//! # State Access Pattern
//! ```rust
//! let state = SYSTEM_STATE.lock().await;
//! // Read or modify state here
//! // Lock automatically released when state goes out of scope
//! ```

use course_robot::navigation::Outcome;
use defmt::Format;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};

/// Global system state protected by a mutex
///
/// Starts idle with no finished run.
pub static SYSTEM_STATE: Mutex<CriticalSectionRawMutex, SystemState> = Mutex::new(SystemState {
    operation_mode: OperationMode::Idle,
    last_outcome: None,
});

/// Robot system state
#[derive(Format)]
pub struct SystemState {
    /// Current operation mode
    pub operation_mode: OperationMode,
    /// How the last run ended
    /// - None: no run finished since the last start
    /// - Some(Finished): drop-off quota reached or target box found
    /// - Some(Aborted): recovery gave up
    pub last_outcome: Option<Outcome>,
}

impl SystemState {
    /// Updates operation mode; starting a run forgets the last outcome
    pub fn set_operation_mode(&mut self, new_mode: OperationMode) {
        if let OperationMode::Running(_) = new_mode {
            self.last_outcome = None;
        }
        self.operation_mode = new_mode;
    }

    /// Records a run that ended on its own and falls back to idle
    pub fn finish_run(&mut self, outcome: Outcome) {
        self.last_outcome = Some(outcome);
        self.operation_mode = OperationMode::Idle;
    }
}

/// Course sections the robot can run
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum Section {
    /// Red path with obstacles and payload zones
    ObstacleCourse,
    /// Black guide line
    LineSection,
    /// Black box inside the blue and green target
    TargetSection,
}

/// Robot operation modes
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum OperationMode {
    /// Parked, waiting for the operator
    Idle,
    /// A section controller drives the robot
    Running(Section),
}
