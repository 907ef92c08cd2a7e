//! Navigation states
//!
//! Plain state types of the obstacle course controller. The transition
//! logic lives in [`super::controller`].

use thiserror::Error;

/// Obstacle course state
///
/// Exactly one is active at a time. `FollowPath` is the initial state,
/// `Complete` the only terminal one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NavigationState {
    /// Driving along the path, watching for zones, path loss and obstacles
    FollowPath = 0,
    /// Timed pivot away from an obstacle
    DodgeAway = 1,
    /// Timed forward drive past the obstacle
    ClearPast = 2,
    /// Curving back toward the path until it shows up or time runs out
    ArcRecover = 3,
    /// Grasping the payload in a zone
    PickUp = 4,
    /// Releasing the payload in a zone
    DropOff = 5,
    /// Alternating pivot and forward steps looking for the path
    FailsafeSearch = 6,
    /// Run over, wheels stopped
    Complete = 7,
}

/// Raw value that names no navigation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("invalid navigation state {0}")]
pub struct InvalidState(pub u8);

impl TryFrom<u8> for NavigationState {
    type Error = InvalidState;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(NavigationState::FollowPath),
            1 => Ok(NavigationState::DodgeAway),
            2 => Ok(NavigationState::ClearPast),
            3 => Ok(NavigationState::ArcRecover),
            4 => Ok(NavigationState::PickUp),
            5 => Ok(NavigationState::DropOff),
            6 => Ok(NavigationState::FailsafeSearch),
            7 => Ok(NavigationState::Complete),
            other => Err(InvalidState(other)),
        }
    }
}

impl NavigationState {
    /// True while a gripper sequence runs; no sensors are read then
    pub fn is_manipulating(&self) -> bool {
        matches!(self, NavigationState::PickUp | NavigationState::DropOff)
    }

    /// True for the terminal state
    pub fn is_terminal(&self) -> bool {
        *self == NavigationState::Complete
    }
}

/// Step of a pickup or drop-off sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManipulationPhase {
    /// Gripper opening, waiting for the servo to settle
    Release,
    /// Gripper closing around the payload
    Grasp,
    /// Reversing away from the zone
    BackOff,
}

/// How the run is going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Running,
    /// Drop-off quota met
    Finished,
    /// Recovery round limit hit without finding the path
    Aborted,
}
