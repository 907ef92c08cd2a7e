//! Run Command Module
//!
//! Starts and stops the section controllers. The orchestrator signals, the
//! course run task waits.

use crate::system::state::Section;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal for run control
pub static RUN_CONTROL: Signal<CriticalSectionRawMutex, Command> = Signal::new();

/// Run control commands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start a section with a fresh controller
    Start(Section),
    /// Park the robot and drop the controller
    Stop,
}

/// Sends a run control command
pub fn signal(command: Command) {
    RUN_CONTROL.signal(command);
}

/// Waits for the next run control command
pub async fn wait() -> Command {
    RUN_CONTROL.wait().await
}

/// Resolves once a stop is requested; start requests are ignored
pub async fn wait_for_stop() {
    while wait().await != Command::Stop {}
}
