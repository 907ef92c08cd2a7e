//! System Indicator Module
//!
//! Wakes the RGB LED task when the system state changed. The value tells
//! whether the change should be affirmed with a short blink.
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Signal for system indicator changes
pub static SYSTEM_INDICATOR_CHANGED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Signals a change in the system indicator
pub fn update(affirm: bool) {
    SYSTEM_INDICATOR_CHANGED.signal(affirm);
}

/// Waits for a change in the system indicator
pub async fn wait() -> bool {
    SYSTEM_INDICATOR_CHANGED.wait().await
}
