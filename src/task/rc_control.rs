//! RC button handling
//!
//! Turns the remote control's button inputs into system events. One task
//! instance runs per button.

use crate::system::event::{self, ButtonId, Events};
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Level};
use embassy_time::{Duration, Timer};

/// Button hold threshold (ms)
const HOLD_DURATION: Duration = Duration::from_millis(700);

/// Button debounce delay (ms)
const DEBOUNCE_DURATION: Duration = Duration::from_millis(30);

/// Number of remote control buttons
pub const BUTTON_COUNT: usize = 4;

/// Button handler
///
/// Generates:
/// - ButtonPressed for short press
/// - ButtonHoldStart/End for long press
#[embassy_executor::task(pool_size = BUTTON_COUNT)]
pub async fn rc_button_handle(mut button: Input<'static>, id: ButtonId) {
    loop {
        if debounce(&mut button).await != Level::High {
            continue;
        }

        match select(Timer::after(HOLD_DURATION), debounce(&mut button)).await {
            Either::First(()) => {
                event::send(Events::ButtonHoldStart(id)).await;
                button.wait_for_low().await;
                event::send(Events::ButtonHoldEnd(id)).await;
            }
            Either::Second(_) => {
                event::send(Events::ButtonPressed(id)).await;
            }
        }
    }
}

/// Waits for the next stable level change
async fn debounce(button: &mut Input<'static>) -> Level {
    loop {
        let start_level = button.get_level();
        button.wait_for_any_edge().await;
        Timer::after(DEBOUNCE_DURATION).await;
        let end_level = button.get_level();
        if start_level != end_level {
            break end_level;
        }
    }
}
