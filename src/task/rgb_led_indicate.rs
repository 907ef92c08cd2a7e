//! RGB LED Indicator Module
//!
//! Shows the operator what the robot is doing:
//! - Idle, nothing run yet or stopped: solid green
//! - Idle after a finished run: solid yellow
//! - Idle after an aborted run: solid red
//! - Obstacle course running: blinking green
//! - Line section running: blinking yellow
//! - Target section running: blinking red
use crate::system::indicator;
use crate::system::resources::RGBLedResources;
use crate::system::state::{OperationMode, Section, SYSTEM_STATE};
use course_robot::navigation::Outcome;
use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_rp::pwm::{self, SetDutyCycle};
use embassy_time::{Duration, Timer};

/// Interval for LED blinking while a section runs
const MODE_BLINK_INTERVAL: Duration = Duration::from_millis(700);

/// Interval for LED blinking when affirming state change
const AFFIRM_BLINK_INTERVAL: Duration = Duration::from_millis(30);

/// Red and green duty in percent
#[derive(Clone, Copy)]
struct Color {
    red: u8,
    green: u8,
}

const GREEN: Color = Color { red: 0, green: 100 };
const YELLOW: Color = Color { red: 100, green: 60 };
const RED: Color = Color { red: 100, green: 0 };

/// What the LED shows for a state
fn pattern(mode: OperationMode, last_outcome: Option<Outcome>) -> (Color, bool) {
    match (mode, last_outcome) {
        (OperationMode::Running(Section::ObstacleCourse), _) => (GREEN, true),
        (OperationMode::Running(Section::LineSection), _) => (YELLOW, true),
        (OperationMode::Running(Section::TargetSection), _) => (RED, true),
        (OperationMode::Idle, Some(Outcome::Aborted)) => (RED, false),
        (OperationMode::Idle, Some(Outcome::Finished)) => (YELLOW, false),
        (OperationMode::Idle, _) => (GREEN, false),
    }
}

struct Led {
    red: pwm::Pwm<'static>,
    green: pwm::Pwm<'static>,
}

impl Led {
    fn show(&mut self, color: Color) {
        let _ = self.red.set_duty_cycle_percent(color.red);
        let _ = self.green.set_duty_cycle_percent(color.green);
    }

    fn off(&mut self) {
        let _ = self.red.set_duty_cycle_fully_off();
        let _ = self.green.set_duty_cycle_fully_off();
    }
}

/// Controls the RGB LED indicator based on system state
#[embassy_executor::task]
pub async fn rgb_led_indicate(r: RGBLedResources) {
    // configure pwm for rgb led, 100Hz
    let desired_freq_hz = 100;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    let mut config = pwm::Config::default();
    config.divider = divider.into();
    config.top = period;

    let mut led = Led {
        red: pwm::Pwm::new_output_a(r.pwm_red, r.red_pin, config.clone()),
        green: pwm::Pwm::new_output_a(r.pwm_green, r.green_pin, config),
    };
    led.show(GREEN);

    let mut affirm = false;
    loop {
        // affirm a change in the indicator by flickering the LED
        if affirm {
            for i in 0..6 {
                if i % 2 == 0 {
                    led.show(RED);
                } else {
                    led.show(GREEN);
                }
                Timer::after(AFFIRM_BLINK_INTERVAL).await;
            }
        }

        let (mode, last_outcome) = {
            let state = SYSTEM_STATE.lock().await;
            (state.operation_mode, state.last_outcome)
        };
        info!("Indicating {} (last run {})", mode, last_outcome);

        let (color, blink) = pattern(mode, last_outcome);
        if !blink {
            led.show(color);
            affirm = indicator::wait().await;
            continue;
        }

        let mut led_on = true;
        affirm = loop {
            if led_on {
                led.show(color);
            } else {
                led.off();
            }
            led_on = !led_on;

            if let Either::Second(affirm) =
                select(Timer::after(MODE_BLINK_INTERVAL), indicator::wait()).await
            {
                break affirm;
            }
        };
    }
}
