//! Drive Task Module
//!
//! Runs the TB6612FNG motor driver. Commands arrive through
//! [`drive_command`] and are applied as they come; the controllers repeat
//! their command every cycle, so only changes are applied and logged.
//!
//! A motor error drops the command with a warning, the next cycle's command
//! tries again. Every brake that took effect is acknowledged, repeated ones
//! included, so the gripper can tell the robot stands still.

use crate::system::drive_command::{self, Command};
use crate::system::resources::MotorDriverResources;
use defmt::{debug, info, warn};
use embassy_rp::gpio;
use embassy_rp::pwm;
use embassy_time::{Duration, Timer};
use tb6612fng::{DriveCommand, Motor, Tb6612fng};

/// Time the driver needs after leaving standby
const WAKE_UP_DELAY: Duration = Duration::from_millis(10);

/// Translates a signed speed into a motor command
fn motor_command(speed: i8) -> DriveCommand {
    let speed = speed.clamp(-100, 100);
    match speed {
        0 => DriveCommand::Stop,
        s if s > 0 => DriveCommand::Forward(s as u8),
        s => DriveCommand::Backward(s.unsigned_abs()),
    }
}

#[embassy_executor::task]
pub async fn drive(r: MotorDriverResources) {
    // We use 10kHz frequency as cheaper DC motors often work better at lower frequencies
    let desired_freq_hz = 10_000;
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz

    // Calculate minimum divider needed to keep period under 16-bit limit (65535)
    let divider = ((clock_freq_hz / desired_freq_hz) / 65535 + 1) as u8;
    let period = (clock_freq_hz / (desired_freq_hz * divider as u32)) as u16 - 1;

    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = period;

    let stby = gpio::Output::new(r.standby_pin, gpio::Level::Low);

    // motor A, here defined to be the left motor
    let left_fwd = gpio::Output::new(r.left_forward_pin, gpio::Level::Low);
    let left_bckw = gpio::Output::new(r.left_backward_pin, gpio::Level::Low);
    let left_pwm = pwm::Pwm::new_output_a(r.left_slice, r.left_pwm_pin, pwm_config.clone());
    let left_motor = Motor::new(left_fwd, left_bckw, left_pwm).unwrap();

    // motor B, here defined to be the right motor
    let right_fwd = gpio::Output::new(r.right_forward_pin, gpio::Level::Low);
    let right_bckw = gpio::Output::new(r.right_backward_pin, gpio::Level::Low);
    let right_pwm = pwm::Pwm::new_output_b(r.right_slice, r.right_pwm_pin, pwm_config);
    let right_motor = Motor::new(right_fwd, right_bckw, right_pwm).unwrap();

    let mut control = Tb6612fng::new(left_motor, right_motor, stby).unwrap();
    let mut last_command = Command::Standby;
    info!("Drive ready");

    loop {
        let command = drive_command::wait().await;
        if command == last_command {
            if command == Command::Brake {
                drive_command::acknowledge_stop();
            }
            continue;
        }

        let is_standby = control.current_standby().unwrap_or(true);

        match command {
            Command::Drive { left, right } => {
                if is_standby {
                    if control.disable_standby().is_err() {
                        warn!("driver did not leave standby");
                        continue;
                    }
                    Timer::after(WAKE_UP_DELAY).await;
                }
                debug!("drive L:{} R:{}", left, right);
                if control.motor_a.drive(motor_command(left)).is_err() {
                    warn!("left motor command failed");
                    continue;
                }
                if control.motor_b.drive(motor_command(right)).is_err() {
                    warn!("right motor command failed");
                    continue;
                }
            }
            Command::Brake => {
                debug!("brake");
                let left = control.motor_a.drive(DriveCommand::Brake);
                let right = control.motor_b.drive(DriveCommand::Brake);
                if left.is_err() || right.is_err() {
                    warn!("brake failed");
                    continue;
                }
                drive_command::acknowledge_stop();
            }
            Command::Standby => {
                if !is_standby {
                    info!("standby");
                    let _ = control.motor_a.drive(DriveCommand::Brake);
                    let _ = control.motor_b.drive(DriveCommand::Brake);
                    Timer::after(Duration::from_millis(100)).await;
                    let _ = control.motor_a.drive(DriveCommand::Stop);
                    let _ = control.motor_b.drive(DriveCommand::Stop);
                    if control.enable_standby().is_err() {
                        warn!("driver did not enter standby");
                        continue;
                    }
                }
            }
        }

        last_command = command;
    }
}
