//! Gripper Servo
//!
//! Drives the claw servo. The PWM slices are all taken by the motors and the
//! LED, so the servo pulse comes from a PIO state machine instead.
//!
//! The servo has no position feedback: a requested position counts as
//! reached once the pulse is written, the controllers wait out the settle
//! time themselves.
//!
//! Position changes wait for the drive task to acknowledge a brake. Without
//! it the request is dropped; the controllers repeat it every cycle.

use crate::system::drive_command;
use crate::system::gripper_command;
use crate::system::resources::{GripperServoResources, Irqs};
use core::time::Duration;
use course_robot::config::GripperConfig;
use course_robot::directive::GripperPosition;
use defmt::{error, info, warn};
use embassy_rp::pio::{Instance, Pio};
use embassy_rp::pio_programs::pwm::{PioPwm, PioPwmProgram};
use embassy_time::with_timeout;

/// Longest wait for the drive to report a brake
const STOP_ACK_TIMEOUT: embassy_time::Duration = embassy_time::Duration::from_millis(100);

/// Servo refresh period
const REFRESH_INTERVAL: Duration = Duration::from_micros(20_000);

/// Pulse width at 0°, roughly measured on the claw servo
const MIN_PULSE_WIDTH: Duration = Duration::from_micros(500);

/// Pulse width at full rotation
const MAX_PULSE_WIDTH: Duration = Duration::from_micros(2400);

/// Full rotation of the claw servo in degrees
const MAX_DEGREE_ROTATION: f32 = 180.0;

/// Hobby servo on a PIO PWM output
pub struct Servo<'d, T: Instance, const SM: usize> {
    pwm: PioPwm<'d, T, SM>,
    min_pulse_width: Duration,
    max_pulse_width: Duration,
    max_degree_rotation: f32,
}

impl<'d, T: Instance, const SM: usize> Servo<'d, T, SM> {
    pub fn new(mut pwm: PioPwm<'d, T, SM>) -> Self {
        pwm.set_period(REFRESH_INTERVAL);
        pwm.start();
        Self {
            pwm,
            min_pulse_width: MIN_PULSE_WIDTH,
            max_pulse_width: MAX_PULSE_WIDTH,
            max_degree_rotation: MAX_DEGREE_ROTATION,
        }
    }

    /// Pulse width for an angle, clamped to the servo's travel
    fn pulse_width(&self, degree: f32) -> Duration {
        let degree = degree.clamp(0.0, self.max_degree_rotation) as f64;
        let span = (self.max_pulse_width - self.min_pulse_width).as_nanos() as f64;
        let nanos = self.min_pulse_width.as_nanos() as f64
            + degree * span / self.max_degree_rotation as f64;
        Duration::from_nanos(nanos as u64).min(self.max_pulse_width)
    }

    pub fn rotate(&mut self, degree: f32) {
        let width = self.pulse_width(degree);
        self.pwm.write(width);
    }
}

/// Gripper task
///
/// Opens the claw at boot and then follows [`gripper_command`].
#[embassy_executor::task]
pub async fn gripper(r: GripperServoResources) {
    let config = GripperConfig::DEFAULT;
    if let Err(e) = config.validate() {
        error!("Gripper config rejected: {}", e);
        return;
    }

    let Pio {
        mut common, sm0, ..
    } = Pio::new(r.pio, Irqs);
    let program = PioPwmProgram::new(&mut common);
    let mut servo = Servo::new(PioPwm::new(&mut common, sm0, r.pin, &program));

    let mut position = GripperPosition::Open;
    servo.rotate(config.open_angle);
    info!("Gripper ready, open");

    loop {
        let requested = gripper_command::wait().await;
        if requested == position {
            continue;
        }

        if with_timeout(STOP_ACK_TIMEOUT, drive_command::wait_stopped())
            .await
            .is_err()
        {
            warn!("Drive did not report a stop, gripper held");
            continue;
        }

        let angle = match requested {
            GripperPosition::Open => config.open_angle,
            GripperPosition::Closed => config.closed_angle,
        };
        info!("Gripper {} at {} deg", requested, angle);
        servo.rotate(angle);
        position = requested;
    }
}
