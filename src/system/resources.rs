//! Hardware Resource Management
//!
//! Assigns pins and peripherals to the tasks that own them. Nothing here is
//! shared: every group moves into exactly one task.
//!
//! # Resource Groups
//! - Color Sensor: TCS3200 frequency scaling, filter select and output pins
//! - Range Sensor: HC-SR04 ultrasonic sensor pins
//! - Line Sensors: the two binary IR line sensors beside the color sensor
//! - Motor Driver: TB6612FNG pins and PWM slices
//! - Gripper: servo pin, driven by PIO as the PWM slices are taken
//! - RGB LED: PWM-controlled indicator LED pins
//! - RC Control: remote control button input pins

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, PIO0};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;

assign_resources! {
    /// TCS3200 color sensor
    color_sensor: ColorSensorResources {
        s0_pin: PIN_6,
        s1_pin: PIN_7,
        s2_pin: PIN_8,
        s3_pin: PIN_9,
        out_pin: PIN_11,
    },
    /// HC-SR04 ultrasonic distance sensor pins
    range_sensor: RangeSensorResources {
        trigger_pin: PIN_15,
        echo_pin: PIN_14,
    },
    /// IR line sensors, active low
    line_sensors: LineSensorResources {
        left_pin: PIN_12,
        right_pin: PIN_13,
    },
    /// TB6612FNG dual motor driver pins and PWM channels
    motor_driver: MotorDriverResources {
        standby_pin: PIN_22,
        // Motor drive PWM
        left_slice: PWM_SLICE6,
        left_pwm_pin: PIN_28,
        left_forward_pin: PIN_21,
        left_backward_pin: PIN_20,
        // Motor drive PWM
        right_slice: PWM_SLICE5,
        right_pwm_pin: PIN_27,
        right_forward_pin: PIN_19,
        right_backward_pin: PIN_18,
    },
    /// Gripper servo
    gripper_servo: GripperServoResources {
        pin: PIN_5,
        pio: PIO0,
    },
    /// PWM-controlled RGB LED indicator pins
    rgb_led: RGBLedResources {
        pwm_red: PWM_SLICE1,
        pwm_green: PWM_SLICE2,
        red_pin: PIN_2,
        green_pin: PIN_4,
    },
    /// Remote control buttons
    rc: RCResources {
        btn_a: PIN_16,
        btn_b: PIN_17,
        btn_c: PIN_0,
        btn_d: PIN_1,
    },
}

bind_interrupts!(pub struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});
