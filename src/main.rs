//! Robot firmware entry point
//!
//! Initializes the system and spawns the control tasks. Buttons start and
//! stop the sections, see [`system::button_actions`].

#![no_std]
#![no_main]

use crate::system::event::ButtonId;
use crate::task::{
    course_run::course_run, drive::drive, gripper::gripper, orchestrate::orchestrate,
    rc_control::rc_button_handle, rgb_led_indicate::rgb_led_indicate,
};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Input, Pull};
use system::resources::{
    AssignedResources, ColorSensorResources, GripperServoResources, LineSensorResources,
    MotorDriverResources, RCResources, RGBLedResources, RangeSensorResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups for each task
    let r = split_resources!(p);

    spawner.spawn(orchestrate()).unwrap();
    spawner.spawn(rgb_led_indicate(r.rgb_led)).unwrap();
    // Actuators first so the first cycle's commands are picked up
    spawner.spawn(drive(r.motor_driver)).unwrap();
    spawner.spawn(gripper(r.gripper_servo)).unwrap();
    spawner
        .spawn(course_run(r.color_sensor, r.range_sensor, r.line_sensors))
        .unwrap();

    let buttons = [
        (Input::new(r.rc.btn_a, Pull::Down), ButtonId::A),
        (Input::new(r.rc.btn_b, Pull::Down), ButtonId::B),
        (Input::new(r.rc.btn_c, Pull::Down), ButtonId::C),
        (Input::new(r.rc.btn_d, Pull::Down), ButtonId::D),
    ];
    for (button, id) in buttons {
        spawner.spawn(rc_button_handle(button, id)).unwrap();
    }
}
