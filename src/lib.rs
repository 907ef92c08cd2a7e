//! Course robot control core
//!
//! Platform independent decision logic for the course robot. Everything in
//! here runs on the host for testing; the firmware binary (`src/main.rs`)
//! binds it to the RP2350 hardware.
//!
//! # Modules
//! - [`config`]: Tunables for every course section and the gripper
//! - [`color`]: TCS3200 period classification and color to label mapping
//! - [`range`]: HC-SR04 echo conversion
//! - [`sensor`]: Sensor snapshot and the sensor adapter trait
//! - [`directive`]: Actuator directives and the actuator adapter traits
//! - [`navigation`]: Obstacle course state machine
//! - [`line_follow`]: Line section state machine
//! - [`target`]: Target section state machine
//! - [`cycle`]: One control cycle: sample, step, apply

#![cfg_attr(not(test), no_std)]

pub mod color;
pub mod config;
pub mod cycle;
pub mod directive;
pub mod line_follow;
pub mod navigation;
pub mod range;
pub mod sensor;
pub mod target;
