//! Firmware tasks
pub mod course_run;
pub mod drive;
pub mod gripper;
pub mod orchestrate;
pub mod rc_control;
pub mod rgb_led_indicate;
