//! Core system components for robot operation
pub mod button_actions;
pub mod drive_command;
pub mod event;
pub mod gripper_command;
pub mod indicator;
pub mod resources;
pub mod run_command;
pub mod sensors;
pub mod state;
