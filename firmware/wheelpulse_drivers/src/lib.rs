#![no_std]

pub mod bridge;
pub mod command_input;
pub mod pinout;
pub mod position_sensor;
