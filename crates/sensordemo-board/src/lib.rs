#![cfg_attr(not(test), no_std)]

//! M5Stack Core2 board support for the sensor demo: sprite rendering onto the
//! ILI9342C panel, AXP192 power bring-up, touch buttons, the rotary knob,
//! ENV-III sensors and shared connectivity state.

extern crate alloc;

pub mod assets;
pub mod input;
pub mod network;
pub mod platform;
pub mod render;
pub mod sensor;

#[cfg(test)]
mod test_support;
