#![cfg_attr(not(test), no_std)]

//! Board-independent pieces of the SimpleIOT sensor demo: screen layout,
//! status overlay planning, readout formatting, report cadence, GPS sentence
//! parsing and credential validation.

pub mod config;
pub mod input;
pub mod layout;
pub mod nmea;
pub mod overlay;
pub mod readings;
pub mod report;
pub mod theme;
