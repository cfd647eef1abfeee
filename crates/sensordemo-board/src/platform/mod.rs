pub mod display;
pub mod power;
