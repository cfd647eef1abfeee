//! ENV-III unit sensors on the Core2's Port A.

pub mod qmp6988;
pub mod sht30;
