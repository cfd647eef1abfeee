//! Text drawn into the numeric readout and label slots.

use core::fmt::{self, Write};

use heapless::String;

use crate::input::InputEvent;

pub const READOUT_TEXT_BYTES: usize = 16;
pub const VERSION_TEXT_BYTES: usize = 40;

/// Shown instead of a value that cannot be rendered (NaN, infinity, overflow).
pub const PLACEHOLDER: &str = "--";
const VERSION_PREFIX: &str = "Version:";

pub type ReadoutText = String<READOUT_TEXT_BYTES>;
pub type VersionText = String<VERSION_TEXT_BYTES>;

/// Temperature with one decimal, e.g. `23.4` or `-0.5`.
pub fn format_temperature(celsius: f32) -> ReadoutText {
    if !celsius.is_finite() {
        return placeholder();
    }
    format_or_placeholder(format_args!("{:.1}", celsius))
}

/// Plain integer readout (humidity, rotary position).
pub fn format_integer(value: i32) -> ReadoutText {
    format_or_placeholder(format_args!("{}", value))
}

/// Pressure truncated toward zero to a whole number.
pub fn format_pressure(pressure: f32) -> ReadoutText {
    if !pressure.is_finite() {
        return placeholder();
    }
    // Saturating float-to-int cast; the large-font slot has no room for decimals.
    format_integer(pressure as i32)
}

/// `Version:<version>`, cut at a character boundary when too long.
pub fn format_version(version: &str) -> VersionText {
    let mut text = VersionText::new();
    let _ = text.push_str(VERSION_PREFIX);
    for ch in version.chars() {
        if text.push(ch).is_err() {
            break;
        }
    }
    text
}

fn placeholder() -> ReadoutText {
    let mut text = ReadoutText::new();
    let _ = text.push_str(PLACEHOLDER);
    text
}

fn format_or_placeholder(args: fmt::Arguments<'_>) -> ReadoutText {
    let mut text = ReadoutText::new();
    if text.write_fmt(args).is_err() {
        return placeholder();
    }
    text
}

/// Knob position accumulated from rotary input; a press re-zeroes it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RotaryPosition {
    value: i32,
}

impl RotaryPosition {
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    pub const fn value(self) -> i32 {
        self.value
    }

    /// Applies one input event, returning `true` when the position changed.
    pub fn apply(&mut self, event: InputEvent) -> bool {
        let next = match event {
            InputEvent::RotateCw => self.value.saturating_add(1),
            InputEvent::RotateCcw => self.value.saturating_sub(1),
            InputEvent::Press => 0,
            InputEvent::Touch(_) => self.value,
        };

        let changed = next != self.value;
        self.value = next;
        changed
    }
}
