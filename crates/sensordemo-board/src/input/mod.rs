pub mod rotary;
pub mod touch_buttons;
