//! Input abstraction layer.

/// Core2 touch buttons below the panel, left to right.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TouchButton {
    A,
    B,
    C,
}

/// Logical actions consumed by the demo loops.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputEvent {
    RotateCw,
    RotateCcw,
    Press,
    Touch(TouchButton),
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}
