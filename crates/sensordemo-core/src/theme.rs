//! Planet color selection for the hello-world screen.

use crate::input::TouchButton;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PlanetColor {
    #[default]
    Original,
    Red,
    Blue,
    Green,
}

impl PlanetColor {
    pub const ALL: [Self; 4] = [Self::Original, Self::Red, Self::Blue, Self::Green];

    /// Cycles through `ALL`, wrapping back to `Original`.
    pub const fn next(self) -> Self {
        match self {
            Self::Original => Self::Red,
            Self::Red => Self::Blue,
            Self::Blue => Self::Green,
            Self::Green => Self::Original,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Green => "Green",
        }
    }

    pub const fn from_button(button: TouchButton) -> Self {
        match button {
            TouchButton::A => Self::Red,
            TouchButton::B => Self::Blue,
            TouchButton::C => Self::Green,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_select_left_to_right() {
        assert_eq!(PlanetColor::from_button(TouchButton::A), PlanetColor::Red);
        assert_eq!(PlanetColor::from_button(TouchButton::B), PlanetColor::Blue);
        assert_eq!(PlanetColor::from_button(TouchButton::C), PlanetColor::Green);
    }

    #[test]
    fn next_walks_all_colors_and_wraps() {
        let mut color = PlanetColor::default();
        for expected in PlanetColor::ALL {
            assert_eq!(color, expected);
            color = color.next();
        }
        assert_eq!(color, PlanetColor::Original);
    }
}
