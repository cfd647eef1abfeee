//! FT6336U touch controller reduced to the three Core2 touch buttons.
//!
//! The touch panel reaches 40 px below the LCD; that strip carries the A, B
//! and C markings.

use embedded_hal::i2c::I2c;
use log::debug;

use sensordemo_core::input::{InputEvent, InputProvider, TouchButton};

pub const FT6336U_ADDRESS: u8 = 0x38;

const REG_TD_STATUS: u8 = 0x02;
// TD_STATUS plus P1_XH, P1_XL, P1_YH, P1_YL.
const POINT_READ_LEN: usize = 5;

const BUTTON_ROW_TOP: u16 = 240;
const BUTTON_ROW_BOTTOM: u16 = 280;
const BUTTON_A_RIGHT: u16 = 109;
const BUTTON_B_RIGHT: u16 = 218;

/// First touch point from a TD_STATUS..P1_YL register dump.
pub fn decode_point(regs: &[u8; POINT_READ_LEN]) -> Option<(u16, u16)> {
    let touches = regs[0] & 0x0F;
    if touches == 0 || touches > 2 {
        return None;
    }

    let x = (((regs[1] & 0x0F) as u16) << 8) | regs[2] as u16;
    let y = (((regs[3] & 0x0F) as u16) << 8) | regs[4] as u16;
    Some((x, y))
}

/// Button under a touch point, if the point lies in the button strip.
pub fn button_at(x: u16, y: u16) -> Option<TouchButton> {
    if !(BUTTON_ROW_TOP..BUTTON_ROW_BOTTOM).contains(&y) {
        return None;
    }

    Some(if x < BUTTON_A_RIGHT {
        TouchButton::A
    } else if x < BUTTON_B_RIGHT {
        TouchButton::B
    } else {
        TouchButton::C
    })
}

/// Edge-triggered buttons: one event per press, nothing while held.
#[derive(Debug)]
pub struct TouchButtons<I2C> {
    i2c: I2C,
    address: u8,
    held: Option<TouchButton>,
}

impl<I2C> TouchButtons<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, FT6336U_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            held: None,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Raw first touch point, if any.
    pub fn read_point(&mut self) -> Result<Option<(u16, u16)>, I2C::Error> {
        let mut regs = [0u8; POINT_READ_LEN];
        self.i2c
            .write_read(self.address, &[REG_TD_STATUS], &mut regs)?;
        Ok(decode_point(&regs))
    }
}

impl<I2C> InputProvider for TouchButtons<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        let button = self
            .read_point()?
            .and_then(|(x, y)| button_at(x, y));

        let pressed = match (self.held, button) {
            (None, Some(button)) => Some(button),
            _ => None,
        };
        self.held = button;

        if let Some(button) = pressed {
            debug!("touch: button {:?} pressed", button);
        }
        Ok(pressed.map(InputEvent::Touch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedI2c;

    fn touch_at(x: u16, y: u16) -> [u8; 5] {
        [1, (x >> 8) as u8, x as u8, (y >> 8) as u8, y as u8]
    }

    const NO_TOUCH: [u8; 5] = [0, 0xFF, 0xFF, 0xFF, 0xFF];

    #[test]
    fn decodes_twelve_bit_coordinates() {
        assert_eq!(decode_point(&[1, 0x41, 0x2C, 0x10, 0xF5]), Some((300, 245)));
        assert_eq!(decode_point(&NO_TOUCH), None);
        assert_eq!(decode_point(&[0x0F, 0, 0, 0, 0]), None);
    }

    #[test]
    fn button_strip_is_split_in_thirds() {
        assert_eq!(button_at(10, 250), Some(TouchButton::A));
        assert_eq!(button_at(108, 250), Some(TouchButton::A));
        assert_eq!(button_at(109, 250), Some(TouchButton::B));
        assert_eq!(button_at(217, 279), Some(TouchButton::B));
        assert_eq!(button_at(218, 240), Some(TouchButton::C));
        assert_eq!(button_at(160, 120), None);
        assert_eq!(button_at(160, 280), None);
    }

    #[test]
    fn press_is_reported_once_until_released() {
        let mut i2c = ScriptedI2c::default();
        for frame in [
            touch_at(50, 260),
            touch_at(52, 261),
            NO_TOUCH,
            touch_at(250, 255),
            touch_at(100, 100),
        ] {
            i2c.queue(&frame);
        }
        let mut buttons = TouchButtons::new(i2c);

        assert_eq!(
            buttons.poll_event().unwrap(),
            Some(InputEvent::Touch(TouchButton::A))
        );
        assert_eq!(buttons.poll_event().unwrap(), None);
        assert_eq!(buttons.poll_event().unwrap(), None);
        assert_eq!(
            buttons.poll_event().unwrap(),
            Some(InputEvent::Touch(TouchButton::C))
        );
        assert_eq!(buttons.poll_event().unwrap(), None);

        let i2c = buttons.release();
        assert!(
            i2c.writes
                .iter()
                .all(|(addr, bytes)| *addr == FT6336U_ADDRESS && bytes == &[REG_TD_STATUS])
        );
    }
}
