//! Wire-level protocol helpers for the ILI9342C controller.

/// Panel width in pixels (landscape, as mounted on the Core2).
pub const WIDTH: usize = 320;
/// Panel height in pixels.
pub const HEIGHT: usize = 240;
/// Bytes per RGB565 pixel on the wire.
pub const BYTES_PER_PIXEL: usize = 2;

pub const SWRESET: u8 = 0x01;
pub const SLPOUT: u8 = 0x11;
pub const INVOFF: u8 = 0x20;
pub const INVON: u8 = 0x21;
pub const DISPOFF: u8 = 0x28;
pub const DISPON: u8 = 0x29;
pub const CASET: u8 = 0x2A;
pub const PASET: u8 = 0x2B;
pub const RAMWR: u8 = 0x2C;
pub const MADCTL: u8 = 0x36;
pub const COLMOD: u8 = 0x3A;

/// MADCTL bit selecting BGR subpixel order.
pub const MADCTL_BGR: u8 = 0x08;
/// COLMOD value for 16 bits per pixel on both RGB and MCU interfaces.
pub const COLMOD_RGB565: u8 = 0x55;

/// One command of the power-on sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InitStep {
    pub command: u8,
    pub params: &'static [u8],
    /// Settle time after the command.
    pub delay_ms: u32,
}

impl InitStep {
    const fn new(command: u8, params: &'static [u8], delay_ms: u32) -> Self {
        Self {
            command,
            params,
            delay_ms,
        }
    }
}

/// Vendor power-on sequence for the Core2 panel, excluding the
/// MADCTL/COLMOD/inversion commands that depend on [`crate::Config`].
pub const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::new(SWRESET, &[], 120),
    // Unlock extended command set.
    InitStep::new(0xC8, &[0xFF, 0x93, 0x42], 0),
    // Power control 1/2.
    InitStep::new(0xC0, &[0x12, 0x12], 0),
    InitStep::new(0xC1, &[0x03], 0),
    // RGB interface signal control.
    InitStep::new(0xB0, &[0xE0], 0),
    // Interface control.
    InitStep::new(0xF6, &[0x00, 0x01, 0x01], 0),
    // Positive gamma.
    InitStep::new(
        0xE0,
        &[
            0x00, 0x0C, 0x11, 0x04, 0x11, 0x08, 0x37, 0x89, 0x4C, 0x06, 0x0C, 0x0A, 0x2E, 0x34,
            0x0F,
        ],
        0,
    ),
    // Negative gamma.
    InitStep::new(
        0xE1,
        &[
            0x00, 0x0B, 0x11, 0x05, 0x13, 0x09, 0x33, 0x67, 0x48, 0x07, 0x0E, 0x0B, 0x2E, 0x33,
            0x0F,
        ],
        0,
    ),
    // Display function control.
    InitStep::new(0xB6, &[0x08, 0x82, 0x1D, 0x04], 0),
    InitStep::new(SLPOUT, &[], 120),
];

/// Builds the MADCTL parameter.
#[inline]
pub const fn madctl(bgr: bool) -> u8 {
    if bgr { MADCTL_BGR } else { 0x00 }
}

/// Address window parameters for `CASET` and `PASET`.
///
/// Each array is `[start_hi, start_lo, end_hi, end_lo]` with inclusive ends.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    pub columns: [u8; 4],
    pub pages: [u8; 4],
}

/// Encodes an address window for a `width` x `height` rectangle at `(x, y)`.
///
/// Returns `None` for empty rectangles or ones reaching past the panel.
#[inline]
pub fn encode_window(x: u16, y: u16, width: u16, height: u16) -> Option<Window> {
    if width == 0 || height == 0 {
        return None;
    }

    let x_end = x.checked_add(width - 1)?;
    let y_end = y.checked_add(height - 1)?;
    if x_end as usize >= WIDTH || y_end as usize >= HEIGHT {
        return None;
    }

    Some(Window {
        columns: span_bytes(x, x_end),
        pages: span_bytes(y, y_end),
    })
}

#[inline]
const fn span_bytes(start: u16, end: u16) -> [u8; 4] {
    let s = start.to_be_bytes();
    let e = end.to_be_bytes();
    [s[0], s[1], e[0], e[1]]
}

/// Number of payload bytes for a rectangle.
#[inline]
pub const fn area_bytes(width: u16, height: u16) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}
