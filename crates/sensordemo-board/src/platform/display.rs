use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};
use ili9342c::{Config, DriverResult, Error, Ili9342c};

use crate::render::BlitTarget;

/// Panel settings for the Core2's ILI9342C: inverted colors, BGR order.
pub const CORE2_PANEL: Config = Config {
    spi_hz: 40_000_000,
    invert_colors: true,
    bgr: true,
};

/// Runs the panel init sequence and blanks the screen.
///
/// The AXP192 must already have pulsed the LCD reset line.
pub fn bring_up_panel<SPI, DC, D>(
    panel: &mut Ili9342c<SPI, DC>,
    delay: &mut D,
) -> DriverResult<SPI::Error, DC::Error>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
    D: DelayNs,
{
    panel.init(delay)?;
    panel.clear(0x0000)
}

impl<SPI, DC> BlitTarget for Ili9342c<SPI, DC>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
{
    type Error = Error<SPI::Error, DC::Error>;

    fn blit(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels_be: &[u8],
    ) -> Result<(), Self::Error> {
        Ili9342c::blit(self, x, y, width, height, pixels_be)
    }
}
