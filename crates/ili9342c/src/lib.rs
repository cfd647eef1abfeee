#![cfg_attr(not(test), no_std)]

//! ILI9342C (320x240 RGB565 TFT, as fitted to the M5Stack Core2) driver primitives.

pub mod protocol;

#[cfg(feature = "embedded-graphics")]
mod graphics;

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

/// Pixels streamed per SPI write when filling a solid area.
const FILL_CHUNK_PIXELS: usize = 64;

/// Driver configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    /// Expected SPI clock in Hz (documented for board glue).
    pub spi_hz: u32,
    /// Panel expects inverted color data (true on the Core2).
    pub invert_colors: bool,
    /// BGR subpixel order.
    pub bgr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spi_hz: 40_000_000,
            invert_colors: true,
            bgr: true,
        }
    }
}

impl Config {
    pub const fn with_spi_hz(mut self, spi_hz: u32) -> Self {
        self.spi_hz = spi_hz;
        self
    }

    pub const fn with_invert_colors(mut self, invert_colors: bool) -> Self {
        self.invert_colors = invert_colors;
        self
    }

    pub const fn with_bgr(mut self, bgr: bool) -> Self {
        self.bgr = bgr;
        self
    }
}

/// Driver errors.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error<SpiErr, DcErr> {
    /// SPI transaction failed.
    Spi(SpiErr),
    /// Data/command pin operation failed.
    Dc(DcErr),
    /// Rectangle outside the panel or payload length mismatch.
    InvalidInput,
}

pub type DriverResult<SpiErr, DcErr> = Result<(), Error<SpiErr, DcErr>>;

/// ILI9342C driver over a 4-wire SPI device.
#[derive(Debug)]
pub struct Ili9342c<SPI, DC> {
    spi: SPI,
    dc: DC,
    config: Config,
}

impl<SPI, DC> Ili9342c<SPI, DC>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
{
    /// Creates a new driver instance. Call [`Self::init`] before drawing.
    pub fn new(spi: SPI, dc: DC, config: Config) -> Self {
        Self { spi, dc, config }
    }

    /// Returns current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Releases owned bus and pins.
    pub fn release(self) -> (SPI, DC) {
        (self.spi, self.dc)
    }

    /// Runs the power-on sequence and turns the display on.
    ///
    /// The hardware reset line must already have been pulsed by the board.
    pub fn init<D>(&mut self, delay: &mut D) -> DriverResult<SPI::Error, DC::Error>
    where
        D: DelayNs,
    {
        for step in protocol::INIT_SEQUENCE {
            self.command(step.command, step.params)?;
            if step.delay_ms > 0 {
                delay.delay_ms(step.delay_ms);
            }
        }

        self.command(protocol::MADCTL, &[protocol::madctl(self.config.bgr)])?;
        self.command(protocol::COLMOD, &[protocol::COLMOD_RGB565])?;
        self.set_inverted(self.config.invert_colors)?;
        self.set_display_on(true)?;
        delay.delay_ms(20);
        Ok(())
    }

    /// Sends one command byte followed by its parameters.
    pub fn command(&mut self, command: u8, params: &[u8]) -> DriverResult<SPI::Error, DC::Error> {
        self.dc.set_low().map_err(Error::Dc)?;
        self.spi.write(&[command]).map_err(Error::Spi)?;

        if !params.is_empty() {
            self.dc.set_high().map_err(Error::Dc)?;
            self.spi.write(params).map_err(Error::Spi)?;
        }

        Ok(())
    }

    pub fn set_display_on(&mut self, on: bool) -> DriverResult<SPI::Error, DC::Error> {
        let command = if on {
            protocol::DISPON
        } else {
            protocol::DISPOFF
        };
        self.command(command, &[])
    }

    pub fn set_inverted(&mut self, inverted: bool) -> DriverResult<SPI::Error, DC::Error> {
        let command = if inverted {
            protocol::INVON
        } else {
            protocol::INVOFF
        };
        self.command(command, &[])
    }

    /// Selects the address window and leaves the panel waiting for `RAMWR` data.
    fn open_window(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> DriverResult<SPI::Error, DC::Error> {
        let window =
            protocol::encode_window(x, y, width, height).ok_or(Error::InvalidInput)?;

        self.command(protocol::CASET, &window.columns)?;
        self.command(protocol::PASET, &window.pages)?;
        self.command(protocol::RAMWR, &[])?;
        self.dc.set_high().map_err(Error::Dc)
    }

    /// Writes a rectangle of big-endian RGB565 pixels, row-major.
    pub fn blit(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels_be: &[u8],
    ) -> DriverResult<SPI::Error, DC::Error> {
        if pixels_be.len() != protocol::area_bytes(width, height) {
            return Err(Error::InvalidInput);
        }

        self.open_window(x, y, width, height)?;
        self.spi.write(pixels_be).map_err(Error::Spi)
    }

    /// Fills a rectangle with one raw RGB565 value.
    pub fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        raw_color: u16,
    ) -> DriverResult<SPI::Error, DC::Error> {
        self.open_window(x, y, width, height)?;

        let [hi, lo] = raw_color.to_be_bytes();
        let mut chunk = [0u8; FILL_CHUNK_PIXELS * protocol::BYTES_PER_PIXEL];
        for pair in chunk.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }

        let mut remaining = width as usize * height as usize;
        while remaining > 0 {
            let pixels = remaining.min(FILL_CHUNK_PIXELS);
            self.spi
                .write(&chunk[..pixels * protocol::BYTES_PER_PIXEL])
                .map_err(Error::Spi)?;
            remaining -= pixels;
        }

        Ok(())
    }

    /// Fills the whole panel.
    pub fn clear(&mut self, raw_color: u16) -> DriverResult<SPI::Error, DC::Error> {
        self.fill_rect(
            0,
            0,
            protocol::WIDTH as u16,
            protocol::HEIGHT as u16,
            raw_color,
        )
    }
}

#[cfg(test)]
mod tests;
