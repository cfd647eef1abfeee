use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{Dimensions, OriginDimensions, Size},
    pixelcolor::{Rgb565, raw::RawU16},
    prelude::RawData,
    primitives::Rectangle,
};
use embedded_hal::{digital::OutputPin, spi::SpiDevice};

use crate::{Error, Ili9342c, protocol};

impl<SPI, DC> DrawTarget for Ili9342c<SPI, DC>
where
    SPI: SpiDevice<u8>,
    DC: OutputPin,
{
    type Color = Rgb565;
    type Error = Error<SPI::Error, DC::Error>;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0
                || point.y < 0
                || point.x as usize >= protocol::WIDTH
                || point.y as usize >= protocol::HEIGHT
            {
                continue;
            }

            let bytes = RawU16::from(color).into_inner().to_be_bytes();
            self.blit(point.x as u16, point.y as u16, 1, 1, &bytes)?;
        }

        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&self.bounding_box());
        if clipped.size.width == 0 || clipped.size.height == 0 {
            return Ok(());
        }

        self.fill_rect(
            clipped.top_left.x as u16,
            clipped.top_left.y as u16,
            clipped.size.width as u16,
            clipped.size.height as u16,
            RawU16::from(color).into_inner(),
        )
    }
}

impl<SPI, DC> OriginDimensions for Ili9342c<SPI, DC> {
    fn size(&self) -> Size {
        Size::new(protocol::WIDTH as u32, protocol::HEIGHT as u32)
    }
}
