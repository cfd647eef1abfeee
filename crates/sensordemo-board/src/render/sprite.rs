use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::{
    Pixel,
    geometry::{OriginDimensions, Size},
    mono_font::MonoTextStyle,
    pixelcolor::{
        Rgb565,
        raw::{RawData, RawU16},
    },
    prelude::*,
    text::{Baseline, Text},
};
use sensordemo_core::layout::{SlotFont, SlotGeometry};

use crate::assets::Asset;

use super::{BlitTarget, font_for};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpriteError {
    /// Pixel buffer could not be allocated.
    OutOfMemory,
    /// Compressed asset stream is not valid zlib.
    AssetCorrupt,
    /// Asset inflated to a different pixel count than declared.
    AssetSize,
}

/// Off-screen RGB565 buffer, stored big-endian so it can be sent to the panel
/// without conversion.
#[derive(Debug)]
pub struct Sprite {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Sprite {
    /// Allocates a black sprite. Fails instead of aborting when the heap is short.
    pub fn new(width: u16, height: u16) -> Result<Self, SpriteError> {
        let len = width as usize * height as usize * 2;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| SpriteError::OutOfMemory)?;
        pixels.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Sprite holding a decoded asset at its native size.
    pub fn from_asset(asset: &Asset) -> Result<Self, SpriteError> {
        Ok(Self {
            width: asset.width,
            height: asset.height,
            pixels: asset.decode()?,
        })
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Raw big-endian pixel bytes, row-major.
    pub fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let raw = u16::from_be_bytes([self.pixels[offset], self.pixels[offset + 1]]);
        Some(RawU16::new(raw).into())
    }

    pub fn fill(&mut self, color: Rgb565) {
        let [hi, lo] = RawU16::from(color).into_inner().to_be_bytes();
        for pair in self.pixels.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }
    }

    /// Copies an asset with its top-left corner at (`x`, `y`), clipped to the sprite.
    pub fn draw_asset(&mut self, asset: &Asset, x: i32, y: i32) -> Result<(), SpriteError> {
        let source = asset.decode()?;
        let src_w = asset.width as i32;

        let col_start = x.max(0);
        let col_end = (x + src_w).min(self.width as i32);
        let row_start = y.max(0);
        let row_end = (y + asset.height as i32).min(self.height as i32);
        if col_start >= col_end || row_start >= row_end {
            return Ok(());
        }

        let run = (col_end - col_start) as usize * 2;
        for row in row_start..row_end {
            let src = (((row - y) * src_w + (col_start - x)) as usize) * 2;
            let dst = self.offset(col_start as u16, row as u16);
            self.pixels[dst..dst + run].copy_from_slice(&source[src..src + run]);
        }

        Ok(())
    }

    /// Draws `text` with its top-left corner at the sprite origin.
    pub fn draw_text(&mut self, text: &str, font: SlotFont, color: Rgb565) {
        let style = MonoTextStyle::new(font_for(font), color);
        let Ok(_) = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(self);
    }

    /// Sends the sprite to `target` at (`x`, `y`), dropping whatever falls
    /// off the 320x240 screen.
    pub fn push<T: BlitTarget>(&self, target: &mut T, x: u16, y: u16) -> Result<(), T::Error> {
        let geometry = SlotGeometry::new(x, y, self.width, self.height);
        let Some(visible) = geometry.visible() else {
            return Ok(());
        };

        if visible.width == self.width {
            let len = visible.pixel_count() * 2;
            return target.blit(x, y, visible.width, visible.height, &self.pixels[..len]);
        }

        let run = visible.width as usize * 2;
        for row in 0..visible.height {
            let start = self.offset(0, row);
            target.blit(x, y + row, visible.width, 1, &self.pixels[start..start + run])?;
        }
        Ok(())
    }

    fn offset(&self, x: u16, y: u16) -> usize {
        (y as usize * self.width as usize + x as usize) * 2
    }
}

impl OriginDimensions for Sprite {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Sprite {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0
                || point.y < 0
                || point.x >= self.width as i32
                || point.y >= self.height as i32
            {
                continue;
            }

            let offset = self.offset(point.x as u16, point.y as u16);
            let bytes = RawU16::from(color).into_inner().to_be_bytes();
            self.pixels[offset..offset + 2].copy_from_slice(&bytes);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color);
        Ok(())
    }
}
