pub mod dashboard;
pub mod hello;
pub mod sprite;

use embedded_graphics::mono_font::{
    MonoFont,
    ascii::{FONT_6X10, FONT_8X13, FONT_10X20},
};
use sensordemo_core::layout::SlotFont;

pub use sprite::{Sprite, SpriteError};

/// Anything that accepts a rectangle of big-endian RGB565 pixels at a screen
/// position: the panel driver on target, a recorder in tests.
pub trait BlitTarget {
    type Error;

    fn blit(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels_be: &[u8],
    ) -> Result<(), Self::Error>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderError<PanelErr> {
    Sprite(SpriteError),
    Panel(PanelErr),
}

pub type RenderResult<PanelErr> = Result<(), RenderError<PanelErr>>;

pub fn font_for(font: SlotFont) -> &'static MonoFont<'static> {
    match font {
        SlotFont::Large => &FONT_10X20,
        SlotFont::Medium => &FONT_8X13,
        SlotFont::Small => &FONT_6X10,
    }
}
