//! Hello-world screen: full-screen backdrops, a planet whose color follows the
//! touch buttons, and a one-line label naming the color.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use log::info;
use sensordemo_core::{input::TouchButton, layout::SlotFont, theme::PlanetColor};

use crate::assets::{self, Asset};

use super::{BlitTarget, RenderError, RenderResult, Sprite, font_for};

pub const PLANET_X: u16 = 100;
pub const PLANET_Y: u16 = 50;
pub const LABEL_X: u16 = 14;
pub const LABEL_Y: u16 = 200;
pub const LABEL_WIDTH: u16 = 136;

const LABEL_FONT: SlotFont = SlotFont::Large;

pub struct HelloScreen<P> {
    panel: P,
    current: PlanetColor,
}

impl<P> HelloScreen<P>
where
    P: BlitTarget,
{
    pub fn new(panel: P) -> Self {
        Self {
            panel,
            current: PlanetColor::Original,
        }
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn release(self) -> P {
        self.panel
    }

    pub fn current_color(&self) -> PlanetColor {
        self.current
    }

    /// Splash shown while WiFi comes up.
    pub fn show_startup_screen(&mut self) -> RenderResult<P::Error> {
        self.blit_asset(&assets::HELLO_CONNECTING, 0, 0)
    }

    /// Main backdrop plus the planet in its current color.
    pub fn show_hello_world_background(&mut self) -> RenderResult<P::Error> {
        self.blit_asset(&assets::HELLO_BASE, 0, 0)?;
        self.set_current_color(self.current)
    }

    pub fn set_current_color(&mut self, color: PlanetColor) -> RenderResult<P::Error> {
        self.current = color;
        self.blit_asset(assets::planet(color), PLANET_X, PLANET_Y)
    }

    /// Erases a `width` wide line at (`x`, `y`) and prints `text` into it.
    pub fn eprint(&mut self, text: &str, x: u16, y: u16, width: u16) -> RenderResult<P::Error> {
        let line_height = font_for(LABEL_FONT).character_size.height as u16;
        let mut line = Sprite::new(width, line_height).map_err(RenderError::Sprite)?;
        line.fill(Rgb565::BLACK);
        line.draw_text(text, LABEL_FONT, Rgb565::WHITE);
        line.push(&mut self.panel, x, y).map_err(RenderError::Panel)
    }

    /// Reacts to a touch button: recolors the planet and names the color.
    pub fn update_display(&mut self, button: TouchButton) -> RenderResult<P::Error> {
        let color = PlanetColor::from_button(button);
        info!("hello: button {:?} -> {}", button, color.label());
        self.set_current_color(color)?;
        self.eprint(color.label(), LABEL_X, LABEL_Y, LABEL_WIDTH)
    }

    fn blit_asset(&mut self, asset: &Asset, x: u16, y: u16) -> RenderResult<P::Error> {
        let sprite = Sprite::from_asset(asset).map_err(RenderError::Sprite)?;
        sprite.push(&mut self.panel, x, y).map_err(RenderError::Panel)
    }
}
