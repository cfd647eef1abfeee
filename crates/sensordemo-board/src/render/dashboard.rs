//! Sprite overlay for the sensor demo screen.
//!
//! Each slot owns a sprite sized to its region. Every show, hide or update
//! clears the sprite to black, draws the new content and pushes it to the
//! slot's fixed screen position; nothing else on screen is touched.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use log::info;
use sensordemo_core::{
    layout::{SlotFont, SpriteSlot},
    overlay::{self, IndicatorState, OverlayOp, StatusMessage},
    readings,
};

use crate::assets::{self, Asset};

use super::{BlitTarget, RenderError, RenderResult, Sprite, SpriteError};

const TEXT_COLOR: Rgb565 = Rgb565::WHITE;
const CLEAR_COLOR: Rgb565 = Rgb565::BLACK;

pub struct Dashboard<P> {
    panel: P,
    sprites: Vec<Sprite>,
    indicators: IndicatorState,
}

impl<P> Dashboard<P>
where
    P: BlitTarget,
{
    /// Allocates every slot sprite up front.
    pub fn setup(panel: P) -> Result<Self, SpriteError> {
        let mut sprites = Vec::new();
        sprites
            .try_reserve_exact(SpriteSlot::COUNT)
            .map_err(|_| SpriteError::OutOfMemory)?;

        let mut total_bytes = 0usize;
        for slot in SpriteSlot::ALL {
            let geometry = slot.geometry();
            let sprite = Sprite::new(geometry.width, geometry.height).inspect_err(|_| {
                info!("dashboard: sprite {} allocation failed", slot.name());
            })?;
            total_bytes += sprite.bytes().len();
            sprites.push(sprite);
        }

        info!(
            "dashboard: {} sprites allocated ({} bytes)",
            sprites.len(),
            total_bytes
        );

        Ok(Self {
            panel,
            sprites,
            indicators: IndicatorState::initial(),
        })
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn release(self) -> P {
        self.panel
    }

    /// Status strip state as last drawn by `apply_indicators`.
    pub fn indicators(&self) -> IndicatorState {
        self.indicators
    }

    pub fn sprite(&self, slot: SpriteSlot) -> &Sprite {
        &self.sprites[slot.index()]
    }

    /// Paints the full-screen background, which also wipes the status strip.
    pub fn show_startup_screen(&mut self) -> RenderResult<P::Error> {
        self.redraw(SpriteSlot::Background, |sprite| {
            sprite.draw_asset(&assets::DASHBOARD_BACKGROUND, 0, 0)
        })?;
        self.indicators = IndicatorState::initial();
        Ok(())
    }

    pub fn show_connecting(&mut self) -> RenderResult<P::Error> {
        self.show_message(StatusMessage::Connecting.text())
    }

    pub fn hide_connecting(&mut self) -> RenderResult<P::Error> {
        self.clear_slot(SpriteSlot::ConnectingMessage)
    }

    /// Short status text in the connecting slot, clipped to 100x20.
    pub fn show_message(&mut self, text: &str) -> RenderResult<P::Error> {
        self.draw_text(SpriteSlot::ConnectingMessage, text)
    }

    pub fn show_connected(&mut self) -> RenderResult<P::Error> {
        self.draw_icon(SpriteSlot::Connected, &assets::CONNECTED_ICON)
    }

    pub fn hide_connected(&mut self) -> RenderResult<P::Error> {
        self.clear_slot(SpriteSlot::Connected)
    }

    pub fn show_sending(&mut self) -> RenderResult<P::Error> {
        self.draw_icon(SpriteSlot::Sending, &assets::GREEN_DOT)
    }

    pub fn hide_sending(&mut self) -> RenderResult<P::Error> {
        self.clear_slot(SpriteSlot::Sending)
    }

    pub fn show_have_gps(&mut self) -> RenderResult<P::Error> {
        self.draw_icon(SpriteSlot::Gps, &assets::SATELLITE_DISH)
    }

    pub fn hide_have_gps(&mut self) -> RenderResult<P::Error> {
        self.clear_slot(SpriteSlot::Gps)
    }

    pub fn display_temp(&mut self, celsius: f32) -> RenderResult<P::Error> {
        let text = readings::format_temperature(celsius);
        self.draw_text(SpriteSlot::Temperature, &text)
    }

    pub fn display_humidity(&mut self, humidity: i32) -> RenderResult<P::Error> {
        let text = readings::format_integer(humidity);
        self.draw_text(SpriteSlot::Humidity, &text)
    }

    pub fn display_rotary(&mut self, rotary: i32) -> RenderResult<P::Error> {
        let text = readings::format_integer(rotary);
        self.draw_text(SpriteSlot::Rotary, &text)
    }

    pub fn display_pressure(&mut self, pressure: f32) -> RenderResult<P::Error> {
        let text = readings::format_pressure(pressure);
        self.draw_text(SpriteSlot::Pressure, &text)
    }

    pub fn show_firmware_version(&mut self, version: &str) -> RenderResult<P::Error> {
        let text = readings::format_version(version);
        self.draw_text(SpriteSlot::FirmwareVersion, &text)
    }

    /// Moves the status strip to `next`, touching only indicators that change.
    pub fn apply_indicators(&mut self, next: IndicatorState) -> RenderResult<P::Error> {
        for op in overlay::plan(self.indicators, next) {
            match op {
                OverlayOp::ShowMessage(message) => self.show_message(message.text())?,
                OverlayOp::HideMessage => self.hide_connecting()?,
                OverlayOp::ShowConnected => self.show_connected()?,
                OverlayOp::HideConnected => self.hide_connected()?,
                OverlayOp::ShowGps => self.show_have_gps()?,
                OverlayOp::HideGps => self.hide_have_gps()?,
                OverlayOp::ShowSending => self.show_sending()?,
                OverlayOp::HideSending => self.hide_sending()?,
            }
        }

        self.indicators = next;
        Ok(())
    }

    fn draw_text(&mut self, slot: SpriteSlot, text: &str) -> RenderResult<P::Error> {
        let font = slot.font().unwrap_or(SlotFont::Small);
        self.redraw(slot, |sprite| {
            sprite.draw_text(text, font, TEXT_COLOR);
            Ok(())
        })
    }

    fn draw_icon(&mut self, slot: SpriteSlot, asset: &Asset) -> RenderResult<P::Error> {
        self.redraw(slot, |sprite| sprite.draw_asset(asset, 0, 0))
    }

    fn clear_slot(&mut self, slot: SpriteSlot) -> RenderResult<P::Error> {
        self.redraw(slot, |_| Ok(()))
    }

    fn redraw<F>(&mut self, slot: SpriteSlot, draw: F) -> RenderResult<P::Error>
    where
        F: FnOnce(&mut Sprite) -> Result<(), SpriteError>,
    {
        let sprite = &mut self.sprites[slot.index()];
        sprite.fill(CLEAR_COLOR);
        draw(sprite).map_err(RenderError::Sprite)?;

        let geometry = slot.geometry();
        sprite
            .push(&mut self.panel, geometry.x, geometry.y)
            .map_err(RenderError::Panel)
    }
}
