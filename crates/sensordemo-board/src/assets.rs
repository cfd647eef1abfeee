//! Artwork baked into the firmware image.
//!
//! Every asset is a zlib stream of big-endian RGB565 pixels, row-major, produced
//! by `tools/gen_assets.py`.

use alloc::vec::Vec;

use miniz_oxide::inflate::{TINFLStatus, decompress_to_vec_zlib_with_limit};
use sensordemo_core::theme::PlanetColor;

use crate::render::SpriteError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Asset {
    pub name: &'static str,
    pub width: u16,
    pub height: u16,
    data: &'static [u8],
}

impl Asset {
    pub const fn new(name: &'static str, width: u16, height: u16, data: &'static [u8]) -> Self {
        Self {
            name,
            width,
            height,
            data,
        }
    }

    /// Size of the decoded raster.
    pub const fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 2
    }

    pub const fn compressed(&self) -> &'static [u8] {
        self.data
    }

    /// Inflates the raster, checking it has exactly `width * height` pixels.
    pub fn decode(&self) -> Result<Vec<u8>, SpriteError> {
        let expected = self.byte_len();
        let pixels = decompress_to_vec_zlib_with_limit(self.data, expected).map_err(|err| {
            match err.status {
                TINFLStatus::HasMoreOutput => SpriteError::AssetSize,
                _ => SpriteError::AssetCorrupt,
            }
        })?;

        if pixels.len() != expected {
            return Err(SpriteError::AssetSize);
        }
        Ok(pixels)
    }
}

pub const DASHBOARD_BACKGROUND: Asset = Asset::new(
    "dashboard_background",
    320,
    240,
    include_bytes!("../assets/dashboard_background_320x240_rgb565_be.raw.zlib"),
);
pub const CONNECTED_ICON: Asset = Asset::new(
    "connected",
    20,
    20,
    include_bytes!("../assets/connected_20x20_rgb565_be.raw.zlib"),
);
pub const SATELLITE_DISH: Asset = Asset::new(
    "satellite_dish",
    20,
    20,
    include_bytes!("../assets/satellite_dish_20x20_rgb565_be.raw.zlib"),
);
pub const GREEN_DOT: Asset = Asset::new(
    "green_dot",
    10,
    10,
    include_bytes!("../assets/green_dot_10x10_rgb565_be.raw.zlib"),
);

pub const HELLO_CONNECTING: Asset = Asset::new(
    "hello_connecting",
    320,
    240,
    include_bytes!("../assets/hello_connecting_320x240_rgb565_be.raw.zlib"),
);
pub const HELLO_BASE: Asset = Asset::new(
    "hello_base",
    320,
    240,
    include_bytes!("../assets/hello_base_320x240_rgb565_be.raw.zlib"),
);

pub const PLANET_ORIGINAL: Asset = Asset::new(
    "planet_original",
    120,
    120,
    include_bytes!("../assets/planet_original_120x120_rgb565_be.raw.zlib"),
);
pub const PLANET_RED: Asset = Asset::new(
    "planet_red",
    120,
    120,
    include_bytes!("../assets/planet_red_120x120_rgb565_be.raw.zlib"),
);
pub const PLANET_BLUE: Asset = Asset::new(
    "planet_blue",
    120,
    120,
    include_bytes!("../assets/planet_blue_120x120_rgb565_be.raw.zlib"),
);
pub const PLANET_GREEN: Asset = Asset::new(
    "planet_green",
    120,
    120,
    include_bytes!("../assets/planet_green_120x120_rgb565_be.raw.zlib"),
);

pub fn planet(color: PlanetColor) -> &'static Asset {
    match color {
        PlanetColor::Original => &PLANET_ORIGINAL,
        PlanetColor::Red => &PLANET_RED,
        PlanetColor::Blue => &PLANET_BLUE,
        PlanetColor::Green => &PLANET_GREEN,
    }
}
