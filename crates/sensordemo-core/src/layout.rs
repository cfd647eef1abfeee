//! Fixed screen geometry of the dashboard overlay.

pub const SCREEN_WIDTH: u16 = 320;
pub const SCREEN_HEIGHT: u16 = 240;

// Column and row positions of the four numeric readouts.
const FIRST_X: u16 = 60;
const SECOND_X: u16 = 215;
const FIRST_Y: u16 = 80;
const SECOND_Y: u16 = 170;

const STATUS_Y: u16 = 15;
const FW_VERSION_LABEL_X: u16 = 240;
const FW_VERSION_LABEL_Y: u16 = 228;

const READOUT_W: u16 = 100;
const READOUT_H: u16 = 40;
const ICON_SIZE: u16 = 20;
const DOT_SIZE: u16 = 10;
const LABEL_W: u16 = 100;
const LABEL_H: u16 = 20;

/// Text size class; the renderer maps each to a concrete font.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SlotFont {
    Large,
    Medium,
    Small,
}

/// Sprite size plus the screen position it is pushed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SlotGeometry {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl SlotGeometry {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Part of the rectangle that lands on the screen, or `None` when nothing does.
    pub fn visible(self) -> Option<Self> {
        if self.x >= SCREEN_WIDTH || self.y >= SCREEN_HEIGHT || self.width == 0 || self.height == 0
        {
            return None;
        }

        Some(Self {
            x: self.x,
            y: self.y,
            width: self.width.min(SCREEN_WIDTH - self.x),
            height: self.height.min(SCREEN_HEIGHT - self.y),
        })
    }
}

/// Off-screen buffers making up the dashboard.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum SpriteSlot {
    Background = 0,
    ConnectingMessage = 1,
    Connected = 2,
    Gps = 3,
    Sending = 4,
    Temperature = 5,
    Humidity = 6,
    Pressure = 7,
    Rotary = 8,
    FirmwareVersion = 9,
}

impl SpriteSlot {
    pub const COUNT: usize = 10;

    /// Allocation order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Background,
        Self::ConnectingMessage,
        Self::Connected,
        Self::Gps,
        Self::Sending,
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::Rotary,
        Self::FirmwareVersion,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn geometry(self) -> SlotGeometry {
        match self {
            Self::Background => SlotGeometry::new(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT),
            Self::ConnectingMessage => SlotGeometry::new(160, STATUS_Y, LABEL_W, LABEL_H),
            Self::Connected => SlotGeometry::new(170, STATUS_Y, ICON_SIZE, ICON_SIZE),
            Self::Gps => SlotGeometry::new(200, STATUS_Y, ICON_SIZE, ICON_SIZE),
            Self::Sending => SlotGeometry::new(235, 20, DOT_SIZE, DOT_SIZE),
            Self::Temperature => SlotGeometry::new(FIRST_X, FIRST_Y, READOUT_W, READOUT_H),
            Self::Humidity => SlotGeometry::new(SECOND_X, FIRST_Y, READOUT_W, READOUT_H),
            Self::Rotary => SlotGeometry::new(FIRST_X, SECOND_Y, READOUT_W, READOUT_H),
            Self::Pressure => SlotGeometry::new(SECOND_X, SECOND_Y, READOUT_W, READOUT_H),
            Self::FirmwareVersion => {
                SlotGeometry::new(FW_VERSION_LABEL_X, FW_VERSION_LABEL_Y, LABEL_W, LABEL_H)
            }
        }
    }

    /// Font used for text slots, `None` for image-only slots.
    pub const fn font(self) -> Option<SlotFont> {
        match self {
            Self::ConnectingMessage => Some(SlotFont::Medium),
            Self::Temperature | Self::Humidity | Self::Pressure | Self::Rotary => {
                Some(SlotFont::Large)
            }
            Self::FirmwareVersion => Some(SlotFont::Small),
            Self::Background | Self::Connected | Self::Gps | Self::Sending => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::ConnectingMessage => "connecting",
            Self::Connected => "connected",
            Self::Gps => "gps",
            Self::Sending => "sending",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Rotary => "rotary",
            Self::FirmwareVersion => "firmware_version",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_indexed_in_order() {
        for (i, slot) in SpriteSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn every_slot_is_at_least_partly_on_screen() {
        for slot in SpriteSlot::ALL {
            assert!(slot.geometry().visible().is_some(), "{}", slot.name());
        }
    }

    #[test]
    fn readouts_sit_on_the_two_by_two_grid() {
        assert_eq!(
            SpriteSlot::Temperature.geometry(),
            SlotGeometry::new(60, 80, 100, 40)
        );
        assert_eq!(
            SpriteSlot::Humidity.geometry(),
            SlotGeometry::new(215, 80, 100, 40)
        );
        assert_eq!(
            SpriteSlot::Rotary.geometry(),
            SlotGeometry::new(60, 170, 100, 40)
        );
        assert_eq!(
            SpriteSlot::Pressure.geometry(),
            SlotGeometry::new(215, 170, 100, 40)
        );
    }

    #[test]
    fn firmware_label_is_clipped_at_bottom_right() {
        let visible = SpriteSlot::FirmwareVersion.geometry().visible().unwrap();
        assert_eq!(visible, SlotGeometry::new(240, 228, 80, 12));
    }

    #[test]
    fn fully_on_screen_slots_are_not_clipped() {
        let geometry = SpriteSlot::Sending.geometry();
        assert_eq!(geometry.visible(), Some(geometry));
        assert_eq!(geometry.pixel_count(), 100);
    }

    #[test]
    fn off_screen_rectangle_has_no_visible_part() {
        assert_eq!(SlotGeometry::new(320, 0, 10, 10).visible(), None);
        assert_eq!(SlotGeometry::new(0, 240, 10, 10).visible(), None);
        assert_eq!(SlotGeometry::new(0, 0, 0, 10).visible(), None);
    }

    #[test]
    fn only_text_slots_have_fonts() {
        assert_eq!(SpriteSlot::Temperature.font(), Some(SlotFont::Large));
        assert_eq!(SpriteSlot::ConnectingMessage.font(), Some(SlotFont::Medium));
        assert_eq!(SpriteSlot::FirmwareVersion.font(), Some(SlotFont::Small));
        assert_eq!(SpriteSlot::Gps.font(), None);
    }
}
