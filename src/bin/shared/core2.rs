//! Core2 bring-up shared by both firmware images.

use core::fmt::Debug;

use embedded_hal::i2c::I2c;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{Blocking, delay::Delay, gpio::Output, spi::master::Spi, time::Rate};
use ili9342c::Ili9342c;
use log::{info, warn};
use sensordemo_board::platform::{
    display::{CORE2_PANEL, bring_up_panel},
    power::{Axp192, PowerConfig},
};

pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Core2Panel =
    Ili9342c<ExclusiveDevice<Spi<'static, Blocking>, Output<'static>, Delay>, Output<'static>>;

/// Hands the external PSRAM to the allocator; sprite buffers land there.
pub fn init_psram_heap(psram: &esp_hal::peripherals::PSRAM<'_>) {
    let (start, size) = esp_hal::psram::psram_raw_parts(psram);
    info!("psram heap: start={:p} size={}", start, size);
    unsafe {
        esp_alloc::HEAP.add_region(esp_alloc::HeapRegion::new(
            start,
            size,
            esp_alloc::MemoryCapability::External.into(),
        ));
    }
}

pub fn panel_spi_config() -> esp_hal::spi::master::Config {
    esp_hal::spi::master::Config::default()
        .with_frequency(Rate::from_hz(CORE2_PANEL.spi_hz))
        .with_mode(esp_hal::spi::Mode::_0)
}

/// Brings up the AXP192 rails. The LCD stays dark and in reset if this fails.
pub fn power_up<I2C>(i2c: I2C, delay: &mut Delay)
where
    I2C: I2c,
    I2C::Error: Debug,
{
    let mut axp = Axp192::new(i2c);
    match axp.init_core2(PowerConfig::default(), delay) {
        Ok(()) => esp_println::println!("power: axp192 ok"),
        Err(err) => {
            esp_println::println!("power: axp192 init failed");
            warn!("axp192 init failed: {:?}", err);
        }
    }
    if let Ok(battery_mv) = axp.battery_mv() {
        info!("battery {} mV", battery_mv);
    }
}

/// Initializes the panel; returns `true` when a fault was already logged.
pub fn bring_up_display(panel: &mut Core2Panel, delay: &mut Delay) -> bool {
    esp_println::println!("display: init begin (SCK=18 MOSI=23 CS=5 DC=15)");
    match bring_up_panel(panel, delay) {
        Ok(()) => {
            esp_println::println!("display: initialize ok");
            false
        }
        Err(err) => {
            esp_println::println!("display: initialize failed");
            info!("display initialize failed: {:?}", err);
            true
        }
    }
}

/// Logs the first render failure; later ones stay quiet until the panel recovers.
pub fn note_render<E: Debug>(result: Result<(), E>, what: &str, fault_logged: &mut bool) {
    match result {
        Ok(()) => *fault_logged = false,
        Err(err) if !*fault_logged => {
            esp_println::println!("display: {} failed", what);
            info!("display {} failed: {:?}", what, err);
            *fault_logged = true;
        }
        Err(_) => {}
    }
}

pub async fn park() -> ! {
    loop {
        embassy_time::Timer::after_secs(1).await;
    }
}
