#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use core::cell::RefCell;

use embassy_executor::Spawner;
use embassy_time::Timer;
use embedded_hal_bus::{i2c::RefCellDevice, spi::ExclusiveDevice};
use esp_hal::{
    clock::CpuClock,
    delay::Delay,
    gpio::{Level, Output, OutputConfig},
    i2c::master::{Config as I2cConfig, I2c},
    spi::master::Spi,
    time::Rate,
    timer::timg::TimerGroup,
};
use ili9342c::Ili9342c;
use log::{LevelFilter, info, warn};
use sensordemo_board::{
    input::touch_buttons::TouchButtons,
    network::ConnectivityHandle,
    platform::display::CORE2_PANEL,
    render::hello::{HelloScreen, LABEL_WIDTH, LABEL_X, LABEL_Y},
};
use sensordemo_core::{
    input::{InputEvent, InputProvider},
    overlay::ConnectionPhase,
};
use static_cell::StaticCell;

use core2::{FIRMWARE_VERSION, note_render, park};
use wifi_settings::WIFI_SETTINGS;

#[path = "shared/core2.rs"]
mod core2;
#[path = "shared/wifi.rs"]
mod wifi;
#[path = "shared/wifi_settings.rs"]
mod wifi_settings;

const TOUCH_POLL_MS: u64 = 20;
const I2C_HZ: u32 = 400_000;

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: hello {} starting", FIRMWARE_VERSION);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);
    core2::init_psram_heap(&peripherals.PSRAM);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut delay = Delay::new();

    let internal_i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_hz(I2C_HZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO21)
    .with_scl(peripherals.GPIO22);
    let internal_bus = RefCell::new(internal_i2c);
    core2::power_up(RefCellDevice::new(&internal_bus), &mut delay);
    let mut buttons = TouchButtons::new(RefCellDevice::new(&internal_bus));

    let spi = Spi::new(peripherals.SPI2, core2::panel_spi_config())
        .unwrap()
        .with_sck(peripherals.GPIO18)
        .with_mosi(peripherals.GPIO23);
    let cs = Output::new(peripherals.GPIO5, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());
    let spi_device = ExclusiveDevice::new(spi, cs, Delay::new()).unwrap();
    let mut panel = Ili9342c::new(spi_device, dc, CORE2_PANEL);
    let mut display_fault_logged = core2::bring_up_display(&mut panel, &mut delay);

    let mut screen = HelloScreen::new(panel);
    note_render(
        screen.show_startup_screen(),
        "startup screen",
        &mut display_fault_logged,
    );

    if let Err(err) = WIFI_SETTINGS.validate() {
        warn!("wifi settings invalid ({:?}); staying offline", err);
        CONNECTIVITY.mark_config_error();
    }

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            park().await
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                park().await
            }
        };

    if CONNECTIVITY.snapshot().phase() != ConnectionPhase::ConfigError
        && let Err(err) = wifi_controller.set_config(&wifi::station_mode(&WIFI_SETTINGS))
    {
        info!("wifi mode config failed: {:?}", err);
        CONNECTIVITY.mark_config_error();
    }

    let stack_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, mut net_runner) = embassy_net::new(
        interfaces.sta,
        stack_config,
        NET_RESOURCES.init(embassy_net::StackResources::<4>::new()),
        0x4E11_0C02_E2A1_0002,
    );

    let net_future = net_runner.run();
    let wifi_future = async {
        if CONNECTIVITY.snapshot().phase() == ConnectionPhase::ConfigError {
            park().await
        }
        wifi::wifi_connection_loop(
            &mut wifi_controller,
            stack,
            WIFI_SETTINGS.ssid,
            &CONNECTIVITY,
        )
        .await
    };
    let ui_future = async {
        let mut background_shown = false;
        let mut touch_fault_logged = false;
        let mut last_connectivity_revision = u32::MAX;

        loop {
            let connectivity = CONNECTIVITY.snapshot();
            if connectivity.revision != last_connectivity_revision {
                last_connectivity_revision = connectivity.revision;
                match connectivity.phase() {
                    ConnectionPhase::Connected if !background_shown => {
                        note_render(
                            screen.show_hello_world_background(),
                            "background",
                            &mut display_fault_logged,
                        );
                        background_shown = true;
                    }
                    ConnectionPhase::ConfigError => {
                        note_render(
                            screen.eprint("Config error", LABEL_X, LABEL_Y, LABEL_WIDTH),
                            "status",
                            &mut display_fault_logged,
                        );
                    }
                    _ => {}
                }
            }

            if background_shown {
                match buttons.poll_event() {
                    Ok(Some(InputEvent::Touch(button))) => note_render(
                        screen.update_display(button),
                        "planet",
                        &mut display_fault_logged,
                    ),
                    Ok(_) => {}
                    Err(err) => {
                        if !touch_fault_logged {
                            info!("touch read failed: {:?}", err);
                            touch_fault_logged = true;
                        }
                    }
                }
            }

            Timer::after_millis(TOUCH_POLL_MS).await;
        }
    };

    let _ = embassy_futures::join::join3(net_future, wifi_future, ui_future).await;
    unreachable!()
}
