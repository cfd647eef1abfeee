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
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    spi::master::Spi,
    time::{Instant, Rate},
    timer::timg::TimerGroup,
    uart::{Config as UartConfig, Uart},
};
use ili9342c::Ili9342c;
use log::{LevelFilter, debug, info, warn};
use sensordemo_board::{
    input::rotary::{RotaryConfig, RotaryInput},
    network::ConnectivityHandle,
    platform::display::CORE2_PANEL,
    render::dashboard::Dashboard,
    sensor::{qmp6988::Qmp6988, sht30::Sht30},
};
use sensordemo_core::{
    input::InputProvider,
    nmea::GpsTracker,
    overlay::{ConnectionPhase, IndicatorState},
    readings::RotaryPosition,
    report::{ReportSchedule, SampleReport},
};
use static_cell::StaticCell;

use core2::{FIRMWARE_VERSION, note_render, park};
use iot_secrets::IOT_SECRETS;
use report_log::LogSink;
use wifi_settings::WIFI_SETTINGS;

#[path = "shared/core2.rs"]
mod core2;
#[path = "shared/iot_secrets.rs"]
mod iot_secrets;
#[path = "main/report_log.rs"]
mod report_log;
#[path = "shared/wifi.rs"]
mod wifi;
#[path = "shared/wifi_settings.rs"]
mod wifi_settings;

const SENSOR_INTERVAL_MS: u64 = 2_000;
const UI_TICK_MS: u64 = 2;
const GPS_BAUD: u32 = 9_600;
const I2C_HZ: u32 = 400_000;
const ENCODER_DIRECTION_INVERTED: bool = false;

static CONNECTIVITY: ConnectivityHandle = ConnectivityHandle::new();
static NET_RESOURCES: StaticCell<embassy_net::StackResources<4>> = StaticCell::new();

#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    loop {}
}

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(_spawner: Spawner) -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);
    esp_println::println!("boot: sensordemo {} starting", FIRMWARE_VERSION);

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    // esp-radio requires an allocator in internal RAM; sprites go to PSRAM.
    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 65536);
    core2::init_psram_heap(&peripherals.PSRAM);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut delay = Delay::new();

    // Internal I2C: AXP192=0x34, FT6336U=0x38. SDA=GPIO21, SCL=GPIO22
    let internal_i2c = I2c::new(
        peripherals.I2C0,
        I2cConfig::default().with_frequency(Rate::from_hz(I2C_HZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO21)
    .with_scl(peripherals.GPIO22);
    let internal_bus = RefCell::new(internal_i2c);
    core2::power_up(RefCellDevice::new(&internal_bus), &mut delay);

    // Panel: SCK=GPIO18, MOSI=GPIO23, CS=GPIO5, DC=GPIO15
    let spi = Spi::new(peripherals.SPI2, core2::panel_spi_config())
        .unwrap()
        .with_sck(peripherals.GPIO18)
        .with_mosi(peripherals.GPIO23);
    let cs = Output::new(peripherals.GPIO5, Level::High, OutputConfig::default());
    let dc = Output::new(peripherals.GPIO15, Level::Low, OutputConfig::default());
    let spi_device = ExclusiveDevice::new(spi, cs, Delay::new()).unwrap();
    let mut panel = Ili9342c::new(spi_device, dc, CORE2_PANEL);
    let mut display_fault_logged = core2::bring_up_display(&mut panel, &mut delay);

    let mut dashboard = match Dashboard::setup(panel) {
        Ok(dashboard) => dashboard,
        Err(err) => {
            esp_println::println!("display: sprite setup failed");
            warn!("sprite setup failed: {:?}", err);
            park().await
        }
    };
    note_render(
        dashboard.show_startup_screen(),
        "startup screen",
        &mut display_fault_logged,
    );
    note_render(
        dashboard.show_firmware_version(FIRMWARE_VERSION),
        "firmware version",
        &mut display_fault_logged,
    );

    // ENV-III on Port A: SDA=GPIO32, SCL=GPIO33
    let port_a_i2c = I2c::new(
        peripherals.I2C1,
        I2cConfig::default().with_frequency(Rate::from_hz(I2C_HZ)),
    )
    .unwrap()
    .with_sda(peripherals.GPIO32)
    .with_scl(peripherals.GPIO33);
    let port_a_bus = RefCell::new(port_a_i2c);
    let mut sht30 = Sht30::new(RefCellDevice::new(&port_a_bus));
    let mut qmp6988 = match Qmp6988::init(RefCellDevice::new(&port_a_bus), &mut delay) {
        Ok(sensor) => Some(sensor),
        Err(err) => {
            warn!("qmp6988 unavailable: {:?}", err);
            None
        }
    };

    // Rotary encoder: CLK=GPIO26, DT=GPIO36 (input-only, external pull-up), SW=GPIO19
    let encoder_clk = Input::new(
        peripherals.GPIO26,
        InputConfig::default().with_pull(Pull::Up),
    );
    let encoder_dt = Input::new(peripherals.GPIO36, InputConfig::default());
    let encoder_sw = Input::new(
        peripherals.GPIO19,
        InputConfig::default().with_pull(Pull::Up),
    );
    let mut input = RotaryInput::new(
        encoder_clk,
        encoder_dt,
        encoder_sw,
        RotaryConfig::default()
            .with_direction_inverted(ENCODER_DIRECTION_INVERTED)
            .with_button_debounce_polls(4),
    )
    .unwrap();

    // GPS unit on Port C: RX=GPIO13, TX=GPIO14
    let mut gps_uart = Uart::new(
        peripherals.UART2,
        UartConfig::default().with_baudrate(GPS_BAUD),
    )
    .unwrap()
    .with_rx(peripherals.GPIO13)
    .with_tx(peripherals.GPIO14);

    let config_status = WIFI_SETTINGS
        .validate()
        .and_then(|()| IOT_SECRETS.validate());
    if let Err(err) = config_status {
        warn!(
            "configuration invalid ({:?} in {}); wifi disabled",
            err,
            err.field().as_str()
        );
        CONNECTIVITY.mark_config_error();
    }

    let radio = match esp_radio::init() {
        Ok(radio) => radio,
        Err(err) => {
            info!("esp-radio init failed: {:?}", err);
            note_render(
                dashboard.show_message("Radio error"),
                "status message",
                &mut display_fault_logged,
            );
            park().await
        }
    };

    let (mut wifi_controller, interfaces) =
        match esp_radio::wifi::new(&radio, peripherals.WIFI, esp_radio::wifi::Config::default()) {
            Ok(parts) => parts,
            Err(err) => {
                info!("wifi peripheral init failed: {:?}", err);
                note_render(
                    dashboard.show_message("Radio error"),
                    "status message",
                    &mut display_fault_logged,
                );
                park().await
            }
        };

    if config_status.is_ok()
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
        0x51E7_C0E2_D3A0_0001,
    );

    info!("Panel pins: SCK=GPIO18 MOSI=GPIO23 CS=GPIO5 DC=GPIO15");
    info!("Encoder pins: CLK=GPIO26 DT=GPIO36 SW=GPIO19");
    info!("ENV-III on Port A (SDA=GPIO32 SCL=GPIO33); GPS on UART2 (RX=GPIO13)");

    let loop_start = Instant::now();

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
        let mut rotary = RotaryPosition::new();
        let mut gps = GpsTracker::default();
        let mut schedule = ReportSchedule::default();
        let mut sink = LogSink::default();
        let mut report = SampleReport::default();
        let mut last_sample_ms: Option<u64> = None;
        let mut input_fault_logged = false;
        let mut uart_buf = [0u8; 64];
        let mut last_connectivity_revision = u32::MAX;
        let mut phase = ConnectionPhase::Offline;

        note_render(
            dashboard.display_rotary(rotary.value()),
            "rotary",
            &mut display_fault_logged,
        );

        loop {
            let now_ms = loop_start.elapsed().as_millis();

            match input.poll_event() {
                Ok(Some(event)) => {
                    if rotary.apply(event) {
                        note_render(
                            dashboard.display_rotary(rotary.value()),
                            "rotary",
                            &mut display_fault_logged,
                        );
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    if !input_fault_logged {
                        info!("encoder read failed: {:?}", err);
                        input_fault_logged = true;
                    }
                }
            }

            while gps_uart.read_ready() {
                let Ok(len) = gps_uart.read(&mut uart_buf) else {
                    break;
                };
                for &byte in &uart_buf[..len] {
                    if let Some(Err(err)) = gps.feed(byte, now_ms) {
                        debug!("gps: dropped sentence: {:?}", err);
                    }
                }
            }

            if last_sample_ms.is_none_or(|last| now_ms.saturating_sub(last) >= SENSOR_INTERVAL_MS)
            {
                last_sample_ms = Some(now_ms);

                match sht30.measure(&mut delay) {
                    Ok(reading) => {
                        report.temperature_c = Some(reading.temperature_c);
                        report.humidity_pct = Some(reading.humidity_pct);
                        note_render(
                            dashboard.display_temp(reading.temperature_c),
                            "temperature",
                            &mut display_fault_logged,
                        );
                        note_render(
                            dashboard.display_humidity(reading.humidity_pct as i32),
                            "humidity",
                            &mut display_fault_logged,
                        );
                    }
                    Err(err) => {
                        debug!("sht30 read failed: {:?}", err);
                        report.temperature_c = None;
                        report.humidity_pct = None;
                    }
                }

                if let Some(sensor) = qmp6988.as_mut() {
                    match sensor.measure() {
                        Ok(reading) => {
                            report.pressure_hpa = Some(reading.pressure_hpa());
                            note_render(
                                dashboard.display_pressure(reading.pressure_hpa()),
                                "pressure",
                                &mut display_fault_logged,
                            );
                        }
                        Err(err) => {
                            debug!("qmp6988 read failed: {:?}", err);
                            report.pressure_hpa = None;
                        }
                    }
                }
            }

            let connectivity = CONNECTIVITY.snapshot();
            if connectivity.revision != last_connectivity_revision {
                last_connectivity_revision = connectivity.revision;
                phase = connectivity.phase();
                info!(
                    "connectivity: {:?} link_up={} ipv4={} rev={}",
                    phase, connectivity.link_up, connectivity.has_ipv4, connectivity.revision
                );
            }

            report.rotary = rotary.value();
            report.gps = gps.fix(now_ms);

            if phase == ConnectionPhase::Connected
                && let Err(err) = schedule.poll(now_ms, &mut sink, &report)
            {
                info!("report send failed: {:?}", err);
            }

            let indicators = IndicatorState::initial()
                .with_phase(phase)
                .with_gps(gps.has_fix(now_ms))
                .with_sending(schedule.sending_visible(now_ms));
            if indicators != dashboard.indicators() {
                note_render(
                    dashboard.apply_indicators(indicators),
                    "indicators",
                    &mut display_fault_logged,
                );
            }

            Timer::after_millis(UI_TICK_MS).await;
        }
    };

    let _ = embassy_futures::join::join3(net_future, wifi_future, ui_future).await;
    unreachable!()
}
