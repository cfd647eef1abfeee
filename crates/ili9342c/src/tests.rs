use core::convert::Infallible;
use std::{cell::RefCell, rc::Rc};

use embedded_hal::{
    delay::DelayNs,
    digital::{ErrorType as PinErrorType, OutputPin},
    spi::{ErrorType as SpiErrorType, Operation, SpiDevice},
};

use super::*;

/// Bytes written on the bus tagged with the DC level at write time.
type WireLog = Rc<RefCell<Vec<(bool, Vec<u8>)>>>;

struct RecordingSpi {
    log: WireLog,
    dc_high: Rc<RefCell<bool>>,
}

impl SpiErrorType for RecordingSpi {
    type Error = Infallible;
}

impl SpiDevice<u8> for RecordingSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Write(bytes) = op {
                let dc = *self.dc_high.borrow();
                self.log.borrow_mut().push((dc, bytes.to_vec()));
            }
        }
        Ok(())
    }
}

struct RecordingDc(Rc<RefCell<bool>>);

impl PinErrorType for RecordingDc {
    type Error = Infallible;
}

impl OutputPin for RecordingDc {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        *self.0.borrow_mut() = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        *self.0.borrow_mut() = true;
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn make_driver() -> (Ili9342c<RecordingSpi, RecordingDc>, WireLog) {
    let log: WireLog = Rc::new(RefCell::new(Vec::new()));
    let dc = Rc::new(RefCell::new(false));
    let spi = RecordingSpi {
        log: log.clone(),
        dc_high: dc.clone(),
    };
    (
        Ili9342c::new(spi, RecordingDc(dc), Config::default()),
        log,
    )
}

fn commands(log: &WireLog) -> Vec<u8> {
    log.borrow()
        .iter()
        .filter(|(dc, _)| !dc)
        .map(|(_, bytes)| bytes[0])
        .collect()
}

#[test]
fn blit_opens_window_then_streams_pixels_as_data() {
    let (mut driver, log) = make_driver();
    let pixels = [0xAB; 20 * 20 * 2];

    driver.blit(170, 15, 20, 20, &pixels).unwrap();

    let log = log.borrow();
    assert_eq!(log[0], (false, vec![protocol::CASET]));
    assert_eq!(log[1], (true, vec![0x00, 170, 0x00, 189]));
    assert_eq!(log[2], (false, vec![protocol::PASET]));
    assert_eq!(log[3], (true, vec![0x00, 15, 0x00, 34]));
    assert_eq!(log[4], (false, vec![protocol::RAMWR]));
    assert!(log[5].0);
    assert_eq!(log[5].1.len(), 800);
}

#[test]
fn blit_rejects_payload_of_wrong_length() {
    let (mut driver, log) = make_driver();

    assert_eq!(
        driver.blit(0, 0, 10, 10, &[0u8; 10]),
        Err(Error::InvalidInput)
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn blit_rejects_rectangle_past_panel_edge() {
    let (mut driver, _log) = make_driver();
    let pixels = [0u8; 100 * 20 * 2];

    assert_eq!(
        driver.blit(240, 228, 100, 20, &pixels),
        Err(Error::InvalidInput)
    );
}

#[test]
fn fill_rect_streams_exact_pixel_count() {
    let (mut driver, log) = make_driver();

    driver.fill_rect(0, 0, 10, 10, 0xF800).unwrap();

    let log = log.borrow();
    let data: usize = log
        .iter()
        .skip(5)
        .filter(|(dc, _)| *dc)
        .map(|(_, bytes)| bytes.len())
        .sum();
    assert_eq!(data, 200);
    assert_eq!(&log[5].1[..4], &[0xF8, 0x00, 0xF8, 0x00]);
}

#[test]
fn init_runs_vendor_sequence_then_turns_display_on() {
    let (mut driver, log) = make_driver();

    driver.init(&mut NoDelay).unwrap();

    let sent = commands(&log);
    assert_eq!(sent[0], protocol::SWRESET);
    assert!(sent.contains(&protocol::SLPOUT));
    assert!(sent.contains(&protocol::INVON));
    assert_eq!(*sent.last().unwrap(), protocol::DISPON);

    let log = log.borrow();
    let madctl = log
        .iter()
        .position(|(dc, bytes)| !dc && bytes[0] == protocol::MADCTL)
        .unwrap();
    assert_eq!(log[madctl + 1], (true, vec![protocol::MADCTL_BGR]));
}

#[test]
fn inversion_can_be_disabled_by_config() {
    let log: WireLog = Rc::new(RefCell::new(Vec::new()));
    let dc = Rc::new(RefCell::new(false));
    let spi = RecordingSpi {
        log: log.clone(),
        dc_high: dc.clone(),
    };
    let mut driver = Ili9342c::new(
        spi,
        RecordingDc(dc),
        Config::default().with_invert_colors(false),
    );

    driver.init(&mut NoDelay).unwrap();

    let sent = commands(&log);
    assert!(sent.contains(&protocol::INVOFF));
    assert!(!sent.contains(&protocol::INVON));
}
