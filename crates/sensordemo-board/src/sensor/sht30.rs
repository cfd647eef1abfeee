use embedded_hal::{delay::DelayNs, i2c::I2c};

pub const SHT30_ADDRESS: u8 = 0x44;

/// Single shot, high repeatability, no clock stretching.
const CMD_MEASURE_HIGH: [u8; 2] = [0x24, 0x00];
const MEASURE_WAIT_MS: u32 = 16;

const CRC_POLY: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Sht30Error<E> {
    I2c(E),
    /// A word failed its CRC-8; `word` is 0 for temperature, 1 for humidity.
    Crc { word: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sht30Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Sensirion CRC-8 over one 16-bit word.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    for byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

pub fn temperature_from_raw(raw: u16) -> f32 {
    -45.0 + 175.0 * raw as f32 / 65_535.0
}

pub fn humidity_from_raw(raw: u16) -> f32 {
    100.0 * raw as f32 / 65_535.0
}

/// Decodes a `T_msb T_lsb T_crc RH_msb RH_lsb RH_crc` frame.
pub fn decode_frame<E>(frame: &[u8; 6]) -> Result<Sht30Reading, Sht30Error<E>> {
    for (word, chunk) in frame.chunks_exact(3).enumerate() {
        if crc8(&chunk[..2]) != chunk[2] {
            return Err(Sht30Error::Crc { word: word as u8 });
        }
    }

    Ok(Sht30Reading {
        temperature_c: temperature_from_raw(u16::from_be_bytes([frame[0], frame[1]])),
        humidity_pct: humidity_from_raw(u16::from_be_bytes([frame[3], frame[4]])),
    })
}

#[derive(Debug)]
pub struct Sht30<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Sht30<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: SHT30_ADDRESS,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Triggers a single-shot measurement and blocks until it is ready.
    pub fn measure<D>(&mut self, delay: &mut D) -> Result<Sht30Reading, Sht30Error<I2C::Error>>
    where
        D: DelayNs,
    {
        self.i2c
            .write(self.address, &CMD_MEASURE_HIGH)
            .map_err(Sht30Error::I2c)?;
        delay.delay_ms(MEASURE_WAIT_MS);

        let mut frame = [0u8; 6];
        self.i2c
            .read(self.address, &mut frame)
            .map_err(Sht30Error::I2c)?;
        decode_frame(&frame)
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;
    use crate::test_support::{CountingDelay, ScriptedI2c};

    #[test]
    fn crc_matches_datasheet_example() {
        assert_eq!(crc8(&[0xBE, 0xEF]), 0x92);
    }

    #[test]
    fn frame_converts_to_celsius_and_percent() {
        let reading = decode_frame::<Infallible>(&[0x66, 0x66, 0x93, 0x80, 0x00, 0xA2]).unwrap();
        assert!((reading.temperature_c - 25.0).abs() < 0.01);
        assert!((reading.humidity_pct - 50.0).abs() < 0.01);
    }

    #[test]
    fn corrupted_word_is_rejected() {
        let result = decode_frame::<Infallible>(&[0x66, 0x66, 0x93, 0x80, 0x01, 0xA2]);
        assert_eq!(result, Err(Sht30Error::Crc { word: 1 }));
    }

    #[test]
    fn measure_sends_command_and_waits() {
        let mut i2c = ScriptedI2c::default();
        i2c.queue(&[0x66, 0x66, 0x93, 0x80, 0x00, 0xA2]);
        let mut sensor = Sht30::new(i2c);
        let mut delay = CountingDelay::default();

        let reading = sensor.measure(&mut delay).unwrap();
        assert!((reading.temperature_c - 25.0).abs() < 0.01);
        assert!(delay.total_ns >= 15_000_000);

        let i2c = sensor.release();
        assert_eq!(i2c.writes, [(SHT30_ADDRESS, std::vec![0x24, 0x00])]);
    }
}
