//! QMP6988 barometer with OTP-calibrated fixed-point compensation.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::debug;

pub const QMP6988_ADDRESS: u8 = 0x70;
pub const CHIP_ID: u8 = 0x5C;

const REG_CHIP_ID: u8 = 0xD1;
const REG_RESET: u8 = 0xE0;
const REG_IIR: u8 = 0xF1;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_DATA: u8 = 0xF7;
const REG_OTP: u8 = 0xA0;

const OTP_LEN: usize = 25;
const RESET_COMMAND: u8 = 0xE6;
const RESET_WAIT_MS: u32 = 20;
const RAW_OFFSET: i32 = 1 << 23;

const IIR_COEFF_4: u8 = 0x02;
const OVERSAMPLE_1X: u8 = 0x01;
const OVERSAMPLE_8X: u8 = 0x04;
const MODE_NORMAL: u8 = 0x03;
const CTRL_MEAS: u8 = (OVERSAMPLE_1X << 5) | (OVERSAMPLE_8X << 2) | MODE_NORMAL;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Qmp6988Error<E> {
    I2c(E),
    ChipId(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Qmp6988Reading {
    pub temperature_c: f32,
    pub pressure_pa: f32,
}

impl Qmp6988Reading {
    pub fn pressure_hpa(&self) -> f32 {
        self.pressure_pa / 100.0
    }
}

/// OTP coefficients scaled to the fixed-point forms the compensation uses.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Calibration {
    a0: i64,
    a1: i64,
    a2: i64,
    b00: i64,
    bt1: i64,
    bt2: i64,
    bp1: i64,
    b11: i64,
    bp2: i64,
    b12: i64,
    b21: i64,
    bp3: i64,
}

fn sign_extend_20(raw: u32) -> i64 {
    (((raw << 12) as i32) >> 12) as i64
}

impl Calibration {
    pub fn from_otp(otp: &[u8; OTP_LEN]) -> Self {
        let word = |i: usize| i16::from_be_bytes([otp[i], otp[i + 1]]) as i64;
        let a0 = ((otp[18] as u32) << 12) | ((otp[19] as u32) << 4) | (otp[24] & 0x0F) as u32;
        let b00 = ((otp[0] as u32) << 12) | ((otp[1] as u32) << 4) | (otp[24] >> 4) as u32;

        Self {
            a0: sign_extend_20(a0),
            b00: sign_extend_20(b00),
            a1: 3_608 * word(20) - 1_731_677_965,
            a2: 16_889 * word(22) - 87_619_360,
            bt1: 2_982 * word(2) + 107_370_906,
            bt2: 329_854 * word(4) + 108_083_093,
            bp1: 19_923 * word(6) + 1_133_836_764,
            b11: 2_406 * word(8) + 118_215_883,
            bp2: 3_079 * word(10) - 181_579_595,
            b12: 6_846 * word(12) + 85_590_281,
            b21: 13_836 * word(14) + 79_333_336,
            bp3: 2_915 * word(16) + 157_155_561,
        }
    }

    /// Temperature in 1/256 degC from an offset-removed raw reading.
    pub fn temperature(&self, dt: i32) -> i16 {
        let dt = dt as i64;
        let wk1 = self.a1 * dt;
        let mut wk2 = (self.a2 * dt) >> 14;
        wk2 = (wk2 * dt) >> 10;
        wk2 = ((wk1 + wk2) / 32_767) >> 19;
        ((self.a0 + wk2) >> 4) as i16
    }

    /// Pressure in 1/16 Pa from an offset-removed raw reading and [`Self::temperature`].
    pub fn pressure(&self, dp: i32, tx: i16) -> i32 {
        let dp = dp as i64;
        let tx = tx as i64;

        let mut wk1 = self.bt1 * tx + ((self.bp1 * dp) >> 5);

        let mut wk3 = (((self.bt2 * tx) >> 1) * tx) >> 8;
        wk3 += (((self.b11 * tx) >> 4) * dp) >> 1;
        wk3 += (((self.bp2 * dp) >> 13) * dp) >> 1;
        wk1 += wk3 >> 14;

        let mut wk3 = ((((self.b12 * tx) * tx) >> 22) * dp) >> 1;
        wk3 += (((((self.b21 * tx) >> 6) * dp) >> 23) * dp) >> 1;
        wk3 += ((((self.bp3 * dp) >> 12) * dp) >> 23) * dp;
        wk1 += wk3 >> 15;

        wk1 /= 32_767;
        wk1 >>= 11;
        (wk1 + self.b00) as i32
    }

    pub fn compensate(&self, raw: RawSample) -> Qmp6988Reading {
        let tx = self.temperature(raw.temperature);
        let px = self.pressure(raw.pressure, tx);
        Qmp6988Reading {
            temperature_c: tx as f32 / 256.0,
            pressure_pa: px as f32 / 16.0,
        }
    }
}

/// Offset-removed 24-bit ADC values.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RawSample {
    pub pressure: i32,
    pub temperature: i32,
}

impl RawSample {
    /// Decodes the `P[23:0] T[23:0]` data block starting at 0xF7.
    pub fn from_data(data: &[u8; 6]) -> Self {
        let u24 = |b: &[u8]| ((b[0] as i32) << 16) | ((b[1] as i32) << 8) | b[2] as i32;
        Self {
            pressure: u24(&data[..3]) - RAW_OFFSET,
            temperature: u24(&data[3..]) - RAW_OFFSET,
        }
    }
}

#[derive(Debug)]
pub struct Qmp6988<I2C> {
    i2c: I2C,
    address: u8,
    calibration: Calibration,
}

impl<I2C> Qmp6988<I2C>
where
    I2C: I2c,
{
    /// Probes the chip, resets it, loads OTP and starts continuous conversion.
    pub fn init<D>(mut i2c: I2C, delay: &mut D) -> Result<Self, Qmp6988Error<I2C::Error>>
    where
        D: DelayNs,
    {
        let address = QMP6988_ADDRESS;
        let mut id = [0u8];
        i2c.write_read(address, &[REG_CHIP_ID], &mut id)
            .map_err(Qmp6988Error::I2c)?;
        if id[0] != CHIP_ID {
            return Err(Qmp6988Error::ChipId(id[0]));
        }

        i2c.write(address, &[REG_RESET, RESET_COMMAND])
            .map_err(Qmp6988Error::I2c)?;
        delay.delay_ms(RESET_WAIT_MS);
        i2c.write(address, &[REG_RESET, 0x00])
            .map_err(Qmp6988Error::I2c)?;

        let mut otp = [0u8; OTP_LEN];
        i2c.write_read(address, &[REG_OTP], &mut otp)
            .map_err(Qmp6988Error::I2c)?;
        let calibration = Calibration::from_otp(&otp);
        debug!("qmp6988: calibration {:?}", calibration);

        i2c.write(address, &[REG_IIR, IIR_COEFF_4])
            .map_err(Qmp6988Error::I2c)?;
        i2c.write(address, &[REG_CTRL_MEAS, CTRL_MEAS])
            .map_err(Qmp6988Error::I2c)?;

        Ok(Self {
            i2c,
            address,
            calibration,
        })
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Latest conversion result.
    pub fn measure(&mut self) -> Result<Qmp6988Reading, Qmp6988Error<I2C::Error>> {
        let mut data = [0u8; 6];
        self.i2c
            .write_read(self.address, &[REG_DATA], &mut data)
            .map_err(Qmp6988Error::I2c)?;
        Ok(self.calibration.compensate(RawSample::from_data(&data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingDelay, ScriptedI2c};

    const OTP: [u8; OTP_LEN] = [
        0x2B, 0x3C, 0xF0, 0x12, 0x05, 0xA1, 0xE8, 0x33, 0x0A, 0x5C, 0xF6, 0x10, 0x01, 0x22, 0x02,
        0x0B, 0xFF, 0x71, 0x19, 0x00, 0xFD, 0x40, 0xF9, 0x8C, 0x20,
    ];

    // P raw 0xAD6AD7, T raw 0x800000 (zero after offset).
    const SEA_LEVEL_AT_25C: [u8; 6] = [0xAD, 0x6A, 0xD7, 0x80, 0x00, 0x00];

    #[test]
    fn otp_fields_are_sign_extended_and_scaled() {
        let cal = Calibration::from_otp(&OTP);
        assert_eq!(cal.a0, 102_400);
        assert_eq!(cal.b00, 177_090);
        assert_eq!(cal.a1, -1_734_217_997);
        assert_eq!(cal.bt2, 583_402_707);
        assert_eq!(cal.bp2, -189_412_571);

        let mut negative = OTP;
        negative[18] = 0xF0;
        assert!(Calibration::from_otp(&negative).a0 < 0);
    }

    #[test]
    fn temperature_compensation() {
        let cal = Calibration::from_otp(&OTP);
        assert_eq!(cal.temperature(0), 6_400);
        assert_eq!(cal.temperature(500_000), 3_239);
        assert_eq!(cal.temperature(-800_000), 11_431);
        assert_eq!(cal.temperature(-300_000), 8_290);
    }

    #[test]
    fn pressure_compensation() {
        let cal = Calibration::from_otp(&OTP);
        assert_eq!(cal.pressure(0, 6_400), 186_212);
        assert_eq!(cal.pressure(2_976_471, 6_400), 1_621_200);
        assert_eq!(cal.pressure(2_976_471, 8_290), 1_644_838);
        assert_eq!(cal.pressure(-1_000_000, 3_239), -313_766);
    }

    #[test]
    fn temperature_terms_alone_at_zero_pressure_delta() {
        let cal = Calibration::from_otp(&OTP);
        assert_eq!(cal.pressure(0, 0), 177_090);
        assert_eq!(cal.pressure(0, 8_290), 188_922);
        assert_eq!(cal.pressure(0, -2_560), 173_464);
    }

    #[test]
    fn raw_block_removes_offset() {
        let raw = RawSample::from_data(&[0x7B, 0x6C, 0x20, 0x80, 0x00, 0x01]);
        assert_eq!(raw.pressure, -300_000);
        assert_eq!(raw.temperature, 1);
    }

    #[test]
    fn init_and_measure() {
        let mut i2c = ScriptedI2c::default();
        i2c.queue(&[CHIP_ID]);
        i2c.queue(&OTP);
        i2c.queue(&SEA_LEVEL_AT_25C);

        let mut delay = CountingDelay::default();
        let mut sensor = Qmp6988::init(i2c, &mut delay).unwrap();
        let reading = sensor.measure().unwrap();
        assert_eq!(reading.temperature_c, 25.0);
        assert_eq!(reading.pressure_pa, 101_325.0);
        assert_eq!(reading.pressure_hpa(), 1_013.25);

        let i2c = sensor.release();
        assert_eq!(
            i2c.register_writes(),
            std::vec![
                (REG_RESET, RESET_COMMAND),
                (REG_RESET, 0x00),
                (REG_IIR, IIR_COEFF_4),
                (REG_CTRL_MEAS, 0x33),
            ]
        );
    }

    #[test]
    fn wrong_chip_is_rejected() {
        let i2c = ScriptedI2c::with_reads([std::vec![0x58]]);
        let mut delay = CountingDelay::default();
        assert_eq!(
            Qmp6988::init(i2c, &mut delay).map(|_| ()),
            Err(Qmp6988Error::ChipId(0x58))
        );
    }
}
