//! AXP192 power management as wired on the M5Stack Core2.
//!
//! DCDC1 feeds the ESP32, DCDC3 the LCD backlight, LDO2 the LCD logic and
//! LDO3 the vibration motor. GPIO4 drives the LCD reset line.

use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::info;

pub const AXP192_ADDRESS: u8 = 0x34;

const REG_OUTPUT_ENABLE: u8 = 0x12;
const REG_DCDC1_VOLTAGE: u8 = 0x26;
const REG_DCDC3_VOLTAGE: u8 = 0x27;
const REG_LDO23_VOLTAGE: u8 = 0x28;
const REG_VBUS_IPSOUT: u8 = 0x30;
const REG_BACKUP_CHARGE: u8 = 0x35;
const REG_PEK: u8 = 0x36;
const REG_BAT_VOLTAGE_H: u8 = 0x78;
const REG_ADC_ENABLE: u8 = 0x82;
const REG_GPIO0_CONTROL: u8 = 0x90;
const REG_GPIO0_LDO: u8 = 0x91;
const REG_GPIO1_CONTROL: u8 = 0x92;
const REG_GPIO2_CONTROL: u8 = 0x93;
const REG_GPIO34_CONTROL: u8 = 0x95;
const REG_GPIO34_LEVEL: u8 = 0x96;

const ENABLE_DCDC3: u8 = 1 << 1;
const ENABLE_LDO2: u8 = 1 << 2;
const ENABLE_LDO3: u8 = 1 << 3;
const ENABLE_EXTEN: u8 = 1 << 6;
const GPIO4_LCD_RESET: u8 = 1 << 1;

const LCD_RESET_HOLD_MS: u32 = 100;

/// Rail voltages applied by [`Axp192::init_core2`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PowerConfig {
    pub esp_mv: u16,
    pub backlight_mv: u16,
    pub lcd_logic_mv: u16,
    pub vibration_mv: u16,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            esp_mv: 3_350,
            backlight_mv: 2_800,
            lcd_logic_mv: 3_300,
            vibration_mv: 2_000,
        }
    }
}

impl PowerConfig {
    pub const fn with_backlight_mv(mut self, backlight_mv: u16) -> Self {
        self.backlight_mv = backlight_mv;
        self
    }
}

/// DCDC register value: 700..=3500 mV in 25 mV steps.
pub fn dcdc_code(millivolts: u16) -> u8 {
    (millivolts.clamp(700, 3_500).saturating_sub(700) / 25) as u8
}

/// LDO nibble value: 1800..=3300 mV in 100 mV steps.
pub fn ldo_code(millivolts: u16) -> u8 {
    (millivolts.clamp(1_800, 3_300).saturating_sub(1_800) / 100) as u8
}

#[derive(Debug)]
pub struct Axp192<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Axp192<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: AXP192_ADDRESS,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Core2 power-on: rails, ADCs, 5 V bus output, then an LCD reset pulse.
    pub fn init_core2<D>(&mut self, config: PowerConfig, delay: &mut D) -> Result<(), I2C::Error>
    where
        D: DelayNs,
    {
        self.update(REG_VBUS_IPSOUT, |v| (v & 0x04) | 0x02)?;
        // GPIO1 and GPIO2 as open-drain outputs.
        self.update(REG_GPIO1_CONTROL, |v| v & 0xF8)?;
        self.update(REG_GPIO2_CONTROL, |v| v & 0xF8)?;
        self.update(REG_BACKUP_CHARGE, |v| (v & 0x1C) | 0xA2)?;

        self.write(REG_DCDC1_VOLTAGE, dcdc_code(config.esp_mv))?;
        self.set_backlight_mv(config.backlight_mv)?;
        self.set_ldo23_mv(config.lcd_logic_mv, config.vibration_mv)?;
        self.update(REG_OUTPUT_ENABLE, |v| {
            (v | ENABLE_DCDC3 | ENABLE_LDO2) & !ENABLE_LDO3
        })?;

        // GPIO4 as NMOS open-drain output for the LCD reset line.
        self.update(REG_GPIO34_CONTROL, |v| (v & 0x72) | 0x84)?;
        self.write(REG_PEK, 0x4C)?;
        self.write(REG_ADC_ENABLE, 0xFF)?;

        self.reset_lcd(delay)?;
        self.enable_bus_output()?;

        info!(
            "axp192: rails up (backlight {} mV, lcd {} mV)",
            config.backlight_mv, config.lcd_logic_mv
        );
        Ok(())
    }

    pub fn set_backlight_mv(&mut self, millivolts: u16) -> Result<(), I2C::Error> {
        self.update(REG_DCDC3_VOLTAGE, |v| (v & 0x80) | (dcdc_code(millivolts) & 0x7F))
    }

    /// Pulses the LCD reset line low for [`LCD_RESET_HOLD_MS`].
    pub fn reset_lcd<D>(&mut self, delay: &mut D) -> Result<(), I2C::Error>
    where
        D: DelayNs,
    {
        self.update(REG_GPIO34_LEVEL, |v| v & !GPIO4_LCD_RESET)?;
        delay.delay_ms(LCD_RESET_HOLD_MS);
        self.update(REG_GPIO34_LEVEL, |v| v | GPIO4_LCD_RESET)?;
        delay.delay_ms(LCD_RESET_HOLD_MS);
        Ok(())
    }

    /// Battery voltage in millivolts (12-bit ADC, 1.1 mV per count).
    pub fn battery_mv(&mut self) -> Result<u16, I2C::Error> {
        let mut raw = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_BAT_VOLTAGE_H], &mut raw)?;
        let counts = ((raw[0] as u32) << 4) | (raw[1] as u32 & 0x0F);
        Ok((counts * 11 / 10) as u16)
    }

    fn set_ldo23_mv(&mut self, ldo2_mv: u16, ldo3_mv: u16) -> Result<(), I2C::Error> {
        self.write(
            REG_LDO23_VOLTAGE,
            (ldo_code(ldo2_mv) << 4) | ldo_code(ldo3_mv),
        )
    }

    fn enable_bus_output(&mut self) -> Result<(), I2C::Error> {
        // GPIO0 as LDO at 3.3 V, then EXTEN for the 5 V boost.
        self.update(REG_GPIO0_LDO, |v| (v & 0x0F) | 0xF0)?;
        self.update(REG_GPIO0_CONTROL, |v| (v & 0xF8) | 0x02)?;
        self.update(REG_OUTPUT_ENABLE, |v| v | ENABLE_EXTEN)
    }

    fn read(&mut self, register: u8) -> Result<u8, I2C::Error> {
        let mut value = [0u8];
        self.i2c
            .write_read(self.address, &[register], &mut value)?;
        Ok(value[0])
    }

    fn write(&mut self, register: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[register, value])
    }

    fn update(&mut self, register: u8, f: impl FnOnce(u8) -> u8) -> Result<(), I2C::Error> {
        let value = self.read(register)?;
        self.write(register, f(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CountingDelay, ScriptedI2c};

    #[test]
    fn voltage_codes() {
        assert_eq!(dcdc_code(3_350), 106);
        assert_eq!(dcdc_code(2_800), 84);
        assert_eq!(dcdc_code(100), 0);
        assert_eq!(dcdc_code(9_000), 112);
        assert_eq!(ldo_code(3_300), 15);
        assert_eq!(ldo_code(2_000), 2);
        assert_eq!(ldo_code(0), 0);
    }

    #[test]
    fn lcd_reset_pulses_gpio4_low_then_high() {
        let i2c = ScriptedI2c::with_reads([vec![0x07], vec![0x05]]);
        let mut axp = Axp192::new(i2c);
        let mut delay = CountingDelay::default();
        axp.reset_lcd(&mut delay).unwrap();

        let i2c = axp.release();
        assert_eq!(
            i2c.register_writes(),
            vec![(REG_GPIO34_LEVEL, 0x05), (REG_GPIO34_LEVEL, 0x07)]
        );
        assert_eq!(delay.total_ns, 200_000_000);
    }

    #[test]
    fn init_sets_rails_and_resets_panel() {
        // Every read-modify-write sees 0x00.
        let i2c = ScriptedI2c::with_reads(core::iter::repeat_n(vec![0x00], 12));
        let mut axp = Axp192::new(i2c);
        let mut delay = CountingDelay::default();
        axp.init_core2(PowerConfig::default(), &mut delay).unwrap();

        let i2c = axp.release();
        assert!(i2c.reads.is_empty());
        assert!(i2c.writes.iter().all(|(addr, _)| *addr == AXP192_ADDRESS));

        let writes = i2c.register_writes();
        assert!(writes.contains(&(REG_DCDC1_VOLTAGE, 106)));
        assert!(writes.contains(&(REG_DCDC3_VOLTAGE, 84)));
        assert!(writes.contains(&(REG_LDO23_VOLTAGE, 0xF2)));
        assert!(writes.contains(&(REG_OUTPUT_ENABLE, ENABLE_DCDC3 | ENABLE_LDO2)));
        assert!(writes.contains(&(REG_GPIO34_CONTROL, 0x84)));
        assert!(writes.contains(&(REG_ADC_ENABLE, 0xFF)));

        let resets: Vec<_> = writes
            .iter()
            .filter(|(reg, _)| *reg == REG_GPIO34_LEVEL)
            .map(|(_, value)| *value)
            .collect();
        assert_eq!(resets, [0x00, GPIO4_LCD_RESET]);
        assert_eq!(writes.last(), Some(&(REG_OUTPUT_ENABLE, ENABLE_EXTEN)));
    }

    #[test]
    fn backlight_keeps_the_top_bit() {
        let i2c = ScriptedI2c::with_reads([vec![0x80]]);
        let mut axp = Axp192::new(i2c);
        axp.set_backlight_mv(3_000).unwrap();
        assert_eq!(axp.release().register_writes(), vec![(REG_DCDC3_VOLTAGE, 0x80 | 92)]);
    }

    #[test]
    fn battery_voltage_scales_adc_counts() {
        // 0xE10 = 3600 counts.
        let i2c = ScriptedI2c::with_reads([vec![0xE1, 0x00]]);
        let mut axp = Axp192::new(i2c);
        assert_eq!(axp.battery_mv().unwrap(), 3_960);
    }
}
