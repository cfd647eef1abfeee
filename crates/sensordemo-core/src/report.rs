//! Periodic sample reports and the indicator window that follows each send.

use core::fmt::{self, Write};

use crate::nmea::GpsFix;

pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_SENDING_FLASH_MS: u64 = 500;

/// One set of readings handed to the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleReport {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub pressure_hpa: Option<f32>,
    pub rotary: i32,
    pub gps: Option<GpsFix>,
}

impl SampleReport {
    /// Writes the report as a flat JSON object; absent readings are omitted.
    pub fn write_json<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_char('{')?;
        let mut first = true;

        if let Some(value) = self.temperature_c.filter(|v| v.is_finite()) {
            write_field(out, &mut first, "temperature", format_args!("{:.2}", value))?;
        }
        if let Some(value) = self.humidity_pct.filter(|v| v.is_finite()) {
            write_field(out, &mut first, "humidity", format_args!("{:.1}", value))?;
        }
        if let Some(value) = self.pressure_hpa.filter(|v| v.is_finite()) {
            write_field(out, &mut first, "pressure", format_args!("{:.1}", value))?;
        }
        write_field(out, &mut first, "rotary", format_args!("{}", self.rotary))?;
        if let Some(fix) = self.gps {
            write_field(out, &mut first, "lat", format_args!("{:.6}", fix.latitude))?;
            write_field(out, &mut first, "lon", format_args!("{:.6}", fix.longitude))?;
        }

        out.write_char('}')
    }
}

fn write_field<W: Write>(
    out: &mut W,
    first: &mut bool,
    name: &str,
    value: fmt::Arguments<'_>,
) -> fmt::Result {
    if !*first {
        out.write_char(',')?;
    }
    *first = false;
    write!(out, "\"{}\":{}", name, value)
}

/// Destination of sample reports (MQTT client, serial log, ...).
pub trait ReportSink {
    type Error;

    fn send(&mut self, report: &SampleReport) -> Result<(), Self::Error>;
}

/// When to send the next report and whether the sending dot is lit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportSchedule {
    interval_ms: u64,
    flash_ms: u64,
    last_attempt_ms: Option<u64>,
    flash_until_ms: u64,
}

impl Default for ReportSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_INTERVAL_MS, DEFAULT_SENDING_FLASH_MS)
    }
}

impl ReportSchedule {
    pub const fn new(interval_ms: u64, flash_ms: u64) -> Self {
        Self {
            interval_ms,
            flash_ms,
            last_attempt_ms: None,
            flash_until_ms: 0,
        }
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// First report is due immediately, later ones one interval after the
    /// previous attempt.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_attempt_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    pub fn mark_sent(&mut self, now_ms: u64) {
        self.last_attempt_ms = Some(now_ms);
        self.flash_until_ms = now_ms.saturating_add(self.flash_ms);
    }

    /// A failed send waits a full interval but does not light the dot.
    pub fn mark_failed(&mut self, now_ms: u64) {
        self.last_attempt_ms = Some(now_ms);
    }

    pub fn sending_visible(&self, now_ms: u64) -> bool {
        now_ms < self.flash_until_ms
    }

    /// Sends through `sink` when due and updates the schedule.
    ///
    /// Returns `Ok(true)` when a report went out, `Ok(false)` when nothing
    /// was due.
    pub fn poll<S: ReportSink>(
        &mut self,
        now_ms: u64,
        sink: &mut S,
        report: &SampleReport,
    ) -> Result<bool, S::Error> {
        if !self.is_due(now_ms) {
            return Ok(false);
        }

        match sink.send(report) {
            Ok(()) => {
                self.mark_sent(now_ms);
                Ok(true)
            }
            Err(err) => {
                self.mark_failed(now_ms);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSink {
        sent: usize,
        fail: bool,
    }

    impl ReportSink for CountingSink {
        type Error = ();

        fn send(&mut self, _report: &SampleReport) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.sent += 1;
            Ok(())
        }
    }

    #[test]
    fn first_report_is_due_immediately_then_every_interval() {
        let mut schedule = ReportSchedule::new(1_000, 200);
        let mut sink = CountingSink {
            sent: 0,
            fail: false,
        };
        let report = SampleReport::default();

        assert_eq!(schedule.poll(5, &mut sink, &report), Ok(true));
        assert_eq!(schedule.poll(500, &mut sink, &report), Ok(false));
        assert_eq!(schedule.poll(1_004, &mut sink, &report), Ok(false));
        assert_eq!(schedule.poll(1_005, &mut sink, &report), Ok(true));
        assert_eq!(sink.sent, 2);
    }

    #[test]
    fn sending_dot_lights_for_flash_window_only() {
        let mut schedule = ReportSchedule::new(1_000, 200);
        assert!(!schedule.sending_visible(0));

        schedule.mark_sent(100);
        assert!(schedule.sending_visible(100));
        assert!(schedule.sending_visible(299));
        assert!(!schedule.sending_visible(300));
    }

    #[test]
    fn failed_send_backs_off_without_flash() {
        let mut schedule = ReportSchedule::new(1_000, 200);
        let mut sink = CountingSink {
            sent: 0,
            fail: true,
        };

        assert_eq!(
            schedule.poll(0, &mut sink, &SampleReport::default()),
            Err(())
        );
        assert!(!schedule.sending_visible(0));
        assert!(!schedule.is_due(999));
        assert!(schedule.is_due(1_000));
    }

    #[test]
    fn json_skips_missing_and_non_finite_readings() {
        let report = SampleReport {
            temperature_c: Some(21.5),
            humidity_pct: Some(f32::NAN),
            pressure_hpa: None,
            rotary: -3,
            gps: None,
        };

        let mut out = std::string::String::new();
        report.write_json(&mut out).unwrap();
        assert_eq!(out, r#"{"temperature":21.50,"rotary":-3}"#);
    }

    #[test]
    fn json_includes_gps_position() {
        let report = SampleReport {
            rotary: 0,
            gps: Some(GpsFix {
                latitude: 48.5,
                longitude: -11.25,
                satellites: 7,
            }),
            ..SampleReport::default()
        };

        let mut out = std::string::String::new();
        report.write_json(&mut out).unwrap();
        assert_eq!(out, r#"{"rotary":0,"lat":48.500000,"lon":-11.250000}"#);
    }
}
