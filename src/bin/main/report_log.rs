use core::fmt;

use heapless::String;
use log::info;
use sensordemo_core::report::{ReportSink, SampleReport};

const REPORT_JSON_BYTES: usize = 192;

/// Writes each report as one JSON log line until an MQTT transport exists.
#[derive(Debug, Default)]
pub struct LogSink {
    sent: u32,
}

impl ReportSink for LogSink {
    type Error = fmt::Error;

    fn send(&mut self, report: &SampleReport) -> Result<(), Self::Error> {
        let mut json = String::<REPORT_JSON_BYTES>::new();
        report.write_json(&mut json)?;
        self.sent = self.sent.wrapping_add(1);
        info!("report #{}: {}", self.sent, json.as_str());
        Ok(())
    }
}
