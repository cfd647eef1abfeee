//! Minimal NMEA 0183 reader for the GPS unit on UART2.
//!
//! Only GGA and RMC sentences carry a position; everything else is skipped.

use heapless::Vec;

/// NMEA caps sentences at 82 characters including `$` and CRLF.
pub const MAX_SENTENCE_BYTES: usize = 96;

/// A fix older than this no longer lights the GPS indicator.
pub const DEFAULT_FIX_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GpsFix {
    /// Degrees, north positive.
    pub latitude: f32,
    /// Degrees, east positive.
    pub longitude: f32,
    /// Satellites in use; RMC does not report it and leaves `0`.
    pub satellites: u8,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NmeaError {
    /// Missing `$`, `*` or two hex digits.
    Framing,
    Checksum { expected: u8, actual: u8 },
    /// A field the sentence type requires is missing or unparsable.
    Field,
    /// Well-formed sentence of a type without position data.
    Unsupported,
}

/// Parses one sentence without line terminator.
///
/// `Ok(None)` means a position sentence that reports no fix.
pub fn parse_sentence(line: &str) -> Result<Option<GpsFix>, NmeaError> {
    let body = line.strip_prefix('$').ok_or(NmeaError::Framing)?;
    let (payload, checksum) = body.rsplit_once('*').ok_or(NmeaError::Framing)?;
    if checksum.len() != 2 {
        return Err(NmeaError::Framing);
    }
    let expected = u8::from_str_radix(checksum, 16).map_err(|_| NmeaError::Framing)?;
    let actual = payload.bytes().fold(0u8, |acc, byte| acc ^ byte);
    if expected != actual {
        return Err(NmeaError::Checksum { expected, actual });
    }

    let mut fields = payload.split(',');
    let address = fields.next().ok_or(NmeaError::Framing)?;
    // Talker id (GP, GN, GL, ...) is ignored.
    let kind = address.get(2..).ok_or(NmeaError::Framing)?;

    match kind {
        "GGA" => parse_gga(fields),
        "RMC" => parse_rmc(fields),
        _ => Err(NmeaError::Unsupported),
    }
}

fn parse_gga<'a>(mut fields: impl Iterator<Item = &'a str>) -> Result<Option<GpsFix>, NmeaError> {
    let _time = fields.next();
    let lat = fields.next().ok_or(NmeaError::Field)?;
    let lat_hemisphere = fields.next().ok_or(NmeaError::Field)?;
    let lon = fields.next().ok_or(NmeaError::Field)?;
    let lon_hemisphere = fields.next().ok_or(NmeaError::Field)?;
    let quality = fields.next().ok_or(NmeaError::Field)?;
    let satellites = fields.next().ok_or(NmeaError::Field)?;

    if quality.is_empty() || quality == "0" {
        return Ok(None);
    }

    Ok(Some(GpsFix {
        latitude: coordinate(lat, lat_hemisphere, 'N', 'S')?,
        longitude: coordinate(lon, lon_hemisphere, 'E', 'W')?,
        satellites: satellites.parse().map_err(|_| NmeaError::Field)?,
    }))
}

fn parse_rmc<'a>(mut fields: impl Iterator<Item = &'a str>) -> Result<Option<GpsFix>, NmeaError> {
    let _time = fields.next();
    let status = fields.next().ok_or(NmeaError::Field)?;
    let lat = fields.next().ok_or(NmeaError::Field)?;
    let lat_hemisphere = fields.next().ok_or(NmeaError::Field)?;
    let lon = fields.next().ok_or(NmeaError::Field)?;
    let lon_hemisphere = fields.next().ok_or(NmeaError::Field)?;

    if status != "A" {
        return Ok(None);
    }

    Ok(Some(GpsFix {
        latitude: coordinate(lat, lat_hemisphere, 'N', 'S')?,
        longitude: coordinate(lon, lon_hemisphere, 'E', 'W')?,
        satellites: 0,
    }))
}

/// `ddmm.mmmm` / `dddmm.mmmm` plus hemisphere letter to signed degrees.
fn coordinate(
    value: &str,
    hemisphere: &str,
    positive: char,
    negative: char,
) -> Result<f32, NmeaError> {
    let dot = value.find('.').unwrap_or(value.len());
    if dot < 2 {
        return Err(NmeaError::Field);
    }
    let (degrees, minutes) = value.split_at(dot - 2);
    let degrees: f32 = if degrees.is_empty() {
        0.0
    } else {
        degrees.parse().map_err(|_| NmeaError::Field)?
    };
    let minutes: f32 = minutes.parse().map_err(|_| NmeaError::Field)?;
    let magnitude = degrees + minutes / 60.0;

    let mut letters = hemisphere.chars();
    match (letters.next(), letters.next()) {
        (Some(h), None) if h == positive => Ok(magnitude),
        (Some(h), None) if h == negative => Ok(-magnitude),
        _ => Err(NmeaError::Field),
    }
}

/// Byte-fed sentence assembler remembering the latest fix.
#[derive(Debug)]
pub struct GpsTracker {
    line: Vec<u8, MAX_SENTENCE_BYTES>,
    overflowed: bool,
    fix: Option<GpsFix>,
    fix_at_ms: u64,
    fix_timeout_ms: u64,
}

impl Default for GpsTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FIX_TIMEOUT_MS)
    }
}

impl GpsTracker {
    pub const fn new(fix_timeout_ms: u64) -> Self {
        Self {
            line: Vec::new(),
            overflowed: false,
            fix: None,
            fix_at_ms: 0,
            fix_timeout_ms,
        }
    }

    /// Feeds one received byte. Returns the parse outcome whenever a line ends.
    pub fn feed(&mut self, byte: u8, now_ms: u64) -> Option<Result<Option<GpsFix>, NmeaError>> {
        match byte {
            b'\r' => None,
            b'\n' => {
                let outcome = self.finish_line(now_ms);
                self.line.clear();
                self.overflowed = false;
                outcome
            }
            _ => {
                if self.line.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    fn finish_line(&mut self, now_ms: u64) -> Option<Result<Option<GpsFix>, NmeaError>> {
        if self.line.is_empty() {
            return None;
        }
        if self.overflowed {
            return Some(Err(NmeaError::Framing));
        }

        let outcome = core::str::from_utf8(&self.line)
            .map_err(|_| NmeaError::Framing)
            .and_then(parse_sentence);

        match outcome {
            Ok(Some(fix)) => {
                self.fix = Some(fix);
                self.fix_at_ms = now_ms;
            }
            Ok(None) => self.fix = None,
            Err(_) => {}
        }
        Some(outcome)
    }

    /// Latest fix if it is still fresh at `now_ms`.
    pub fn fix(&self, now_ms: u64) -> Option<GpsFix> {
        self.fix
            .filter(|_| now_ms.saturating_sub(self.fix_at_ms) <= self.fix_timeout_ms)
    }

    pub fn has_fix(&self, now_ms: u64) -> bool {
        self.fix(now_ms).is_some()
    }
}
