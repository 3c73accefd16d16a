//! Onset artifact writer and reader
//!
//! The onset artifact is the delimited text file the statistics engine reads
//! condition onsets from:
//!
//! ```text
//! Conditions;Onsets;Durations
//! go_toolate;12.345;0.0
//! go_wrong;nan;nan
//! ```
//!
//! Absent values are written as `nan`. No escaping is performed, labels and
//! numbers never contain the delimiter.

use crate::types::{EventsError, OnsetEvent, Result};
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Column names of the onset artifact header
pub const ONSET_HEADER: [&str; 3] = ["Conditions", "Onsets", "Durations"];

/// Token written for absent onsets and durations
pub const ABSENT_TOKEN: &str = "nan";

/// Writes onset events as delimited text
#[derive(Debug, Clone, Copy)]
pub struct OnsetWriter {
    delimiter: char,
}

impl OnsetWriter {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Write the header and one row per event to `path`
    pub fn write_file(&self, path: &Path, events: &[OnsetEvent]) -> Result<()> {
        log::info!("Writing {} onset rows to {:?}", events.len(), path);
        self.write_to(File::create(path)?, events)
    }

    pub fn write_to<W: Write>(&self, writer: W, events: &[OnsetEvent]) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter_byte(self.delimiter)?)
            .quote_style(QuoteStyle::Never)
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(ONSET_HEADER)?;
        for event in events {
            writer.write_record([
                event.condition.as_str(),
                format_seconds(event.onset).as_str(),
                format_seconds(event.duration).as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Default for OnsetWriter {
    fn default() -> Self {
        Self::new(';')
    }
}

/// Reads an onset artifact back into events
#[derive(Debug, Clone, Copy)]
pub struct OnsetReader {
    delimiter: char,
}

impl OnsetReader {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn read_file(&self, path: &Path) -> Result<Vec<OnsetEvent>> {
        self.read_from(File::open(path)?)
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<Vec<OnsetEvent>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter_byte(self.delimiter)?)
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let header = reader.headers()?;
        if !header.iter().eq(ONSET_HEADER) {
            return Err(EventsError::OnsetParseError(format!(
                "unexpected header '{}'",
                header
                    .iter()
                    .collect::<Vec<_>>()
                    .join(&self.delimiter.to_string())
            )));
        }

        let mut events = Vec::new();
        for record in reader.records() {
            let record = record?;
            let row = record.position().map_or(0, |p| p.line());
            if record.len() != ONSET_HEADER.len() {
                return Err(EventsError::OnsetParseError(format!(
                    "row {} has {} fields, expected {}",
                    row,
                    record.len(),
                    ONSET_HEADER.len()
                )));
            }

            events.push(OnsetEvent {
                condition: record[0].to_string(),
                onset: parse_seconds(&record[1], row)?,
                duration: parse_seconds(&record[2], row)?,
            });
        }
        Ok(events)
    }
}

impl Default for OnsetReader {
    fn default() -> Self {
        Self::new(';')
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(EventsError::InvalidDelimiter(delimiter))
}

/// Format a time in seconds, keeping a decimal point on integral values
pub fn format_seconds(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
        Some(v) if v.is_finite() => format!("{}", v),
        _ => ABSENT_TOKEN.to_string(),
    }
}

fn parse_seconds(raw: &str, row: u64) -> Result<Option<f64>> {
    if raw.eq_ignore_ascii_case(ABSENT_TOKEN) || raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|e| {
        EventsError::OnsetParseError(format!("row {}: invalid time '{}': {}", row, raw, e))
    })
}
