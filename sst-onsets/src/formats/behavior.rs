//! Behavioural log parser
//!
//! Parses the tab-delimited trial logs written by the stop-signal task.
//!
//! ## Layout
//! - Line 1: free-text title (ignored)
//! - Line 2: column headers
//! - Line 3+: one trial per line, usually terminated by a trailing tab
//!
//! Numeric fields may be wrapped in double quotes. `float` columns are logged in
//! milliseconds and converted to seconds on load. Empty fields become
//! [`FieldValue::Absent`], never zero.
//!
//! ## Restarts
//! When the task software or the scanner trigger box restarts mid-session the
//! trial start time jumps backwards. Only the trials after the last such jump
//! belong to the acquired run, so everything before it is discarded.

use crate::config::SessionConfig;
use crate::types::{ColumnType, EventsError, FieldValue, RawEventRecord, Result};
use std::path::Path;

/// Output of a successful parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    /// Normalized column headers, in file order
    pub headers: Vec<String>,
    /// Trial records after restart repair, in file order
    pub records: Vec<RawEventRecord>,
    /// Data lines rejected by the minimum-length heuristic
    pub skipped_lines: usize,
    /// Number of backwards jumps of the trial start time
    pub restarts: usize,
}

/// Parser for behavioural trial logs
pub struct EventLogParser<'a> {
    config: &'a SessionConfig,
}

impl<'a> EventLogParser<'a> {
    pub fn new(config: &'a SessionConfig) -> Self {
        Self { config }
    }

    /// Read and parse a behavioural log file
    pub fn parse_file(&self, path: &Path) -> Result<ParsedLog> {
        log::info!("Parsing behaviour file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let parsed = self.parse_str(&content)?;

        log::info!(
            "Behaviour file contains {} trials ({} corrupt lines skipped, {} restarts)",
            parsed.records.len(),
            parsed.skipped_lines,
            parsed.restarts
        );
        Ok(parsed)
    }

    /// Parse the full text of a behavioural log
    pub fn parse_str(&self, content: &str) -> Result<ParsedLog> {
        let mut lines = content.lines().enumerate();

        lines
            .next()
            .ok_or_else(|| EventsError::LogParseError("file is empty".to_string()))?;
        let (_, header_line) = lines
            .next()
            .ok_or_else(|| EventsError::LogParseError("missing header line".to_string()))?;

        let headers: Vec<String> = split_fields(header_line)
            .into_iter()
            .map(normalize_header)
            .collect();
        self.check_required_columns(&headers)?;

        let mut records = Vec::new();
        let mut skipped_lines = 0;

        for (index, line) in lines {
            let line_number = index + 1;
            let line = line.replace('"', "");

            if line.len() < self.config.min_line_length {
                log::debug!(
                    "Skipping line {} ({} chars, below {})",
                    line_number,
                    line.len(),
                    self.config.min_line_length
                );
                skipped_lines += 1;
                continue;
            }

            records.push(self.parse_record(&line, line_number, &headers)?);
        }

        let (records, restarts) = repair_restarts(records, &self.config.trial_start_column);

        Ok(ParsedLog {
            headers,
            records,
            skipped_lines,
            restarts,
        })
    }

    fn parse_record(
        &self,
        line: &str,
        line_number: usize,
        headers: &[String],
    ) -> Result<RawEventRecord> {
        let mut record = RawEventRecord::new(line_number);

        for ((raw, column_type), header) in split_fields(line)
            .into_iter()
            .zip(&self.config.column_types)
            .zip(headers)
        {
            let value = parse_field(raw, *column_type).map_err(|e| {
                EventsError::LogParseError(format!(
                    "line {}, column '{}': {}",
                    line_number, header, e
                ))
            })?;
            record.insert(header.as_str(), value);
        }

        Ok(record)
    }

    fn check_required_columns(&self, headers: &[String]) -> Result<()> {
        let typed = &headers[..headers.len().min(self.config.column_types.len())];
        for column in [
            &self.config.trial_start_column,
            &self.config.outcome_column,
            &self.config.onset_column,
        ] {
            if !typed.contains(column) {
                return Err(EventsError::LogParseError(format!(
                    "required column '{}' not found in header",
                    column
                )));
            }
        }
        Ok(())
    }
}

/// Normalize a raw header cell: trim, lower-case, spaces to underscores and
/// drop one trailing underscore
pub fn normalize_header(raw: &str) -> String {
    let head = raw.trim().to_lowercase().replace(' ', "_");
    match head.strip_suffix('_') {
        Some(stripped) => stripped.to_string(),
        None => head,
    }
}

/// Drop every record before the last backwards jump of `column`
///
/// Returns the surviving records and the number of jumps seen. Records whose
/// start time is absent are kept but do not take part in the comparison.
pub fn repair_restarts(
    mut records: Vec<RawEventRecord>,
    column: &str,
) -> (Vec<RawEventRecord>, usize) {
    let mut start = 0;
    let mut restarts = 0;
    let mut previous: Option<f64> = None;

    for (index, record) in records.iter().enumerate() {
        let Some(current) = record.get(column).as_f64() else {
            log::warn!("Trial on line {} has no start time", record.line);
            continue;
        };

        if previous.is_some_and(|prev| current < prev) {
            log::warn!(
                "Reset detected in stimuli at line {}: discarding {} earlier trials",
                record.line,
                index
            );
            start = index;
            restarts += 1;
        }
        previous = Some(current);
    }

    (records.split_off(start), restarts)
}

/// Split a line on tabs, dropping the empty cell left by a trailing tab
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

fn parse_field(raw: &str, column_type: ColumnType) -> std::result::Result<FieldValue, String> {
    if raw.is_empty() {
        return Ok(FieldValue::Absent);
    }

    match column_type {
        ColumnType::Float => {
            let cleaned = raw.replace('"', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(FieldValue::Absent);
            }
            cleaned
                .parse::<f64>()
                .map(|ms| FieldValue::Float(ms / 1000.0))
                .map_err(|e| format!("invalid number '{}': {}", raw, e))
        }
        ColumnType::Integer => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(FieldValue::Absent);
            }
            trimmed
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|e| format!("invalid integer '{}': {}", raw, e))
        }
        ColumnType::String => Ok(FieldValue::Text(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Trial\tTrial Category\tTrial Start Time (Onset)\tPre-determined/randomised onset\tGo Stimulus Presentation Time \tStimulus Presented\tDelay\tStop Stimulus Presentation Time \tResponse made by Subject\tAbsolute Response Time\tRelative Response Time\tResponse Outcome\tReal Jitter\tPre-determined Jitter\tSuccess Rate of Variable Delay Stop Trials\t";

    fn row(trial: i64, start_ms: i64, go_ms: &str, outcome: &str) -> String {
        format!(
            "{trial}\tGO\t{start_ms}\t0\t\"{go_ms}\"\tLEFT\t0\t0\tLEFT\t{start_ms}\t350\t{outcome}\t\"1250.0\"\t1200\t\"0.5\"\t"
        )
    }

    fn log_with(rows: &[String]) -> String {
        let mut content = format!("Stop Signal Task\n{HEADER}\n");
        for r in rows {
            content.push_str(r);
            content.push('\n');
        }
        content
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Trial Start Time (Onset)"), "trial_start_time_(onset)");
        assert_eq!(
            normalize_header("Go Stimulus Presentation Time "),
            "go_stimulus_presentation_time"
        );
        assert_eq!(normalize_header("  Response Outcome\r"), "response_outcome");
    }

    #[test]
    fn test_parse_converts_milliseconds_and_absent() {
        let config = SessionConfig::new();
        let content = log_with(&[row(1, 1000, "1500", "GO_SUCCESS"), row(2, 3000, "", "GO_TOO_LATE")]);

        let parsed = EventLogParser::new(&config).parse_str(&content).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.headers.len(), 15);
        let first = &parsed.records[0];
        assert_eq!(first.get("go_stimulus_presentation_time"), &FieldValue::Float(1.5));
        assert_eq!(first.get("trial_start_time_(onset)"), &FieldValue::Integer(1000));
        assert_eq!(first.get("response_outcome").as_str(), Some("GO_SUCCESS"));
        assert_eq!(first.line, 3);
        assert!(parsed.records[1].get("go_stimulus_presentation_time").is_absent());
    }

    #[test]
    fn test_short_lines_are_skipped() {
        let config = SessionConfig::new();
        let content = log_with(&[
            row(1, 1000, "1500", "GO_SUCCESS"),
            "1\tGO\t2000".to_string(),
            String::new(),
            row(2, 3000, "3500", "STOP_SUCCESS"),
        ]);

        let parsed = EventLogParser::new(&config).parse_str(&content).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.skipped_lines, 2);
    }

    #[test]
    fn test_restart_keeps_suffix_after_reset() {
        let config = SessionConfig::new();
        let rows: Vec<String> = [10, 20, 5, 15, 30]
            .iter()
            .enumerate()
            .map(|(i, start)| row(i as i64 + 1, *start, "100", "GO_SUCCESS"))
            .collect();

        let parsed = EventLogParser::new(&config).parse_str(&log_with(&rows)).unwrap();

        let starts: Vec<f64> = parsed
            .records
            .iter()
            .filter_map(|r| r.get("trial_start_time_(onset)").as_f64())
            .collect();
        assert_eq!(starts, vec![5.0, 15.0, 30.0]);
        assert_eq!(parsed.records[0].get("trial"), &FieldValue::Integer(3));
        assert_eq!(parsed.restarts, 1);
    }

    #[test]
    fn test_multiple_restarts_keep_last_suffix() {
        let records: Vec<RawEventRecord> = [10, 20, 5, 15, 2, 8]
            .iter()
            .enumerate()
            .map(|(i, start)| {
                RawEventRecord::new(i + 3).with_field("start", FieldValue::Integer(*start))
            })
            .collect();

        let (repaired, restarts) = repair_restarts(records, "start");
        assert_eq!(restarts, 2);
        assert_eq!(repaired.len(), 2);
        assert_eq!(repaired[0].get("start"), &FieldValue::Integer(2));
    }

    #[test]
    fn test_no_restart_keeps_everything() {
        let records: Vec<RawEventRecord> = [1, 1, 2, 3]
            .iter()
            .map(|start| RawEventRecord::new(0).with_field("start", FieldValue::Integer(*start)))
            .collect();

        let (repaired, restarts) = repair_restarts(records, "start");
        assert_eq!(restarts, 0);
        assert_eq!(repaired.len(), 4);
    }

    #[test]
    fn test_invalid_number_reports_line() {
        let config = SessionConfig::new();
        let content = log_with(&[row(1, 1000, "abc", "GO_SUCCESS")]);

        let err = EventLogParser::new(&config).parse_str(&content).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 3"), "{message}");
        assert!(message.contains("go_stimulus_presentation_time"), "{message}");
    }

    #[test]
    fn test_missing_required_column() {
        let config = SessionConfig::new().with_onset_column("stop_signal_delay");
        let content = log_with(&[row(1, 1000, "1500", "GO_SUCCESS")]);

        let err = EventLogParser::new(&config).parse_str(&content).unwrap_err();
        assert!(matches!(err, EventsError::LogParseError(_)));
    }

    #[test]
    fn test_missing_header_line() {
        let config = SessionConfig::new();
        assert!(EventLogParser::new(&config).parse_str("title only").is_err());
        assert!(EventLogParser::new(&config).parse_str("").is_err());
    }

    #[test]
    fn test_file_not_found_is_io_error() {
        let config = SessionConfig::new();
        let err = EventLogParser::new(&config)
            .parse_file(Path::new("nonexistent_behaviour.csv"))
            .unwrap_err();
        assert!(matches!(err, EventsError::IoError(_)));
    }
}
