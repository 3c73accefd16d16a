//! Core types for the stop-signal onset library
//!
//! This module defines the values the parser produces from a behavioural log,
//! the onset events handed to the writer, the timepoints a session can belong
//! to, and the error taxonomy shared by every stage.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, EventsError>;

/// Errors that can occur while processing a session
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    #[error("Failed to parse behavioural log: {0}")]
    LogParseError(String),

    #[error("{timepoint} behaviour file contains {count} trials, expected {expected}")]
    TrialCount {
        timepoint: Timepoint,
        count: usize,
        expected: String,
    },

    #[error("Timepoint {0} does not exist")]
    UnknownTimepoint(String),

    #[error("Unknown protocol model: {0}")]
    UnknownModel(String),

    #[error("Invalid contrast definition: {0}")]
    InvalidContrast(String),

    #[error("Failed to parse onset file: {0}")]
    OnsetParseError(String),

    #[error("Onset delimiter {0:?} is not a single ASCII character")]
    InvalidDelimiter(char),

    #[error("Delimited text error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EventsError {
    /// True for the fatal validation failures (trial-count band, unknown timepoint)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EventsError::TrialCount { .. } | EventsError::UnknownTimepoint(_)
        )
    }
}

/// Type tag for one column of the behavioural log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    /// Milliseconds in the log, seconds once loaded
    Float,
    String,
}

/// A single typed field from a behavioural log row
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    /// Seconds (already converted from the log's milliseconds)
    Float(f64),
    Text(String),
    /// The source field was empty
    Absent,
}

impl FieldValue {
    /// Numeric view of the field, `None` for text and absent values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) | FieldValue::Absent => None,
        }
    }

    /// Text view of the field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Absent => Ok(()),
        }
    }
}

/// One trial row from the behavioural log, keyed by normalized header name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEventRecord {
    /// 1-based line number in the source file
    pub line: usize,
    fields: HashMap<String, FieldValue>,
}

impl RawEventRecord {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: HashMap::new(),
        }
    }

    /// Builder method: set a field value
    pub fn with_field(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: FieldValue) {
        self.fields.insert(column.into(), value);
    }

    /// Look up a field; columns the row never had read as absent
    pub fn get(&self, column: &str) -> &FieldValue {
        self.fields.get(column).unwrap_or(&FieldValue::Absent)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A transcoded `(condition, onset, duration)` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnsetEvent {
    /// Condition label from the transcoding table
    pub condition: String,
    /// Onset in seconds, `None` when absent
    pub onset: Option<f64>,
    /// Duration in seconds, `None` when absent
    pub duration: Option<f64>,
}

impl OnsetEvent {
    /// A zero-duration event at the given onset
    pub fn new(condition: impl Into<String>, onset: Option<f64>) -> Self {
        Self {
            condition: condition.into(),
            onset,
            duration: Some(0.0),
        }
    }

    /// Placeholder row for a condition that never occurred in the session
    pub fn missing(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            onset: None,
            duration: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.onset.is_none() && self.duration.is_none()
    }
}

/// Study-protocol phase a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timepoint {
    /// Baseline
    #[serde(rename = "BL")]
    Baseline,
    /// Second follow-up
    #[serde(rename = "FU2")]
    FollowUp2,
}

impl Timepoint {
    /// Short label used on the command line and in file layouts
    pub fn label(&self) -> &'static str {
        match self {
            Timepoint::Baseline => "BL",
            Timepoint::FollowUp2 => "FU2",
        }
    }

    /// Expected trial-count band for sessions at this timepoint
    pub fn trial_band(&self) -> TrialCountBand {
        match self {
            Timepoint::Baseline => TrialCountBand {
                below: 480,
                above: None,
            },
            // FU2 sessions do not strictly follow the SOP. The band rejects only
            // counts that are both below 360 and above 370, so it never fires.
            Timepoint::FollowUp2 => TrialCountBand {
                below: 360,
                above: Some(370),
            },
        }
    }

    /// Check a matched-trial count against this timepoint's band
    pub fn validate_trial_count(&self, count: usize) -> Result<()> {
        let band = self.trial_band();
        if band.rejects(count) {
            return Err(EventsError::TrialCount {
                timepoint: *self,
                count,
                expected: band.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Timepoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Timepoint {
    type Err = EventsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BL" => Ok(Timepoint::Baseline),
            "FU2" => Ok(Timepoint::FollowUp2),
            other => Err(EventsError::UnknownTimepoint(other.to_string())),
        }
    }
}

/// Rejection rule for the number of matched trials in a session
///
/// A count is rejected when it is below `below` and, if `above` is set, also
/// greater than `above`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCountBand {
    pub below: usize,
    pub above: Option<usize>,
}

impl TrialCountBand {
    pub fn rejects(&self, count: usize) -> bool {
        match self.above {
            None => count < self.below,
            Some(above) => count < self.below && count > above,
        }
    }
}

impl fmt::Display for TrialCountBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.above {
            None => write!(f, "at least {}", self.below),
            Some(above) => write!(f, "about {}-{}", self.below, above),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timepoint_parsing() {
        assert_eq!("BL".parse::<Timepoint>().unwrap(), Timepoint::Baseline);
        assert_eq!("FU2".parse::<Timepoint>().unwrap(), Timepoint::FollowUp2);

        for bad in ["FU1", "bl", "", "FU3"] {
            let err = bad.parse::<Timepoint>().unwrap_err();
            assert!(err.is_validation(), "{bad:?} should be a validation error");
        }
    }

    #[test]
    fn test_baseline_band() {
        assert!(Timepoint::Baseline.validate_trial_count(480).is_ok());
        assert!(Timepoint::Baseline.validate_trial_count(512).is_ok());

        let err = Timepoint::Baseline.validate_trial_count(479).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("479"));
    }

    #[test]
    fn test_follow_up_band_never_rejects() {
        // Known defect: the FU2 band is unsatisfiable, so every count passes.
        // Pinned here so a fix shows up as a deliberate behaviour change.
        for count in [0, 1, 359, 360, 365, 370, 371, 10_000] {
            assert!(Timepoint::FollowUp2.validate_trial_count(count).is_ok());
        }
    }

    #[test]
    fn test_field_value_views() {
        assert_eq!(FieldValue::Integer(12).as_f64(), Some(12.0));
        assert_eq!(FieldValue::Float(0.25).as_f64(), Some(0.25));
        assert_eq!(FieldValue::Absent.as_f64(), None);
        assert_eq!(FieldValue::Text("GO_SUCCESS".into()).as_str(), Some("GO_SUCCESS"));
        assert!(FieldValue::Absent.is_absent());
    }

    #[test]
    fn test_record_missing_column_is_absent() {
        let record = RawEventRecord::new(3).with_field("trial", FieldValue::Integer(1));
        assert_eq!(record.get("trial"), &FieldValue::Integer(1));
        assert!(record.get("response_outcome").is_absent());
    }

    #[test]
    fn test_missing_event() {
        let event = OnsetEvent::missing("go_wrong");
        assert!(event.is_missing());
        assert!(!OnsetEvent::new("go_wrong", Some(1.5)).is_missing());
    }
}
