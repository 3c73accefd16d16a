//! Session configuration types
//!
//! Describes the layout of the behavioural log and the format of the onset
//! artifact. Everything has a default matching the IMAGEN stop-signal task, so
//! most callers only override the delimiter or the line-length heuristic.

use crate::types::ColumnType;
use serde::{Deserialize, Serialize};

/// Configuration for one session's parse/transcode/write cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Positional type tags for the log's columns
    #[serde(default = "default_column_types")]
    pub column_types: Vec<ColumnType>,

    /// Data lines shorter than this are treated as corrupt and skipped
    #[serde(default = "default_min_line_length")]
    pub min_line_length: usize,

    /// Normalized header of the trial start time column (restart detection)
    #[serde(default = "default_trial_start_column")]
    pub trial_start_column: String,

    /// Normalized header of the response outcome code column
    #[serde(default = "default_outcome_column")]
    pub outcome_column: String,

    /// Normalized header of the column providing event onsets
    #[serde(default = "default_onset_column")]
    pub onset_column: String,

    /// Field delimiter of the onset artifact
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// File name of the onset artifact inside the output directory
    #[serde(default = "default_onset_file_name")]
    pub onset_file_name: String,
}

fn default_column_types() -> Vec<ColumnType> {
    use ColumnType::{Float, Integer, String};
    vec![
        Integer, // trial
        String,  // trial category
        Integer, // trial start time (onset)
        Integer, // pre-determined onset
        Float,   // go stimulus presentation time
        String,  // stimulus presented
        Integer, // delay
        Integer, // stop stimulus presentation time
        String,  // response made by subject
        Integer, // absolute response time
        Integer, // relative response time
        String,  // response outcome
        Float,   // real jitter
        Integer, // pre-determined jitter
        Float,   // success rate of variable delay stop trials
    ]
}

fn default_min_line_length() -> usize {
    50
}

fn default_trial_start_column() -> String {
    "trial_start_time_(onset)".to_string()
}

fn default_outcome_column() -> String {
    "response_outcome".to_string()
}

fn default_onset_column() -> String {
    "go_stimulus_presentation_time".to_string()
}

fn default_delimiter() -> char {
    ';'
}

fn default_onset_file_name() -> String {
    "onset.txt".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            column_types: default_column_types(),
            min_line_length: default_min_line_length(),
            trial_start_column: default_trial_start_column(),
            outcome_column: default_outcome_column(),
            onset_column: default_onset_column(),
            delimiter: default_delimiter(),
            onset_file_name: default_onset_file_name(),
        }
    }
}

impl SessionConfig {
    /// Create a new session configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the column type tags
    pub fn with_column_types(mut self, column_types: Vec<ColumnType>) -> Self {
        self.column_types = column_types;
        self
    }

    /// Builder method: set the corrupt-line threshold
    pub fn with_min_line_length(mut self, min_line_length: usize) -> Self {
        self.min_line_length = min_line_length;
        self
    }

    /// Builder method: set the onset artifact delimiter
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder method: set the column used as event onset
    pub fn with_onset_column(mut self, column: impl Into<String>) -> Self {
        self.onset_column = column.into();
        self
    }

    /// Builder method: set the onset artifact file name
    pub fn with_onset_file_name(mut self, name: impl Into<String>) -> Self {
        self.onset_file_name = name.into();
        self
    }
}
