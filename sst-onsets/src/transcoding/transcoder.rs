//! Condition transcoder
//!
//! Turns parsed trial records into onset events: each record's outcome code is
//! looked up in the [`TranscodingTable`], every matching label yields one
//! zero-duration event at the record's onset, and the matched-trial count is
//! checked against the session's timepoint.
//!
//! Only the configured conditions of interest reach the output. Any of them
//! that never matched is reported as missing and gets a placeholder row so the
//! onset artifact always lists every condition of interest.

use crate::transcoding::table::TranscodingTable;
use crate::types::{OnsetEvent, RawEventRecord, Result, Timepoint};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Condition labels with zero matched trials in a session
///
/// Keeps insertion order and ignores duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissingSet {
    labels: Vec<String>,
}

impl MissingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label, returning false if it was already present
    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.labels.push(label);
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MissingSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for label in iter {
            set.insert(label);
        }
        set
    }
}

/// Result of transcoding one session
#[derive(Debug, Clone, PartialEq)]
pub struct Transcoded {
    /// Events for the conditions of interest, then one placeholder per missing condition
    pub events: Vec<OnsetEvent>,
    /// The configured conditions of interest
    pub conditions: Vec<String>,
    /// Conditions of interest that never matched
    pub missing: MissingSet,
    /// Records matched by any table label (the count that is validated)
    pub matched_trials: usize,
    /// Records whose outcome code matched more than one label
    pub ambiguous_trials: usize,
}

/// Maps raw outcome codes to condition labels
pub struct ConditionTranscoder<'a> {
    table: &'a TranscodingTable,
    conditions: Vec<String>,
    outcome_column: String,
    onset_column: String,
}

impl<'a> ConditionTranscoder<'a> {
    /// Create a transcoder keeping only `conditions` in its output
    pub fn new<I, S>(table: &'a TranscodingTable, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table,
            conditions: conditions.into_iter().map(Into::into).collect(),
            outcome_column: "response_outcome".to_string(),
            onset_column: "go_stimulus_presentation_time".to_string(),
        }
    }

    /// Builder method: set the outcome-code and onset column names
    pub fn with_columns(mut self, outcome: impl Into<String>, onset: impl Into<String>) -> Self {
        self.outcome_column = outcome.into();
        self.onset_column = onset.into();
        self
    }

    /// Transcode a session's records and validate its trial count
    pub fn transcode(&self, records: &[RawEventRecord], timepoint: Timepoint) -> Result<Transcoded> {
        let mut matched = Vec::new();
        let mut ambiguous_trials = 0;

        for record in records {
            let Some(code) = record.get(&self.outcome_column).as_str() else {
                continue;
            };

            let labels = self.table.labels_for(code.trim());
            if labels.len() > 1 {
                log::warn!(
                    "Outcome '{}' on line {} matches several conditions ({}); onsets will be duplicated",
                    code,
                    record.line,
                    labels.join(", ")
                );
                ambiguous_trials += 1;
            }

            let onset = record.get(&self.onset_column).as_f64();
            matched.extend(labels.into_iter().map(|label| OnsetEvent::new(label, onset)));
        }

        log::debug!("{} trials matched the transcoding table", matched.len());
        timepoint.validate_trial_count(matched.len())?;

        let matched_trials = matched.len();
        let seen: HashSet<&str> = matched.iter().map(|e| e.condition.as_str()).collect();

        let mut missing = MissingSet::new();
        for condition in &self.conditions {
            if !self.table.contains_label(condition) {
                log::warn!("Condition '{}' is not in the transcoding table", condition);
            }
            if !seen.contains(condition.as_str()) {
                missing.insert(condition.as_str());
            }
        }

        let mut events: Vec<OnsetEvent> = matched
            .into_iter()
            .filter(|e| self.conditions.contains(&e.condition))
            .collect();
        events.extend(missing.iter().map(|label| OnsetEvent::missing(label)));

        Ok(Transcoded {
            events,
            conditions: self.conditions.clone(),
            missing,
            matched_trials,
            ambiguous_trials,
        })
    }
}
