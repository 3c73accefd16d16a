//! Transcoding table
//!
//! Immutable mapping from condition label to the raw response outcome codes the
//! task software writes for it. Built once and shared by reference.

use std::collections::{BTreeSet, HashMap};

/// Mapping from condition label to its set of raw outcome codes
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodingTable {
    /// Labels with their codes, in insertion order
    entries: Vec<(String, BTreeSet<String>)>,

    /// Reverse lookup
    /// Key: outcome code, Value: indices into `entries`
    code_lookup: HashMap<String, Vec<usize>>,
}

impl TranscodingTable {
    /// Build a table from `(label, codes)` pairs
    ///
    /// A label given more than once has its code sets merged.
    pub fn new<I, L, C, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, C)>,
        L: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            entries: Vec::new(),
            code_lookup: HashMap::new(),
        };

        for (label, codes) in entries {
            let label = label.into();
            let index = match table.entries.iter().position(|(l, _)| *l == label) {
                Some(index) => index,
                None => {
                    table.entries.push((label, BTreeSet::new()));
                    table.entries.len() - 1
                }
            };

            for code in codes {
                let code = code.into();
                if table.entries[index].1.insert(code.clone()) {
                    table.code_lookup.entry(code).or_default().push(index);
                }
            }
        }

        table
    }

    /// The stop-signal task table
    ///
    /// Too-early stop responses are scored as successful go trials.
    pub fn stop_signal() -> Self {
        Self::new([
            ("go_success", vec!["GO_SUCCESS", "STOP_TOO_EARLY_RESPONSE"]),
            ("go_toolate", vec!["GO_TOO_LATE"]),
            ("go_wrong", vec!["GO_WRONG_KEY_RESPONSE"]),
            ("stop_success", vec!["STOP_SUCCESS"]),
            ("stop_failure", vec!["STOP_FAILURE"]),
        ])
    }

    /// All labels, in table order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Codes mapped to a label
    pub fn codes(&self, label: &str) -> Option<&BTreeSet<String>> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, codes)| codes)
    }

    /// Labels whose code set contains `code`, in table order
    ///
    /// More than one label means the table is ill-formed for that code.
    pub fn labels_for(&self, code: &str) -> Vec<&str> {
        self.code_lookup
            .get(code)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&index| self.entries[index].0.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.codes(label).is_some()
    }

    /// Codes claimed by more than one label, sorted
    pub fn overlapping_codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self
            .code_lookup
            .iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(code, _)| code.as_str())
            .collect();
        codes.sort_unstable();
        codes
    }

    /// True if no code maps to more than one label
    pub fn is_disjoint(&self) -> bool {
        self.code_lookup.values().all(|indices| indices.len() <= 1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TranscodingTable {
    fn default() -> Self {
        Self::stop_signal()
    }
}
