//! Per-session pipeline
//!
//! This module provides the primary interface for the library. A
//! [`SessionProcessor`] holds the configuration and transcoding table and runs
//! one session from behavioural log to onset artifact and pruned contrasts.
//! Sessions share nothing, so independent processors (or one processor used
//! from several threads) can handle different sessions in parallel.

use crate::config::SessionConfig;
use crate::contrasts::{ContrastNode, ContrastPruner, ContrastSpecBuilder, ProtocolModel};
use crate::formats::{EventLogParser, OnsetWriter};
use crate::transcoding::{ConditionTranscoder, MissingSet, TranscodingTable};
use crate::types::{OnsetEvent, Result, Timepoint};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Everything a session hands to the statistics engine
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub timepoint: Timepoint,
    pub model: ProtocolModel,
    /// Path of the written onset artifact
    pub onset_file: PathBuf,
    /// Rows written to the onset artifact
    pub events: Vec<OnsetEvent>,
    /// Conditions of interest with no trials in this session
    pub missing: MissingSet,
    /// Contrasts that can be estimated for this session
    pub contrasts: Vec<ContrastNode>,
    /// Names of contrasts dropped because of missing conditions
    pub removed: BTreeSet<String>,
    pub stats: SessionStats,
}

/// Counters collected while processing a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Trial records left after restart repair
    pub trials: usize,
    /// Records matched by the transcoding table
    pub matched_trials: usize,
    pub skipped_lines: usize,
    pub restarts: usize,
    pub ambiguous_trials: usize,
}

/// Runs the parse, transcode, write, build and prune steps for a session
pub struct SessionProcessor {
    config: SessionConfig,
    table: TranscodingTable,
}

impl SessionProcessor {
    /// Create a processor using the stop-signal transcoding table
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            table: TranscodingTable::stop_signal(),
        }
    }

    /// Builder method: replace the transcoding table
    pub fn with_table(mut self, table: TranscodingTable) -> Self {
        self.table = table;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> &TranscodingTable {
        &self.table
    }

    /// Process one session, writing its onset artifact into `out_dir`
    ///
    /// # Example
    /// ```no_run
    /// use sst_onsets::{ProtocolModel, SessionConfig, SessionProcessor, Timepoint};
    /// use std::path::Path;
    ///
    /// let processor = SessionProcessor::new(SessionConfig::new());
    /// let outcome = processor
    ///     .process(
    ///         Path::new("ss_000001441076.csv"),
    ///         Timepoint::Baseline,
    ///         ProtocolModel::A,
    ///         Path::new("/tmp/000001441076"),
    ///     )
    ///     .unwrap();
    /// println!("{} contrasts to estimate", outcome.contrasts.len());
    /// ```
    pub fn process(
        &self,
        log_path: &Path,
        timepoint: Timepoint,
        model: ProtocolModel,
        out_dir: &Path,
    ) -> Result<SessionOutcome> {
        log::info!(
            "Processing {:?} (timepoint {}, model {})",
            log_path,
            timepoint,
            model
        );

        let parsed = EventLogParser::new(&self.config).parse_file(log_path)?;

        let transcoded = ConditionTranscoder::new(&self.table, model.conditions().iter().copied())
            .with_columns(&self.config.outcome_column, &self.config.onset_column)
            .transcode(&parsed.records, timepoint)?;

        if !transcoded.missing.is_empty() {
            log::warn!(
                "This session does not display these regressors: {:?}",
                transcoded.missing.iter().collect::<Vec<_>>()
            );
        }

        let onset_file = out_dir.join(&self.config.onset_file_name);
        OnsetWriter::new(self.config.delimiter).write_file(&onset_file, &transcoded.events)?;

        let contrasts = ContrastSpecBuilder::new(model).build()?;
        let pruned = ContrastPruner::new(&transcoded.missing).prune(&contrasts);

        Ok(SessionOutcome {
            timepoint,
            model,
            onset_file,
            events: transcoded.events,
            missing: transcoded.missing,
            contrasts: pruned.contrasts,
            removed: pruned.removed,
            stats: SessionStats {
                trials: parsed.records.len(),
                matched_trials: transcoded.matched_trials,
                skipped_lines: parsed.skipped_lines,
                restarts: parsed.restarts,
                ambiguous_trials: transcoded.ambiguous_trials,
            },
        })
    }
}

impl Default for SessionProcessor {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
