//! Estimator hand-off and session summaries
//!
//! Writes the pruned contrast tree as `contrasts.json` next to the onset
//! artifact, with enough metadata to trace it back to its session.

use anyhow::{Context, Result};
use serde::Serialize;
use sst_onsets::{ContrastNode, MissingSet, ProtocolModel, SessionOutcome, Timepoint};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the contrast hand-off inside the session directory
pub const CONTRASTS_FILE_NAME: &str = "contrasts.json";

/// JSON document handed to the statistics engine
#[derive(Debug, Serialize)]
pub struct ContrastReport<'a> {
    pub generated_at: String,
    pub generator: String,
    pub sid: Option<&'a str>,
    pub timepoint: Timepoint,
    pub model: ProtocolModel,
    pub onset_file: &'a Path,
    pub condition_name: &'static str,
    pub onset_name: &'static str,
    pub duration_name: &'static str,
    pub delimiter: char,
    pub missing: &'a MissingSet,
    pub removed: &'a BTreeSet<String>,
    pub contrasts: &'a [ContrastNode],
}

impl<'a> ContrastReport<'a> {
    pub fn new(sid: Option<&'a str>, delimiter: char, outcome: &'a SessionOutcome) -> Self {
        let [condition_name, onset_name, duration_name] = sst_onsets::formats::ONSET_HEADER;
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            generator: format!("sst-onsets {}", sst_onsets::VERSION),
            sid,
            timepoint: outcome.timepoint,
            model: outcome.model,
            onset_file: &outcome.onset_file,
            condition_name,
            onset_name,
            duration_name,
            delimiter,
            missing: &outcome.missing,
            removed: &outcome.removed,
            contrasts: &outcome.contrasts,
        }
    }
}

/// Write the contrast report into `dir`, returning its path
pub fn write_contrast_report(dir: &Path, report: &ContrastReport<'_>) -> Result<PathBuf> {
    let path = dir.join(CONTRASTS_FILE_NAME);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create contrast report: {:?}", path))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("Failed to write contrast report: {:?}", path))?;
    writer.flush()?;

    log::info!("Contrast report written to {:?}", path);
    Ok(path)
}

/// Write a one-session summary, one line per fact
pub fn write_summary<W: Write>(
    out: &mut W,
    sid: Option<&str>,
    outcome: &SessionOutcome,
) -> std::io::Result<()> {
    let label = sid.unwrap_or("session");
    writeln!(
        out,
        "{} [{} / model {}]: {} trials ({} matched, {} restarts, {} corrupt lines)",
        label,
        outcome.timepoint,
        outcome.model,
        outcome.stats.trials,
        outcome.stats.matched_trials,
        outcome.stats.restarts,
        outcome.stats.skipped_lines
    )?;
    writeln!(out, "  onsets:    {:?}", outcome.onset_file)?;
    writeln!(out, "  contrasts: {}", outcome.contrasts.len())?;

    if !outcome.missing.is_empty() {
        writeln!(
            out,
            "  missing regressors: {}",
            outcome.missing.iter().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            out,
            "  contrasts not estimated: {}",
            outcome
                .removed
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
    }
    Ok(())
}
