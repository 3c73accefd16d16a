//! Configuration loading and parsing

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sst_onsets::{ProtocolModel, SessionConfig, Timepoint, TranscodingTable};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Overrides for the log layout and onset format
    #[serde(default)]
    pub session: SessionConfig,
    /// Replacement transcoding table (label -> outcome codes)
    #[serde(default)]
    pub transcoding: Option<BTreeMap<String, Vec<String>>>,
    /// Protocol model used when a session does not name one
    #[serde(default)]
    pub model: Option<ProtocolModel>,
    /// Sessions processed in batch mode
    #[serde(default)]
    pub sessions: Vec<SessionEntry>,
}

/// One session of a batch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionEntry {
    pub sid: String,
    pub behavfile: PathBuf,
    pub timepoint: Timepoint,
    pub outdir: PathBuf,
    #[serde(default)]
    pub model: Option<ProtocolModel>,
}

impl AppConfig {
    /// The configured transcoding table, or the stop-signal table
    pub fn transcoding_table(&self) -> TranscodingTable {
        match &self.transcoding {
            Some(entries) => TranscodingTable::new(entries.clone()),
            None => TranscodingTable::stop_signal(),
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    let table = config.transcoding_table();
    if !table.is_disjoint() {
        log::warn!(
            "Transcoding table maps these codes to several conditions: {:?}",
            table.overlapping_codes()
        );
    }

    Ok(config)
}
