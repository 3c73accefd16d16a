//! Stop-Signal Task Onset Library
//!
//! A stateless, reusable library that turns stop-signal task behavioural logs
//! into condition onsets and builds the matching statistical contrasts for a
//! first-level fMRI analysis.
//!
//! # Architecture
//!
//! - Parses tab-delimited trial logs and repairs mid-session restarts
//! - Transcodes raw outcome codes into condition labels and detects
//!   conditions that never occurred
//! - Writes the `Conditions;Onsets;Durations` onset artifact
//! - Builds the T/F contrast tree for a protocol model and prunes contrasts
//!   needing missing regressors
//!
//! The library does NOT:
//! - Process images or estimate statistical models
//! - Run or configure the external estimation pipeline
//! - Archive or compress results
//!
//! Batch processing and the estimator hand-off live in the application layer
//! (sst-onsets-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use sst_onsets::{
//!     ConditionTranscoder, ContrastPruner, ContrastSpecBuilder, EventLogParser,
//!     OnsetWriter, ProtocolModel, SessionConfig, Timepoint, TranscodingTable,
//! };
//! use std::path::Path;
//!
//! let config = SessionConfig::new();
//! let table = TranscodingTable::stop_signal();
//! let model = ProtocolModel::A;
//!
//! let parsed = EventLogParser::new(&config)
//!     .parse_file(Path::new("ss_000001441076.csv"))
//!     .unwrap();
//! let transcoded = ConditionTranscoder::new(&table, model.conditions().iter().copied())
//!     .transcode(&parsed.records, Timepoint::Baseline)
//!     .unwrap();
//! OnsetWriter::new(config.delimiter)
//!     .write_file(Path::new("onset.txt"), &transcoded.events)
//!     .unwrap();
//!
//! let contrasts = ContrastSpecBuilder::new(model).build().unwrap();
//! let pruned = ContrastPruner::new(&transcoded.missing).prune(&contrasts);
//! for contrast in &pruned.contrasts {
//!     println!("{}", contrast);
//! }
//! ```

// Public modules
pub mod config;
pub mod contrasts;
pub mod formats;
pub mod session;
pub mod transcoding;
pub mod types;

// Re-export main types for convenience
pub use config::SessionConfig;
pub use contrasts::{
    ContrastNode, ContrastPruner, ContrastSpecBuilder, FContrast, PruneOutcome, ProtocolModel,
    TContrast,
};
pub use formats::{EventLogParser, OnsetReader, OnsetWriter, ParsedLog};
pub use session::{SessionOutcome, SessionProcessor, SessionStats};
pub use transcoding::{ConditionTranscoder, MissingSet, Transcoded, TranscodingTable};
pub use types::{
    ColumnType, EventsError, FieldValue, OnsetEvent, RawEventRecord, Result, Timepoint,
    TrialCountBand,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
