//! Outcome-code transcoding
//!
//! Maps the raw response outcome codes of the trial log to semantic condition
//! labels and detects conditions that never occurred in a session.

pub mod table;
pub mod transcoder;

pub use table::TranscodingTable;
pub use transcoder::{ConditionTranscoder, MissingSet, Transcoded};
