//! Text formats read and written by a session
//!
//! - `behavior`: the tab-delimited trial log produced by the stop-signal task
//! - `onset`: the delimited condition/onset/duration artifact for the estimator

pub mod behavior;
pub mod onset;

// Re-export parser and writer types
pub use behavior::{normalize_header, repair_restarts, EventLogParser, ParsedLog};
pub use onset::{format_seconds, OnsetReader, OnsetWriter, ABSENT_TOKEN, ONSET_HEADER};
