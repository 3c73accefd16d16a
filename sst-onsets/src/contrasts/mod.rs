//! Statistical contrast specification
//!
//! This module contains the contrast tree types, the per-model builder and the
//! pruner that removes contrasts a session cannot support.

pub mod builder;
pub mod node;
pub mod pruner;

// Re-export key types for convenience
pub use builder::{
    ConditionDifference, ContrastSpecBuilder, ProtocolModel, EFFECTS_OF_COMPCORR,
    EFFECTS_OF_INTEREST, EFFECTS_OF_REALIGNMENT,
};
pub use node::{ContrastNode, FContrast, TContrast};
pub use pruner::{ContrastPruner, PruneOutcome};
