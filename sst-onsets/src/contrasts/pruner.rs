//! Contrast pruning
//!
//! Regressors for conditions that never occurred in a session are absent from
//! its design, so every contrast needing one of them cannot be estimated and is
//! dropped before the tree reaches the estimator.

use crate::contrasts::node::ContrastNode;
use crate::transcoding::MissingSet;
use std::collections::BTreeSet;

/// Pruned contrast tree plus the names that were removed
#[derive(Debug, Clone, PartialEq)]
pub struct PruneOutcome {
    pub contrasts: Vec<ContrastNode>,
    pub removed: BTreeSet<String>,
}

/// Drops contrasts that need a missing regressor
pub struct ContrastPruner<'a> {
    missing: &'a MissingSet,
}

impl<'a> ContrastPruner<'a> {
    pub fn new(missing: &'a MissingSet) -> Self {
        Self { missing }
    }

    /// Filter `contrasts` once per missing label
    ///
    /// Survivors keep their relative order. Empty labels are skipped.
    pub fn prune(&self, contrasts: &[ContrastNode]) -> PruneOutcome {
        let mut kept: Vec<ContrastNode> = contrasts.to_vec();
        let mut removed = BTreeSet::new();

        for label in self.missing.iter().filter(|label| !label.is_empty()) {
            let before = kept.len();
            kept.retain(|contrast| {
                if contrast.requires(label) {
                    removed.insert(contrast.name().to_string());
                    false
                } else {
                    true
                }
            });
            log::debug!(
                "Missing regressor '{}' removed {} contrasts",
                label,
                before - kept.len()
            );
        }

        if !removed.is_empty() {
            log::info!(
                "Contrasts that cannot be estimated without {:?}: {:?}",
                self.missing.iter().collect::<Vec<_>>(),
                removed
            );
        }

        PruneOutcome {
            contrasts: kept,
            removed,
        }
    }
}
