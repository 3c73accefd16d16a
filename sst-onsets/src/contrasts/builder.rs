//! Contrast specification builder
//!
//! Builds the full contrast list for a protocol model:
//! 1. one T-contrast per condition of interest
//! 2. each condition difference and its mirror
//! 3. one identity T-contrast per nuisance regressor
//! 4. the "Effects of interest", "Effects of rp" and "Effects of compcorr"
//!    F-contrasts
//!
//! Nuisance regressors are named `Realign1..RealignN` across both families:
//! the realignment family comes first and the compcorr family continues the
//! numbering, matching the column order of the extended nuisance file.

use crate::contrasts::node::{ContrastNode, FContrast, TContrast};
use crate::types::{EventsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the F-contrast over the conditions of interest
pub const EFFECTS_OF_INTEREST: &str = "Effects of interest";
/// Name of the F-contrast over the realignment regressors
pub const EFFECTS_OF_REALIGNMENT: &str = "Effects of rp";
/// Name of the F-contrast over the compcorr regressors
pub const EFFECTS_OF_COMPCORR: &str = "Effects of compcorr";

/// A difference between two conditions, tested in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionDifference {
    /// Name of the `+1/-1` contrast
    pub name: &'static str,
    /// Name of the `-1/+1` contrast
    pub mirror: &'static str,
    /// Regressors, in the order the weights apply to
    pub regressors: [&'static str; 2],
}

/// Experimental protocol models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolModel {
    /// Go-too-late, go-wrong and both stop outcomes; 12 realignment and 9
    /// compcorr regressors
    #[serde(alias = "A")]
    A,
    /// Adds successful go trials with go/stop differences; 18 realignment and
    /// 10 compcorr regressors
    #[serde(alias = "B")]
    B,
}

const MODEL_A_DIFFERENCES: &[ConditionDifference] = &[ConditionDifference {
    name: "stop_success - stop_failure",
    mirror: "stop_failure - stop_success",
    regressors: ["stop_success", "stop_failure"],
}];

const MODEL_B_DIFFERENCES: &[ConditionDifference] = &[
    ConditionDifference {
        name: "stop_success - go_success",
        mirror: "go_success - stop_success",
        regressors: ["stop_success", "go_success"],
    },
    ConditionDifference {
        name: "stop_success - stop_failure",
        mirror: "stop_failure - stop_success",
        regressors: ["stop_success", "stop_failure"],
    },
    ConditionDifference {
        name: "go_success - stop_failure",
        mirror: "stop_failure - go_success",
        regressors: ["go_success", "stop_failure"],
    },
    ConditionDifference {
        name: "go_wrong - go_success",
        mirror: "go_success - go_wrong",
        regressors: ["go_wrong", "go_success"],
    },
];

impl ProtocolModel {
    /// Conditions that get their own regressor and T-contrast
    pub fn conditions(&self) -> &'static [&'static str] {
        match self {
            ProtocolModel::A => &["go_toolate", "go_wrong", "stop_success", "stop_failure"],
            ProtocolModel::B => &[
                "go_success",
                "go_toolate",
                "go_wrong",
                "stop_success",
                "stop_failure",
            ],
        }
    }

    /// Conditions grouped in the "Effects of interest" F-contrast
    pub fn effects_of_interest(&self) -> &'static [&'static str] {
        match self {
            ProtocolModel::A => &["stop_success", "stop_failure"],
            ProtocolModel::B => self.conditions(),
        }
    }

    pub fn differences(&self) -> &'static [ConditionDifference] {
        match self {
            ProtocolModel::A => MODEL_A_DIFFERENCES,
            ProtocolModel::B => MODEL_B_DIFFERENCES,
        }
    }

    /// Motion regressors: 6 parameters plus derived terms
    pub fn realignment_count(&self) -> usize {
        match self {
            ProtocolModel::A => 12,
            ProtocolModel::B => 18,
        }
    }

    /// White-matter and CSF noise regressors
    pub fn compcorr_count(&self) -> usize {
        match self {
            ProtocolModel::A => 9,
            ProtocolModel::B => 10,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProtocolModel::A => "a",
            ProtocolModel::B => "b",
        }
    }
}

impl fmt::Display for ProtocolModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ProtocolModel {
    type Err = EventsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" => Ok(ProtocolModel::A),
            "b" => Ok(ProtocolModel::B),
            _ => Err(EventsError::UnknownModel(s.to_string())),
        }
    }
}

/// Builds the contrast list for a protocol model
pub struct ContrastSpecBuilder {
    model: ProtocolModel,
}

impl ContrastSpecBuilder {
    pub fn new(model: ProtocolModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> ProtocolModel {
        self.model
    }

    /// Build condition, difference and nuisance T-contrasts followed by the
    /// three F-contrasts
    pub fn build(&self) -> Result<Vec<ContrastNode>> {
        let model = self.model;

        let conditions: Vec<TContrast> = model
            .conditions()
            .iter()
            .map(|c| TContrast::identity(*c))
            .collect();

        let mut differences = Vec::with_capacity(model.differences().len() * 2);
        for diff in model.differences() {
            differences.push(TContrast::new(diff.name, diff.regressors, [1.0, -1.0])?);
            differences.push(TContrast::new(diff.mirror, diff.regressors, [-1.0, 1.0])?);
        }

        let realignment_end = model.realignment_count();
        let compcorr_end = realignment_end + model.compcorr_count();
        let realignment: Vec<TContrast> = (1..=realignment_end).map(nuisance).collect();
        let compcorr: Vec<TContrast> = (realignment_end + 1..=compcorr_end).map(nuisance).collect();

        let interest: Vec<ContrastNode> = model
            .effects_of_interest()
            .iter()
            .map(|c| TContrast::identity(*c).into())
            .collect();

        let groups = [
            FContrast::new(EFFECTS_OF_INTEREST, interest)?,
            FContrast::new(EFFECTS_OF_REALIGNMENT, to_nodes(&realignment))?,
            FContrast::new(EFFECTS_OF_COMPCORR, to_nodes(&compcorr))?,
        ];

        let contrasts: Vec<ContrastNode> = conditions
            .into_iter()
            .chain(differences)
            .chain(realignment)
            .chain(compcorr)
            .map(ContrastNode::T)
            .chain(groups.into_iter().map(ContrastNode::F))
            .collect();

        log::debug!(
            "Built {} contrasts for protocol model {}",
            contrasts.len(),
            model
        );
        Ok(contrasts)
    }
}

fn nuisance(index: usize) -> TContrast {
    TContrast::identity(format!("Realign{}", index))
}

fn to_nodes(contrasts: &[TContrast]) -> Vec<ContrastNode> {
    contrasts.iter().cloned().map(ContrastNode::T).collect()
}
