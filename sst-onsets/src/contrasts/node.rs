//! Contrast tree types
//!
//! A contrast is either a T-contrast (one linear combination of named
//! regressors) or an F-contrast (a named group of contrasts tested together).

use crate::types::{EventsError, Result};
use serde::Serialize;
use std::fmt;

/// A node of the contrast tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum ContrastNode {
    #[serde(rename = "T")]
    T(TContrast),
    #[serde(rename = "F")]
    F(FContrast),
}

/// Linear combination of named regressors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TContrast {
    name: String,
    regressors: Vec<String>,
    weights: Vec<f64>,
}

/// Omnibus test over a non-empty group of contrasts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FContrast {
    name: String,
    children: Vec<ContrastNode>,
}

impl TContrast {
    /// Create a T-contrast; regressors and weights must have the same length
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        regressors: impl IntoIterator<Item = S>,
        weights: impl IntoIterator<Item = f64>,
    ) -> Result<Self> {
        let name = name.into();
        let regressors: Vec<String> = regressors.into_iter().map(Into::into).collect();
        let weights: Vec<f64> = weights.into_iter().collect();

        if regressors.is_empty() || regressors.len() != weights.len() {
            return Err(EventsError::InvalidContrast(format!(
                "T-contrast '{}' has {} regressors and {} weights",
                name,
                regressors.len(),
                weights.len()
            )));
        }

        Ok(Self {
            name,
            regressors,
            weights,
        })
    }

    /// Single-regressor contrast with weight +1, named after the regressor
    pub fn identity(regressor: impl Into<String>) -> Self {
        let regressor = regressor.into();
        Self {
            name: regressor.clone(),
            regressors: vec![regressor],
            weights: vec![1.0],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regressors(&self) -> &[String] {
        &self.regressors
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl FContrast {
    /// Create an F-contrast; at least one child is required
    pub fn new(name: impl Into<String>, children: Vec<ContrastNode>) -> Result<Self> {
        let name = name.into();
        if children.is_empty() {
            return Err(EventsError::InvalidContrast(format!(
                "F-contrast '{}' has no children",
                name
            )));
        }
        Ok(Self { name, children })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[ContrastNode] {
        &self.children
    }
}

impl ContrastNode {
    pub fn name(&self) -> &str {
        match self {
            ContrastNode::T(t) => t.name(),
            ContrastNode::F(f) => f.name(),
        }
    }

    /// "T" or "F"
    pub fn kind(&self) -> &'static str {
        match self {
            ContrastNode::T(_) => "T",
            ContrastNode::F(_) => "F",
        }
    }

    /// True if estimating this contrast needs `label`
    ///
    /// A T-contrast needs its own name and every regressor it weights; an
    /// F-contrast needs whatever any of its children needs.
    pub fn requires(&self, label: &str) -> bool {
        match self {
            ContrastNode::T(t) => t.name == label || t.regressors.iter().any(|r| r == label),
            ContrastNode::F(f) => f.children.iter().any(|child| child.requires(label)),
        }
    }
}

impl From<TContrast> for ContrastNode {
    fn from(contrast: TContrast) -> Self {
        ContrastNode::T(contrast)
    }
}

impl From<FContrast> for ContrastNode {
    fn from(contrast: FContrast) -> Self {
        ContrastNode::F(contrast)
    }
}

impl fmt::Display for ContrastNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContrastNode::T(t) => write!(
                f,
                "T '{}' {:?} {:?}",
                t.name, t.regressors, t.weights
            ),
            ContrastNode::F(group) => write!(
                f,
                "F '{}' ({} contrasts)",
                group.name,
                group.children.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_t_contrast_lengths() {
        let ok = TContrast::new("a - b", ["a", "b"], [1.0, -1.0]).unwrap();
        assert_eq!(ok.regressors(), ["a", "b"]);
        assert_eq!(ok.weights(), [1.0, -1.0]);

        assert!(TContrast::new("bad", ["a", "b"], [1.0]).is_err());
        assert!(TContrast::new("empty", Vec::<String>::new(), []).is_err());
    }

    #[test]
    fn test_f_contrast_requires_children() {
        assert!(FContrast::new("Effects of nothing", vec![]).is_err());
        let group = FContrast::new("g", vec![TContrast::identity("a").into()]).unwrap();
        assert_eq!(group.children().len(), 1);
    }

    #[test]
    fn test_requires_is_transitive() {
        let diff = TContrast::new("a - b", ["a", "b"], [1.0, -1.0]).unwrap();
        assert!(ContrastNode::from(diff.clone()).requires("b"));
        assert!(ContrastNode::from(diff.clone()).requires("a - b"));
        assert!(!ContrastNode::from(diff.clone()).requires("c"));

        let inner = FContrast::new("inner", vec![diff.into()]).unwrap();
        let outer = FContrast::new(
            "outer",
            vec![TContrast::identity("c").into(), inner.into()],
        )
        .unwrap();
        let node = ContrastNode::from(outer);
        assert!(node.requires("b"));
        assert!(node.requires("c"));
        assert!(!node.requires("d"));
    }

    #[test]
    fn test_serialized_shape() {
        let node = ContrastNode::from(TContrast::identity("Realign1"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "T");
        assert_eq!(json["name"], "Realign1");
        assert_eq!(json["regressors"][0], "Realign1");
        assert_eq!(json["weights"][0], 1.0);
    }
}
