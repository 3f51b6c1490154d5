use serde::{Deserialize, Serialize};

use crate::reduction::reducer::ReductionPass;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Parameters for state machine based discovery
pub struct DiscoveryParameters {
    /// Directly-follows entries with a count of at most this value are filtered out
    pub absolute_threshold: u64,
    /// Directly-follows entries with `100·count ≤ relative_threshold·min(rowMax, colMax)` are filtered out (percentage, `0..=100`)
    pub relative_threshold: u32,
    /// Share the visible transition of an activity among all state machines
    pub merge: bool,
    /// Maximal number of activity sets (i.e., state machines)
    pub max_nof_solutions: usize,
    /// Reduction passes applied to the discovered net (in order)
    pub reductions: Vec<ReductionPass>,
}

impl Default for DiscoveryParameters {
    fn default() -> Self {
        Self {
            absolute_threshold: 0,
            relative_threshold: 0,
            merge: true,
            max_nof_solutions: 1000,
            reductions: vec![
                ReductionPass::CollapseDuplicates,
                ReductionPass::EliminateSilentTransitions,
                ReductionPass::CollapseDuplicates,
            ],
        }
    }
}

impl DiscoveryParameters {
    /// Serialize parameters to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize parameters from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Check that all parameters are in their valid range
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.relative_threshold > 100 {
            return Err(DiscoveryError::RelativeThresholdOutOfRange(
                self.relative_threshold,
            ));
        }
        if self.max_nof_solutions == 0 {
            return Err(DiscoveryError::NoSolutionsAllowed);
        }
        Ok(())
    }
}

///
/// Error encountered before discovery starts
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The relative threshold (percentage) was larger than 100
    RelativeThresholdOutOfRange(u32),
    /// The maximal number of solutions was 0
    NoSolutionsAllowed,
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::RelativeThresholdOutOfRange(t) => {
                write!(f, "Relative threshold must be in 0..=100, got {t}")
            }
            DiscoveryError::NoSolutionsAllowed => {
                write!(f, "Maximal number of solutions must be at least 1")
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}
