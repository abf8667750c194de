use serde::Serialize;

use crate::hypothesis::types::{Hypothesis, HypothesisProbabilities};
use crate::summary::PowerSummary;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplicateStatus {
    Converged,
    Failed { reason: String },
}

impl ReplicateStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReplicateStatus::Converged => "converged",
            ReplicateStatus::Failed { .. } => "failed",
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            ReplicateStatus::Converged => "",
            ReplicateStatus::Failed { reason } => reason,
        }
    }
}

/// Outcome of one simulated trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicateResult {
    pub index: usize,
    pub seed: u64,
    pub prob_h1: f64,
    pub prob_h2: f64,
    #[serde(flatten)]
    pub status: ReplicateStatus,
}

impl ReplicateResult {
    pub fn converged(index: usize, seed: u64, probabilities: HypothesisProbabilities) -> Self {
        Self {
            index,
            seed,
            prob_h1: probabilities.get(Hypothesis::H1),
            prob_h2: probabilities.get(Hypothesis::H2),
            status: ReplicateStatus::Converged,
        }
    }

    /// Failed replicates carry NaN probabilities
    pub fn failed(index: usize, seed: u64, reason: String) -> Self {
        Self {
            index,
            seed,
            prob_h1: f64::NAN,
            prob_h2: f64::NAN,
            status: ReplicateStatus::Failed { reason },
        }
    }

    pub fn is_converged(&self) -> bool {
        self.status == ReplicateStatus::Converged
    }

    pub fn probability(&self, hypothesis: Hypothesis) -> f64 {
        match hypothesis {
            Hypothesis::H1 => self.prob_h1,
            Hypothesis::H2 => self.prob_h2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    /// Every requested replicate was attempted
    Complete,
    /// The time or replicate budget ran out before all replicates started
    Partial { skipped: usize },
    /// Replicates were attempted but none converged
    AllFailed,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Complete => "complete",
            RunStatus::Partial { .. } => "partial",
            RunStatus::AllFailed => "all_failed",
        }
    }
}

/// Everything a power analysis run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerReport {
    pub summaries: Vec<PowerSummary>,
    pub replicates: Vec<ReplicateResult>,
    pub n_requested: usize,
    pub n_completed: usize,
    pub n_failed: usize,
    pub n_skipped: usize,
    pub status: RunStatus,
}

impl PowerReport {
    pub fn summary(&self, hypothesis: Hypothesis) -> Option<&PowerSummary> {
        self.summaries.iter().find(|s| s.hypothesis == hypothesis)
    }
}
