use nalgebra::{Matrix2, Vector2};

use crate::condition::Condition;
use crate::data::types::TrialDataset;
use crate::error::PowerSimErr;
use crate::estimation::error::EstimationError;

/// Per-condition sufficient statistics for the marginal likelihood.
///
/// Participants with both outcomes contribute a bivariate (pre, post) vector;
/// those whose post outcome is missing contribute their baseline only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ConditionSummary {
    pub n_complete: usize,
    pub sum_complete: Vector2<f64>,
    /// Sum of outer products y y' over complete participants
    pub cross_complete: Matrix2<f64>,
    pub n_baseline_only: usize,
    pub sum_baseline_only: f64,
    pub sq_baseline_only: f64,
}

impl ConditionSummary {
    fn empty() -> Self {
        Self {
            n_complete: 0,
            sum_complete: Vector2::zeros(),
            cross_complete: Matrix2::zeros(),
            n_baseline_only: 0,
            sum_baseline_only: 0.0,
            sq_baseline_only: 0.0,
        }
    }

    pub fn n_observations(&self) -> usize {
        2 * self.n_complete + self.n_baseline_only
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DatasetSummary {
    pub conditions: [ConditionSummary; Condition::COUNT],
}

impl DatasetSummary {
    /// Collects statistics from standardized outcomes. Rows with a missing
    /// post outcome stay in the model through their baseline.
    pub fn from_dataset(dataset: &TrialDataset) -> Result<Self, PowerSimErr> {
        let mut conditions = [ConditionSummary::empty(); Condition::COUNT];
        for (participant, pre, post) in dataset.paired() {
            let summary = &mut conditions[participant.condition.index()];
            let Some(y_pre) = pre.standardized else {
                return Err(EstimationError::MissingBaseline(participant.id).into());
            };
            match post.standardized {
                Some(y_post) => {
                    let y = Vector2::new(y_pre, y_post);
                    summary.n_complete += 1;
                    summary.sum_complete += y;
                    summary.cross_complete += y * y.transpose();
                }
                None => {
                    summary.n_baseline_only += 1;
                    summary.sum_baseline_only += y_pre;
                    summary.sq_baseline_only += y_pre * y_pre;
                }
            }
        }
        Ok(Self { conditions })
    }

    pub fn condition(&self, condition: Condition) -> &ConditionSummary {
        &self.conditions[condition.index()]
    }
}
