use statrs::statistics::Statistics;

use crate::data::{
    error::DataError,
    types::{Occasion, TrialDataset},
};
use crate::error::PowerSimErr;

/// Pooled baseline location and scale used for standardization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineScale {
    pub mean: f64,
    pub sd: f64,
}

/// Rescales every raw outcome to baseline z-scores.
///
/// Mean and sample standard deviation come from the pre-treatment rows of
/// all participants pooled across conditions, so effects are expressed in
/// baseline SD units. Post rows are rescaled with the same constants.
pub fn standardize(dataset: &mut TrialDataset) -> Result<BaselineScale, PowerSimErr> {
    let baseline: Vec<f64> = dataset
        .observations()
        .iter()
        .filter(|o| o.occasion == Occasion::Pre)
        .map(|o| o.raw)
        .collect();

    if baseline.len() < 2 {
        return Err(DataError::TooFewObservations(baseline.len()).into());
    }
    let mean = baseline.iter().mean();
    let sd = baseline.iter().std_dev();
    if !sd.is_finite() || sd <= 0.0 {
        return Err(DataError::DegenerateSample(sd).into());
    }

    for observation in dataset.observations_mut() {
        observation.standardized = Some((observation.raw - mean) / sd);
    }
    Ok(BaselineScale { mean, sd })
}
