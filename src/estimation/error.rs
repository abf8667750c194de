//----------------------------------------
// Estimation errors
//----------------------------------------
use crate::error::PowerSimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EstimationError {
    #[error("participant {0} has no standardized baseline outcome")]
    MissingBaseline(usize),
    #[error(
        "failed to converge ({parameter}: R-hat {rhat:.4} (limit {max_rhat}), \
        ESS {ess:.1} (floor {min_ess}))"
    )]
    NonConvergence {
        parameter: String,
        rhat: f64,
        ess: f64,
        max_rhat: f64,
        min_ess: f64,
    },
    #[error("fixed-effect posterior precision is not positive definite")]
    NotPositiveDefinite,
    #[error("log posterior is not finite at the initial values of chain {0}")]
    BadInitialValues(usize),
    #[error("failed to construct sampling distribution: {0}")]
    Distribution(String),
}

impl Into<PowerSimErr> for EstimationError {
    fn into(self) -> PowerSimErr {
        PowerSimErr::Estimation(self)
    }
}
