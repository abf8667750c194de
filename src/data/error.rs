//----------------------------------------
// Data errors
//----------------------------------------
use crate::error::PowerSimErr;
use thiserror::Error;

/// Failures while preparing one replicate's data.
///
/// Both standardizer failures are degenerate samples: `TooFewObservations`
/// when the pooled baseline has fewer than two rows, so no sample standard
/// deviation exists, and `DegenerateSample` when it exists but is zero or not
/// finite. Either one fails the replicate, not the run.
#[derive(Error, Debug, PartialEq)]
pub enum DataError {
    #[error("cannot standardize with {0} baseline observations; need at least 2")]
    TooFewObservations(usize),
    #[error("baseline standard deviation is {0}; cannot standardize")]
    DegenerateSample(f64),
    #[error("failed to construct sampling distribution: {0}")]
    Distribution(String),
}

impl Into<PowerSimErr> for DataError {
    fn into(self) -> PowerSimErr {
        PowerSimErr::Data(self)
    }
}
