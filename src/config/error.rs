//----------------------------------------
// Configuration errors
//----------------------------------------
use crate::condition::Condition;
use crate::error::PowerSimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("arm size for condition {0} must be positive")]
    NonPositiveArmSize(Condition),
    #[error("effect size for condition {condition} must be finite; got {value}")]
    NonFiniteEffect { condition: Condition, value: f64 },
    #[error("icc should be in [0, 1]; got {0}")]
    IccOutOfRange(f64),
    #[error("dropout rate should be in [0, 1]; got {0}")]
    DropoutOutOfRange(f64),
    #[error("non-inferiority margin must be finite; got {0}")]
    NonFiniteMargin(f64),
    #[error("probability threshold should be in (0, 1); got {0}")]
    ThresholdOutOfRange(f64),
    #[error("number of simulations must be at least 1")]
    NoSimulations,
    #[error("sampler needs at least one chain")]
    NoChains,
    #[error("sampler needs at least 4 draws per chain; got {0}")]
    TooFewDraws(usize),
    #[error("R-hat limit should be at least 1.0; got {0}")]
    BadRhatLimit(f64),
    #[error("effective sample size floor should be positive; got {0}")]
    BadEssFloor(f64),
    #[error("credible interval mass should be in (0, 1); got {0}")]
    CredibleMassOutOfRange(f64),
}

impl Into<PowerSimErr> for ConfigError {
    fn into(self) -> PowerSimErr {
        PowerSimErr::InvalidConfig(self)
    }
}
