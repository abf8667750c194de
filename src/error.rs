//----------------------------------------
// Crate error type
//----------------------------------------
use crate::config::error::ConfigError;
use crate::data::error::DataError;
use crate::estimation::error::EstimationError;
use crate::hypothesis::error::HypothesisError;
use crate::randomization::error::RandomizationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PowerSimErr {
    #[error("invalid configuration: {0}")]
    InvalidConfig(ConfigError),
    #[error("while preparing trial data: {0}")]
    Data(DataError),
    #[error("while fitting hierarchical model: {0}")]
    Estimation(EstimationError),
    #[error("while evaluating hypotheses: {0}")]
    Hypothesis(HypothesisError),
    #[error("while generating randomization list: {0}")]
    Randomization(RandomizationError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

impl PowerSimErr {
    /// Errors that invalidate a single replicate but not the run
    pub fn is_replicate_failure(&self) -> bool {
        matches!(
            self,
            PowerSimErr::Data(_) | PowerSimErr::Estimation(_) | PowerSimErr::Hypothesis(_)
        )
    }
}
