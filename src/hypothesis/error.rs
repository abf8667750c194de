//----------------------------------------
// Hypothesis errors
//----------------------------------------
use crate::error::PowerSimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum HypothesisError {
    #[error("posterior sample contains no draws")]
    EmptyPosterior,
}

impl Into<PowerSimErr> for HypothesisError {
    fn into(self) -> PowerSimErr {
        PowerSimErr::Hypothesis(self)
    }
}
