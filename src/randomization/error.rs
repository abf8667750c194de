//----------------------------------------
// Randomization errors
//----------------------------------------
use crate::error::PowerSimErr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RandomizationError {
    #[error("block size must equal the number of conditions ({expected}), got {got}")]
    BadBlockSize { expected: usize, got: usize },
    #[error("stratum `{stratum}` has {n_participants} participants, not a multiple of block size {block_size}")]
    NotMultipleOfBlock {
        stratum: String,
        n_participants: usize,
        block_size: usize,
    },
    #[error("no strata configured")]
    NoStrata,
    #[error("duplicate stratum label `{0}`")]
    DuplicateStratum(String),
}

impl Into<PowerSimErr> for RandomizationError {
    fn into(self) -> PowerSimErr {
        PowerSimErr::Randomization(self)
    }
}
