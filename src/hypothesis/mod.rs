//----------------------------------------
// hypothesis mod
//----------------------------------------
pub mod error;
pub mod evaluate;
pub mod types;

pub use evaluate::{evaluate_hypotheses, non_inferiority_probability};
pub use types::{Hypothesis, HypothesisProbabilities};
