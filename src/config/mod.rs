//----------------------------------------
// config mod
//----------------------------------------
pub mod error;
mod load;
pub mod types;

pub use types::{PowerAnalysisConfig, RunSettings, SamplerSettings, TrialConfig};
