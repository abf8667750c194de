//----------------------------------------
// Root lib
//----------------------------------------
//! Monte Carlo power analysis for a three-arm Bayesian non-inferiority
//! trial: face-to-face therapy against an app with expert support and an app
//! with non-expert support. Each replicate simulates pre/post outcomes, masks
//! dropouts, fits a multilevel change model by MCMC and records the posterior
//! probability of each non-inferiority hypothesis. The replicates are then
//! summarized into power estimates.

/// Treatment arms
pub mod condition;
/// Configuration types and TOML loading
pub mod config;
/// Trial data simulation, standardization and dropout
pub mod data;
/// This module contains error types
pub mod error;
/// Hierarchical model, sampler and convergence diagnostics
pub mod estimation;
pub mod hypothesis;
/// Permuted-block allocation lists
pub mod randomization;
pub mod report;
/// Replicate pipeline and power analysis driver
pub mod simulation;
pub mod summary;

pub use condition::Condition;
pub use config::{PowerAnalysisConfig, RunSettings, SamplerSettings, TrialConfig};
pub use error::PowerSimErr;
pub use estimation::{HierarchicalModel, PosteriorSampler};
pub use hypothesis::Hypothesis;
pub use simulation::{
    PowerReport, ReplicateResult, ReplicateStatus, RunStatus, run_power_analysis,
    run_power_analysis_with, run_replicate,
};
pub use summary::PowerSummary;
