//----------------------------------------
// simulation mod
//----------------------------------------
pub mod driver;
pub mod replicate;
mod seeds;
pub mod types;

pub use driver::{run_power_analysis, run_power_analysis_with};
pub use replicate::run_replicate;
pub use types::{PowerReport, ReplicateResult, ReplicateStatus, RunStatus};
