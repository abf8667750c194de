//----------------------------------------
// summary mod
//----------------------------------------
pub mod power_summary;

pub use power_summary::{PowerSummary, summarize_hypothesis};
