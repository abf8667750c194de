//----------------------------------------
// randomization mod
//----------------------------------------
pub mod block;
pub mod error;
pub mod types;

pub use block::generate_list;
pub use types::{Assignment, RandomizationConfig, Stratum};
