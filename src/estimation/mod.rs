//----------------------------------------
// estimation mod
//----------------------------------------
pub mod diagnostics;
pub mod error;
mod likelihood;
pub mod model;
mod sampler;
mod sufficient;
pub mod types;

pub use model::{HierarchicalModel, PosteriorSampler};
pub use types::{Draw, ParameterDiagnostics, PosteriorDraws};
