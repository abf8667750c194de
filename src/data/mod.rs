//----------------------------------------
// data mod
//----------------------------------------
pub mod error;
pub mod generate;
pub mod missingness;
pub mod standardize;
pub mod types;

pub use generate::generate_dataset;
pub use missingness::inject_missingness;
pub use standardize::{BaselineScale, standardize};
pub use types::{ObservationRecord, Occasion, ParticipantRecord, TrialDataset};
