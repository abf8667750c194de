use serde::{Deserialize, Serialize};
use std::fmt;

/// Treatment arms of the trial. Face-to-face therapy is the active control.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "f2f")]
    FaceToFace,
    #[serde(rename = "app_expert")]
    AppExpert,
    #[serde(rename = "app_nonexpert")]
    AppNonExpert,
}

impl Condition {
    pub const COUNT: usize = 3;
    pub const ALL: [Condition; Condition::COUNT] = [
        Condition::FaceToFace,
        Condition::AppExpert,
        Condition::AppNonExpert,
    ];

    /// Position of this condition in every condition-indexed array
    pub fn index(self) -> usize {
        match self {
            Condition::FaceToFace => 0,
            Condition::AppExpert => 1,
            Condition::AppNonExpert => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Condition::FaceToFace => "f2f",
            Condition::AppExpert => "app_expert",
            Condition::AppNonExpert => "app_nonexpert",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
