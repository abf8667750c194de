//----------------------------------------
// hypothesis mod types
//----------------------------------------
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::Condition;
use crate::estimation::types::Draw;

/// Non-inferiority contrasts between condition slopes
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum Hypothesis {
    /// Face-to-face slope minus the mean of the two app slopes
    H1,
    /// Expert-supported app slope minus non-expert-supported app slope
    H2,
}

impl Hypothesis {
    pub const ALL: [Hypothesis; 2] = [Hypothesis::H1, Hypothesis::H2];

    pub fn name(self) -> &'static str {
        match self {
            Hypothesis::H1 => "H1",
            Hypothesis::H2 => "H2",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Hypothesis::H1 => "f2f - mean(app_expert, app_nonexpert)",
            Hypothesis::H2 => "app_expert - app_nonexpert",
        }
    }

    /// Value of the contrast in one posterior draw
    pub fn contrast(self, draw: &Draw) -> f64 {
        match self {
            Hypothesis::H1 => {
                draw.slope(Condition::FaceToFace)
                    - 0.5 * (draw.slope(Condition::AppExpert) + draw.slope(Condition::AppNonExpert))
            }
            Hypothesis::H2 => draw.slope(Condition::AppExpert) - draw.slope(Condition::AppNonExpert),
        }
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Posterior probability of non-inferiority for each hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HypothesisProbabilities {
    pub h1: f64,
    pub h2: f64,
}

impl HypothesisProbabilities {
    pub fn get(&self, hypothesis: Hypothesis) -> f64 {
        match hypothesis {
            Hypothesis::H1 => self.h1,
            Hypothesis::H2 => self.h2,
        }
    }
}
