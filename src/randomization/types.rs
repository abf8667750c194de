use serde::{Deserialize, Serialize};

use crate::condition::Condition;

/// One recruitment stratum, randomized independently
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    pub label: String,
    pub id_prefix: String,
    pub n_participants: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationConfig {
    pub block_size: usize,
    pub seed: u64,
    pub strata: Vec<Stratum>,
}

impl Default for RandomizationConfig {
    fn default() -> Self {
        Self {
            block_size: Condition::COUNT,
            seed: 1,
            strata: vec![Stratum {
                label: String::from("main"),
                id_prefix: String::from("P"),
                n_participants: 270,
            }],
        }
    }
}

/// One row of the allocation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub id: String,
    pub stratum: String,
    pub condition: Condition,
    /// 1-based within the stratum
    pub block: usize,
}
