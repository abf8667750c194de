//----------------------------------------
// data mod types
//----------------------------------------
use crate::condition::Condition;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Occasion {
    Pre,
    Post,
}

/// One synthetic subject
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantRecord {
    pub id: usize,
    pub condition: Condition,
    pub person_effect: f64,
}

/// One subject x occasion measurement. `standardized` is `None` until the
/// standardizer runs, and again afterwards for post-treatment dropouts.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub participant_id: usize,
    pub occasion: Occasion,
    pub raw: f64,
    pub standardized: Option<f64>,
}

/// Synthetic dataset of one replicate.
///
/// Participant ids equal their position, and observations are stored in
/// participant order as `[pre, post]` pairs, so participant `i` owns rows
/// `2i` and `2i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialDataset {
    participants: Vec<ParticipantRecord>,
    observations: Vec<ObservationRecord>,
}

impl TrialDataset {
    pub(crate) fn with_capacity(n_participants: usize) -> Self {
        Self {
            participants: Vec::with_capacity(n_participants),
            observations: Vec::with_capacity(2 * n_participants),
        }
    }

    /// Appends a participant together with its pre and post raw outcomes
    pub(crate) fn push_participant(
        &mut self,
        condition: Condition,
        person_effect: f64,
        raw_pre: f64,
        raw_post: f64,
    ) {
        let id = self.participants.len();
        self.participants.push(ParticipantRecord {
            id,
            condition,
            person_effect,
        });
        self.observations.push(ObservationRecord {
            participant_id: id,
            occasion: Occasion::Pre,
            raw: raw_pre,
            standardized: None,
        });
        self.observations.push(ObservationRecord {
            participant_id: id,
            occasion: Occasion::Post,
            raw: raw_post,
            standardized: None,
        });
    }

    pub fn participants(&self) -> &[ParticipantRecord] {
        &self.participants
    }

    pub fn observations(&self) -> &[ObservationRecord] {
        &self.observations
    }

    pub(crate) fn observations_mut(&mut self) -> &mut [ObservationRecord] {
        &mut self.observations
    }

    pub fn n_participants(&self) -> usize {
        self.participants.len()
    }

    pub(crate) fn post_mut(&mut self, participant_id: usize) -> &mut ObservationRecord {
        &mut self.observations[2 * participant_id + 1]
    }

    /// Each participant with its pre and post record
    pub fn paired(
        &self,
    ) -> impl Iterator<Item = (&ParticipantRecord, &ObservationRecord, &ObservationRecord)> {
        self.participants
            .iter()
            .zip(self.observations.chunks_exact(2))
            .map(|(p, pair)| (p, &pair[0], &pair[1]))
    }

    pub fn n_in_condition(&self, condition: Condition) -> usize {
        self.participants
            .iter()
            .filter(|p| p.condition == condition)
            .count()
    }

    /// Number of rows at `occasion` without a standardized outcome
    pub fn n_missing(&self, occasion: Occasion) -> usize {
        self.observations
            .iter()
            .filter(|o| o.occasion == occasion && o.standardized.is_none())
            .count()
    }
}
