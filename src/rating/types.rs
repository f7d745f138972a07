use serde::{Deserialize, Serialize};

use crate::domain::{ParticipantId, ParticipantRecord, RatingHistoryEntry, ResultId};

pub type RatingValue = i32;

/// Rating state of one participant right before settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingSnapshot {
    pub participant_id: ParticipantId,
    pub rating: RatingValue,
    pub matches_played: i32,
}

impl From<&ParticipantRecord> for RatingSnapshot {
    fn from(record: &ParticipantRecord) -> Self {
        Self {
            participant_id: record.id,
            rating: record.rating,
            matches_played: record.matches_played,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Newcomer,   // < 30 matches
    Developing, // 30-99 matches
    Seasoned,   // 100+ matches
}

impl ExperienceLevel {
    pub fn from_matches_played(matches: i32, newcomer_below: i32, developing_below: i32) -> Self {
        if matches < newcomer_below {
            ExperienceLevel::Newcomer
        } else if matches < developing_below {
            ExperienceLevel::Developing
        } else {
            ExperienceLevel::Seasoned
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDelta {
    pub participant_id: ParticipantId,
    pub delta: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingChange {
    pub participant_id: ParticipantId,
    pub before: RatingValue,
    pub after: RatingValue,
    pub delta: i32,
    pub won: bool,
}

/// Everything the store must apply, atomically and once, for one confirmed result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementBatch {
    pub result_id: ResultId,
    pub changes: Vec<RatingChange>,
    pub history: Vec<RatingHistoryEntry>,
}
