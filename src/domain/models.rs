use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::score::SetScore;
use crate::errors::{EngineError, EngineResult};

pub type ParticipantId = i64;
pub type ResultId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Round-robin groups only
    GroupOnly,
    /// Round-robin groups feeding a single-elimination bracket
    GroupKnockout,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &str {
        match self {
            TournamentFormat::GroupOnly => "group_only",
            TournamentFormat::GroupKnockout => "group_knockout",
        }
    }

    pub fn has_knockout(&self) -> bool {
        matches!(self, TournamentFormat::GroupKnockout)
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group_only" => Ok(TournamentFormat::GroupOnly),
            "group_knockout" => Ok(TournamentFormat::GroupKnockout),
            other => Err(EngineError::invalid(format!(
                "unknown tournament format '{}'",
                other
            ))),
        }
    }
}

/// Live participant record as kept by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRecord {
    pub id: ParticipantId,
    pub display_name: String,
    pub rating: i32,
    pub points: i32,
    pub matches_played: i32,
    pub wins: i32,
    pub losses: i32,
}

impl ParticipantRecord {
    pub fn snapshot(&self) -> Participant {
        Participant {
            id: self.id,
            display_name: self.display_name.clone(),
            rating_before: self.rating,
            points_before: self.points,
        }
    }
}

/// Immutable snapshot of a participant taken when registration closes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub rating_before: i32,
    pub points_before: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedPlayer {
    #[serde(flatten)]
    pub participant: Participant,
    pub points: i32,
    pub rating: i32,
}

impl SeedPlayer {
    pub fn id(&self) -> ParticipantId {
        self.participant.id
    }

    pub fn name(&self) -> &str {
        &self.participant.display_name
    }
}

impl From<Participant> for SeedPlayer {
    fn from(participant: Participant) -> Self {
        let points = participant.points_before;
        let rating = participant.rating_before;
        Self {
            participant,
            points,
            rating,
        }
    }
}

/// A reported match outcome. Scores in `score_payload` are from the winner's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub id: ResultId,
    pub winner_participant_ids: Vec<ParticipantId>,
    pub loser_participant_ids: Vec<ParticipantId>,
    pub confirmed: bool,
    #[serde(default)]
    pub score_payload: serde_json::Value,
    pub reported_by: ParticipantId,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl MatchResult {
    pub fn validate(&self) -> EngineResult<()> {
        validate_sides(&self.winner_participant_ids, &self.loser_participant_ids)
    }

    pub fn is_singles(&self) -> bool {
        self.winner_participant_ids.len() == 1 && self.loser_participant_ids.len() == 1
    }

    /// (winner, loser) for a singles result
    pub fn singles_pair(&self) -> Option<(ParticipantId, ParticipantId)> {
        if self.is_singles() {
            Some((self.winner_participant_ids[0], self.loser_participant_ids[0]))
        } else {
            None
        }
    }

    pub fn is_between(&self, a: ParticipantId, b: ParticipantId) -> bool {
        match self.singles_pair() {
            Some((w, l)) => (w == a && l == b) || (w == b && l == a),
            None => false,
        }
    }

    pub fn set_score(&self) -> Option<SetScore> {
        SetScore::from_payload(&self.score_payload)
    }

    /// Verification time, falling back to the report time
    pub fn settled_at(&self) -> DateTime<Utc> {
        self.verified_at.unwrap_or(self.created_at)
    }
}

/// Both sides non-empty, equally sized and disjoint
pub fn validate_sides(winners: &[ParticipantId], losers: &[ParticipantId]) -> EngineResult<()> {
    if winners.is_empty() || losers.is_empty() {
        return Err(EngineError::invalid(
            "a result needs at least one winner and one loser",
        ));
    }
    if winners.len() != losers.len() {
        return Err(EngineError::invalid(
            "both sides of a result must field the same number of players",
        ));
    }
    let winner_set: HashSet<_> = winners.iter().collect();
    let loser_set: HashSet<_> = losers.iter().collect();
    if winner_set.len() != winners.len() || loser_set.len() != losers.len() {
        return Err(EngineError::invalid("a player is listed twice on one side"));
    }
    if losers.iter().any(|id| winner_set.contains(id)) {
        return Err(EngineError::invalid(
            "a player cannot be on both the winning and losing side",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingHistoryEntry {
    pub participant_id: ParticipantId,
    pub match_ref: ResultId,
    pub before: i32,
    pub after: i32,
    pub delta: i32,
}
