use serde::Serialize;

use crate::domain::{ParticipantId, ResultId, SlotSource};
use crate::standings::GroupStandings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Winner,
    Loser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentState {
    GroupStage,
    Knockout,
    Finished,
}

/// One side of a knockout match as it stands now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledSide {
    pub source: SlotSource,
    /// Participant name once resolved, otherwise the slot label
    pub label: String,
    pub participant_id: Option<ParticipantId>,
    pub outcome: Option<Outcome>,
    /// Sets from this side's perspective, e.g. "1:3" for the loser of a 3:1
    pub score: Option<String>,
}

impl FilledSide {
    pub fn is_resolved(&self) -> bool {
        self.participant_id.is_some()
    }

    pub fn holds(&self, participant_id: ParticipantId) -> bool {
        self.participant_id == Some(participant_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledMatch {
    pub id: String,
    pub home: FilledSide,
    pub away: FilledSide,
    pub result_id: Option<ResultId>,
    pub winner_id: Option<ParticipantId>,
}

impl FilledMatch {
    pub fn is_decided(&self) -> bool {
        self.winner_id.is_some()
    }

    pub fn loser_id(&self) -> Option<ParticipantId> {
        [&self.home, &self.away]
            .into_iter()
            .find(|s| s.outcome == Some(Outcome::Loser))
            .and_then(|s| s.participant_id)
    }

    /// (own side, other side) when the participant occupies this match
    pub fn sides_for(&self, participant_id: ParticipantId) -> Option<(&FilledSide, &FilledSide)> {
        if self.home.holds(participant_id) {
            Some((&self.home, &self.away))
        } else if self.away.holds(participant_id) {
            Some((&self.away, &self.home))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledRound {
    pub name: String,
    pub matches: Vec<FilledMatch>,
}

/// A confirmed result the engine skipped because it contradicts the grouping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionWarning {
    pub result_id: ResultId,
    pub message: String,
}

/// Bracket and standings recomputed from the payload and the result history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub state: TournamentState,
    pub standings: Vec<GroupStandings>,
    pub rounds: Vec<FilledRound>,
    pub champion: Option<ParticipantId>,
    pub warnings: Vec<ResolutionWarning>,
}

impl BracketView {
    pub fn is_eliminated(&self, participant_id: ParticipantId) -> bool {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .any(|m| m.loser_id() == Some(participant_id))
    }
}

/// Answer to "who must this participant play next"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum OpponentStatus {
    Opponent {
        match_id: String,
        opponent_id: ParticipantId,
    },
    /// Placed but the other side is still open, or not placed yet
    Waiting { match_id: Option<String> },
    Eliminated,
    Finished { champion: bool },
    NotEntered,
}
