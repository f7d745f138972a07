use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{ParticipantId, SeedPlayer, TournamentFormat};
use super::slot::SlotSource;

/// Published grouping and bracket skeleton. Never mutated once results exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupingPayload {
    pub generated_at: DateTime<Utc>,
    pub format: TournamentFormat,
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knockout: Option<KnockoutSkeleton>,
}

impl GroupingPayload {
    pub fn group_of(&self, participant_id: ParticipantId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(participant_id))
    }

    pub fn participant_name(&self, participant_id: ParticipantId) -> Option<&str> {
        self.groups
            .iter()
            .flat_map(|g| g.players.iter())
            .find(|p| p.id() == participant_id)
            .map(|p| p.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    pub players: Vec<SeedPlayer>,
    pub average_points: i32,
}

impl Group {
    pub fn contains(&self, participant_id: ParticipantId) -> bool {
        self.players.iter().any(|p| p.id() == participant_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutSkeleton {
    pub stage: String,
    pub bracket_size: usize,
    pub rounds: Vec<KnockoutRound>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutRound {
    pub name: String,
    pub matches: Vec<KnockoutMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnockoutMatch {
    pub id: String,
    pub home_label: SlotSource,
    pub away_label: SlotSource,
}
