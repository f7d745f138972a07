use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::models::ParticipantId;
use crate::errors::EngineError;

const WINNER_PREFIX: &str = "胜者";
const RANK_MARKER: &str = "第";
const RANK_SUFFIX: &str = "名";
const PARTICIPANT_MARKER: char = '#';

/// Where the occupant of a bracket side comes from.
///
/// On the wire a source is its label text, so stored payloads keep the
/// `"<group>第 K 名"`, `"胜者 <matchId>"` and `"<name>#<id>"` forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SlotSource {
    /// K-th place of a group
    Qualifier { group: String, rank: usize },
    /// Winner of an earlier knockout match
    WinnerOf { match_id: String },
    /// Already known participant
    Participant { id: ParticipantId, name: String },
}

impl SlotSource {
    pub fn qualifier(group: &str, rank: usize) -> Self {
        SlotSource::Qualifier {
            group: group.to_string(),
            rank,
        }
    }

    pub fn winner_of(match_id: &str) -> Self {
        SlotSource::WinnerOf {
            match_id: match_id.to_string(),
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SlotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotSource::Qualifier { group, rank } => {
                write!(f, "{}{} {} {}", group, RANK_MARKER, rank, RANK_SUFFIX)
            }
            SlotSource::WinnerOf { match_id } => write!(f, "{} {}", WINNER_PREFIX, match_id),
            SlotSource::Participant { id, name } => {
                write!(f, "{}{}{}", name, PARTICIPANT_MARKER, id)
            }
        }
    }
}

impl FromStr for SlotSource {
    type Err = EngineError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        parse_participant(label)
            .or_else(|| parse_winner(label))
            .or_else(|| parse_qualifier(label))
            .ok_or_else(|| EngineError::invalid(format!("unrecognised slot label '{}'", label)))
    }
}

impl TryFrom<String> for SlotSource {
    type Error = EngineError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<SlotSource> for String {
    fn from(source: SlotSource) -> Self {
        source.to_string()
    }
}

fn parse_winner(label: &str) -> Option<SlotSource> {
    let match_id = label.strip_prefix(WINNER_PREFIX)?.trim();
    if match_id.is_empty() || match_id.contains(char::is_whitespace) {
        return None;
    }
    Some(SlotSource::winner_of(match_id))
}

fn parse_qualifier(label: &str) -> Option<SlotSource> {
    let body = label.strip_suffix(RANK_SUFFIX)?;
    let (group, rank) = body.rsplit_once(RANK_MARKER)?;
    let group = group.trim();
    let rank = rank.trim().parse::<usize>().ok()?;
    if group.is_empty() || rank == 0 {
        return None;
    }
    Some(SlotSource::qualifier(group, rank))
}

fn parse_participant(label: &str) -> Option<SlotSource> {
    let (name, id) = label.rsplit_once(PARTICIPANT_MARKER)?;
    let id = id.parse::<ParticipantId>().ok()?;
    if name.is_empty() {
        return None;
    }
    Some(SlotSource::Participant {
        id,
        name: name.to_string(),
    })
}
