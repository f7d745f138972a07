use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;

use crate::domain::{GroupingPayload, ParticipantId, TournamentFormat};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: i64,
    pub name: String,
    pub format: TournamentFormat,
    pub qualifiers_per_group: Option<usize>,
    pub grouping: Option<GroupingPayload>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn is_published(&self) -> bool {
        self.grouping.is_some()
    }
}

/// A result as submitted by a player, before anyone confirms it
#[derive(Debug, Clone, PartialEq)]
pub struct NewResult {
    pub tournament_id: i64,
    pub winner_ids: Vec<ParticipantId>,
    pub loser_ids: Vec<ParticipantId>,
    pub score_payload: serde_json::Value,
    pub reported_by: ParticipantId,
}

/// Reads a JSON text column
pub fn json_column<T: DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Reads a nullable JSON text column
pub fn optional_json_column<T: DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        serde_json::from_str(&t).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

/// Reads a text column through `FromStr`
pub fn parsed_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: T::Err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string(value).map_err(anyhow::Error::from)
}
