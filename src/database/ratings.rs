use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::participants;
use crate::domain::{ParticipantId, RatingHistoryEntry};
use crate::errors::store_context;
use crate::rating::SettlementBatch;

pub fn insert_history(
    conn: &Connection,
    entry: &RatingHistoryEntry,
    recorded_at: DateTime<Utc>,
) -> Result<()> {
    let sql = "INSERT INTO rating_history (participant_id, match_ref, rating_before, rating_after, delta, recorded_at) \
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

    conn.execute(
        sql,
        params![
            entry.participant_id,
            entry.match_ref,
            entry.before,
            entry.after,
            entry.delta,
            recorded_at
        ],
    )
    .with_context(|| store_context("insert", "rating history entry"))
    .map(|_| ())
}

fn parse_history_row(row: &rusqlite::Row) -> rusqlite::Result<RatingHistoryEntry> {
    Ok(RatingHistoryEntry {
        participant_id: row.get(0)?,
        match_ref: row.get(1)?,
        before: row.get(2)?,
        after: row.get(3)?,
        delta: row.get(4)?,
    })
}

/// Oldest first
pub fn list_history(conn: &Connection, participant_id: ParticipantId) -> Result<Vec<RatingHistoryEntry>> {
    let sql = "SELECT participant_id, match_ref, rating_before, rating_after, delta \
               FROM rating_history WHERE participant_id = ?1 ORDER BY id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![participant_id], parse_history_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Writes every rating change and history row of the batch. Callers own the transaction.
pub fn apply_batch(
    conn: &Connection,
    batch: &SettlementBatch,
    recorded_at: DateTime<Utc>,
) -> Result<()> {
    for change in &batch.changes {
        participants::apply_change(conn, change)?;
    }
    for entry in &batch.history {
        insert_history(conn, entry, recorded_at)?;
    }
    Ok(())
}
