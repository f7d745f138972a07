use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{json_column, to_json, NewResult};
use crate::domain::{MatchResult, ResultId};
use crate::errors::{store_context, EngineError};

const RESULT_COLUMNS: &str =
    "id, winner_ids, loser_ids, confirmed, score_payload, reported_by, created_at, verified_at";

/// Stores an unconfirmed result
pub fn report_result(
    conn: &Connection,
    new_result: &NewResult,
    created_at: DateTime<Utc>,
) -> Result<MatchResult> {
    let sql = format!(
        "INSERT INTO match_results (tournament_id, winner_ids, loser_ids, score_payload, reported_by, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {}",
        RESULT_COLUMNS
    );

    conn.query_row(
        &sql,
        params![
            new_result.tournament_id,
            to_json(&new_result.winner_ids)?,
            to_json(&new_result.loser_ids)?,
            to_json(&new_result.score_payload)?,
            new_result.reported_by,
            created_at
        ],
        parse_result_row,
    )
    .with_context(|| store_context("insert", "match result"))
}

fn parse_result_row(row: &rusqlite::Row) -> rusqlite::Result<MatchResult> {
    Ok(MatchResult {
        id: row.get(0)?,
        winner_participant_ids: json_column(row, 1)?,
        loser_participant_ids: json_column(row, 2)?,
        confirmed: row.get(3)?,
        score_payload: json_column(row, 4)?,
        reported_by: row.get(5)?,
        created_at: row.get(6)?,
        verified_at: row.get(7)?,
    })
}

pub fn find_by_id(conn: &Connection, id: ResultId) -> Result<Option<MatchResult>> {
    let sql = format!("SELECT {} FROM match_results WHERE id = ?1", RESULT_COLUMNS);

    conn.query_row(&sql, params![id], parse_result_row)
        .optional()
        .context("Failed to query match result by id")
}

pub fn get_by_id(conn: &Connection, id: ResultId) -> Result<MatchResult> {
    find_by_id(conn, id)?.ok_or_else(|| EngineError::not_found(format!("result {}", id)).into())
}

pub fn list_by_tournament(conn: &Connection, tournament_id: i64) -> Result<Vec<MatchResult>> {
    let sql = format!(
        "SELECT {} FROM match_results WHERE tournament_id = ?1 ORDER BY id",
        RESULT_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_result_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Flips an unconfirmed result to confirmed; false if it already was
pub fn mark_confirmed(conn: &Connection, id: ResultId, verified_at: DateTime<Utc>) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE match_results SET confirmed = 1, verified_at = ?1 WHERE id = ?2 AND confirmed = 0",
            params![verified_at, id],
        )
        .with_context(|| store_context("confirm", "match result"))?;
    Ok(updated > 0)
}

/// Deletes a pending result. Confirmed results are part of the rating history and stay.
pub fn reject_result(conn: &Connection, id: ResultId) -> Result<MatchResult> {
    let result = get_by_id(conn, id)?;
    if result.confirmed {
        return Err(EngineError::inconsistent(format!(
            "result {} is already confirmed and cannot be rejected",
            id
        ))
        .into());
    }

    conn.execute(
        "DELETE FROM match_results WHERE id = ?1 AND confirmed = 0",
        params![id],
    )
    .with_context(|| store_context("delete", "match result"))?;
    Ok(result)
}
