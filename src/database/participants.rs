use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::domain::{ParticipantId, ParticipantRecord};
use crate::errors::{store_context, EngineError};
use crate::rating::RatingChange;

const PARTICIPANT_COLUMNS: &str = "id, display_name, rating, points, matches_played, wins, losses";

/// Inserts a participant, or refreshes rating/points of an existing one with the same name
pub fn upsert_participant(
    conn: &Connection,
    display_name: &str,
    rating: i32,
    points: Option<i32>,
) -> Result<ParticipantRecord> {
    if let Some(existing) = find_by_name(conn, display_name)? {
        return match points {
            Some(points) => update_points(conn, existing.id, points),
            None => Ok(existing),
        };
    }

    insert_new_participant(conn, display_name, rating, points.unwrap_or(0))
}

fn insert_new_participant(
    conn: &Connection,
    display_name: &str,
    rating: i32,
    points: i32,
) -> Result<ParticipantRecord> {
    let sql = format!(
        "INSERT INTO participants (display_name, rating, points) VALUES (?1, ?2, ?3) RETURNING {}",
        PARTICIPANT_COLUMNS
    );

    conn.query_row(&sql, params![display_name, rating, points], parse_participant_row)
        .with_context(|| store_context("insert", "participant"))
}

fn update_points(conn: &Connection, id: ParticipantId, points: i32) -> Result<ParticipantRecord> {
    let sql = format!(
        "UPDATE participants SET points = ?1 WHERE id = ?2 RETURNING {}",
        PARTICIPANT_COLUMNS
    );

    conn.query_row(&sql, params![points, id], parse_participant_row)
        .with_context(|| store_context("update points of", "participant"))
}

fn parse_participant_row(row: &rusqlite::Row) -> rusqlite::Result<ParticipantRecord> {
    Ok(ParticipantRecord {
        id: row.get(0)?,
        display_name: row.get(1)?,
        rating: row.get(2)?,
        points: row.get(3)?,
        matches_played: row.get(4)?,
        wins: row.get(5)?,
        losses: row.get(6)?,
    })
}

pub fn find_by_id(conn: &Connection, id: ParticipantId) -> Result<Option<ParticipantRecord>> {
    let sql = format!("SELECT {} FROM participants WHERE id = ?1", PARTICIPANT_COLUMNS);

    conn.query_row(&sql, params![id], parse_participant_row)
        .optional()
        .context("Failed to query participant by id")
}

pub fn get_by_id(conn: &Connection, id: ParticipantId) -> Result<ParticipantRecord> {
    find_by_id(conn, id)?
        .ok_or_else(|| EngineError::not_found(format!("participant {}", id)).into())
}

pub fn find_by_name(conn: &Connection, display_name: &str) -> Result<Option<ParticipantRecord>> {
    let sql = format!(
        "SELECT {} FROM participants WHERE display_name = ?1",
        PARTICIPANT_COLUMNS
    );

    conn.query_row(&sql, params![display_name], parse_participant_row)
        .optional()
        .context("Failed to query participant by name")
}

pub fn list_all(conn: &Connection) -> Result<Vec<ParticipantRecord>> {
    let sql = format!(
        "SELECT {} FROM participants ORDER BY rating DESC, id",
        PARTICIPANT_COLUMNS
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], parse_participant_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn list_by_tournament(conn: &Connection, tournament_id: i64) -> Result<Vec<ParticipantRecord>> {
    let sql = "SELECT p.id, p.display_name, p.rating, p.points, p.matches_played, p.wins, p.losses \
               FROM participants p \
               JOIN tournament_entries e ON e.participant_id = p.id \
               WHERE e.tournament_id = ?1 \
               ORDER BY p.id";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_participant_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Writes the new rating and bumps the match counters
pub fn apply_change(conn: &Connection, change: &RatingChange) -> Result<()> {
    let (wins, losses) = if change.won { (1, 0) } else { (0, 1) };
    let sql = "UPDATE participants \
               SET rating = ?1, matches_played = matches_played + 1, wins = wins + ?2, losses = losses + ?3 \
               WHERE id = ?4";

    let updated = conn
        .execute(sql, params![change.after, wins, losses, change.participant_id])
        .with_context(|| store_context("apply rating change to", "participant"))?;
    if updated == 0 {
        return Err(EngineError::not_found(format!("participant {}", change.participant_id)).into());
    }
    Ok(())
}
