use anyhow::{Context, Result};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{optional_json_column, parsed_column, to_json, Tournament};
use crate::domain::{GroupingPayload, ParticipantId, TournamentFormat};
use crate::errors::{store_context, EngineError};

const TOURNAMENT_COLUMNS: &str =
    "id, name, format, qualifiers_per_group, grouping_payload, published_at";

pub fn create_tournament(
    conn: &Connection,
    name: &str,
    format: TournamentFormat,
    qualifiers_per_group: Option<usize>,
) -> Result<Tournament> {
    let sql = format!(
        "INSERT INTO tournaments (name, format, qualifiers_per_group) VALUES (?1, ?2, ?3) RETURNING {}",
        TOURNAMENT_COLUMNS
    );
    let qualifiers = qualifiers_per_group.map(|q| q as i64);

    conn.query_row(&sql, params![name, format.as_str(), qualifiers], parse_tournament_row)
        .with_context(|| store_context("insert", "tournament"))
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    let qualifiers: Option<i64> = row.get(3)?;
    Ok(Tournament {
        id: row.get(0)?,
        name: row.get(1)?,
        format: parsed_column(row, 2)?,
        qualifiers_per_group: qualifiers.map(|q| q as usize),
        grouping: optional_json_column(row, 4)?,
        published_at: row.get(5)?,
    })
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Tournament>> {
    let sql = format!("SELECT {} FROM tournaments WHERE id = ?1", TOURNAMENT_COLUMNS);

    conn.query_row(&sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Tournament> {
    find_by_id(conn, id)?.ok_or_else(|| EngineError::not_found(format!("tournament {}", id)).into())
}

/// Returns false when the participant was already registered
pub fn register_entry(
    conn: &Connection,
    tournament_id: i64,
    participant_id: ParticipantId,
) -> Result<bool> {
    let tournament = get_by_id(conn, tournament_id)?;
    if tournament.is_published() {
        return Err(EngineError::inconsistent(format!(
            "registration for '{}' closed when its grouping was published",
            tournament.name
        ))
        .into());
    }

    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO tournament_entries (tournament_id, participant_id) VALUES (?1, ?2)",
            params![tournament_id, participant_id],
        )
        .with_context(|| store_context("register", "tournament entry"))?;
    Ok(inserted > 0)
}

pub fn count_results(conn: &Connection, tournament_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM match_results WHERE tournament_id = ?1",
        params![tournament_id],
        |row| row.get(0),
    )
    .context("Failed to count tournament results")
}

/// Stores the grouping payload. Refused once any result has been reported.
pub fn publish_grouping(
    conn: &Connection,
    tournament_id: i64,
    payload: &GroupingPayload,
) -> Result<Tournament> {
    let existing = count_results(conn, tournament_id)?;
    if existing > 0 {
        warn!(
            "Refusing to regenerate grouping of tournament {}: {} results exist",
            tournament_id, existing
        );
        return Err(EngineError::inconsistent(
            "the grouping cannot be regenerated once results have been reported",
        )
        .into());
    }

    let sql = format!(
        "UPDATE tournaments SET grouping_payload = ?1, published_at = ?2 WHERE id = ?3 RETURNING {}",
        TOURNAMENT_COLUMNS
    );
    let body = to_json(payload)?;

    conn.query_row(&sql, params![body, payload.generated_at, tournament_id], parse_tournament_row)
        .optional()
        .with_context(|| store_context("publish grouping of", "tournament"))?
        .ok_or_else(|| EngineError::not_found(format!("tournament {}", tournament_id)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::participants::upsert_participant;
    use crate::database::setup::reset_database;
    use chrono::{TimeZone, Utc};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        reset_database(&conn).unwrap();
        conn
    }

    fn empty_payload() -> GroupingPayload {
        GroupingPayload {
            generated_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            format: TournamentFormat::GroupOnly,
            groups: Vec::new(),
            knockout: None,
        }
    }

    #[test]
    fn published_grouping_round_trips_through_the_row() {
        let conn = conn();
        let tournament =
            create_tournament(&conn, "Spring Open", TournamentFormat::GroupOnly, None).unwrap();
        assert!(!tournament.is_published());

        let published = publish_grouping(&conn, tournament.id, &empty_payload()).unwrap();
        assert_eq!(published.grouping, Some(empty_payload()));
        assert_eq!(published.published_at, Some(empty_payload().generated_at));
    }

    #[test]
    fn registration_closes_on_publication() {
        let conn = conn();
        let ann = upsert_participant(&conn, "Ann", 1500, None).unwrap();
        let tournament =
            create_tournament(&conn, "Spring Open", TournamentFormat::GroupOnly, None).unwrap();
        assert!(register_entry(&conn, tournament.id, ann.id).unwrap());
        assert!(!register_entry(&conn, tournament.id, ann.id).unwrap());

        publish_grouping(&conn, tournament.id, &empty_payload()).unwrap();
        let err = register_entry(&conn, tournament.id, ann.id).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::InconsistentState(_))
        ));
    }

    #[test]
    fn missing_tournament_is_not_found() {
        let conn = conn();
        let err = publish_grouping(&conn, 7, &empty_payload()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EngineError>(),
            Some(&EngineError::not_found("tournament 7"))
        );
    }
}
