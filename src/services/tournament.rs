use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;

use crate::bracket::{self, BracketView, OpponentStatus};
use crate::config::settings::AppConfig;
use crate::database::{self, ConfirmOutcome, DbConn, DbPool, NewResult, Tournament};
use crate::domain::{
    validate_sides, GroupingPayload, MatchResult, Participant, ParticipantId, ParticipantRecord,
    RatingHistoryEntry, ResultId, TournamentFormat,
};
use crate::errors::EngineError;
use crate::seeding::{self, GroupingRequest};

/// Drives the engine against the SQLite store
pub struct TournamentService {
    config: AppConfig,
    pool: DbPool,
}

impl TournamentService {
    pub fn new(config: AppConfig, pool: DbPool) -> Self {
        Self { config, pool }
    }

    /// Opens the database named by `DATABASE_PATH`
    pub fn open(config: AppConfig) -> Result<Self> {
        let db_path = AppConfig::database_path();
        let pool = database::create_pool(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path))?;
        info!("Using database {}", db_path);
        Ok(Self::new(config, pool))
    }

    fn connection(&self) -> Result<DbConn> {
        database::get_connection(&self.pool)
    }

    pub fn init(&self) -> Result<()> {
        let conn = self.connection()?;
        database::setup::reset_database(&conn)?;
        info!("  → Database schema reset");
        Ok(())
    }

    pub fn add_participant(
        &self,
        display_name: &str,
        rating: Option<i32>,
        points: Option<i32>,
    ) -> Result<ParticipantRecord> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid("a participant needs a display name").into());
        }
        let conn = self.connection()?;
        let rating = rating.unwrap_or(self.config.rating.initial_rating);
        let record = database::participants::upsert_participant(&conn, name, rating, points)?;
        info!("  → Participant {} ({}) rated {}", record.display_name, record.id, record.rating);
        Ok(record)
    }

    pub fn list_participants(&self) -> Result<Vec<ParticipantRecord>> {
        let conn = self.connection()?;
        database::participants::list_all(&conn)
    }

    pub fn create_tournament(
        &self,
        name: &str,
        format: TournamentFormat,
        qualifiers_per_group: Option<usize>,
    ) -> Result<Tournament> {
        if qualifiers_per_group == Some(0) {
            return Err(EngineError::invalid("at least one player per group must qualify").into());
        }
        let conn = self.connection()?;
        let tournament =
            database::tournaments::create_tournament(&conn, name, format, qualifiers_per_group)?;
        info!("  → Created tournament {} '{}' ({})", tournament.id, tournament.name, format);
        Ok(tournament)
    }

    /// Registers each participant once; returns how many were new
    pub fn register(&self, tournament_id: i64, participant_ids: &[ParticipantId]) -> Result<usize> {
        let conn = self.connection()?;
        let mut added = 0;
        for id in participant_ids {
            database::participants::get_by_id(&conn, *id)?;
            if database::tournaments::register_entry(&conn, tournament_id, *id)? {
                added += 1;
            }
        }
        info!("  → Registered {} new participants for tournament {}", added, tournament_id);
        Ok(added)
    }

    /// Snapshots the entries, generates the grouping and publishes it
    pub fn seed(&self, tournament_id: i64, group_count: Option<usize>) -> Result<GroupingPayload> {
        let conn = self.connection()?;
        let tournament = database::tournaments::get_by_id(&conn, tournament_id)?;
        let participants: Vec<Participant> =
            database::participants::list_by_tournament(&conn, tournament_id)?
                .iter()
                .map(ParticipantRecord::snapshot)
                .collect();
        info!("  → Loaded {} entries for '{}'", participants.len(), tournament.name);

        let request = GroupingRequest {
            format: tournament.format,
            qualifiers_per_group: tournament.qualifiers_per_group,
            group_count,
        };
        let payload = seeding::generate_grouping(
            &participants,
            &request,
            &self.config.grouping,
            Utc::now(),
        )?;
        database::tournaments::publish_grouping(&conn, tournament_id, &payload)?;
        info!(
            "  → Published {} groups{}",
            payload.groups.len(),
            payload
                .knockout
                .as_ref()
                .map(|k| format!(" and a bracket of {}", k.bracket_size))
                .unwrap_or_default()
        );
        Ok(payload)
    }

    /// Stores an unconfirmed result between registered participants
    pub fn report(
        &self,
        tournament_id: i64,
        winner_ids: Vec<ParticipantId>,
        loser_ids: Vec<ParticipantId>,
        score_payload: serde_json::Value,
        reported_by: ParticipantId,
    ) -> Result<MatchResult> {
        validate_sides(&winner_ids, &loser_ids)?;
        let conn = self.connection()?;
        let tournament = database::tournaments::get_by_id(&conn, tournament_id)?;
        if !tournament.is_published() {
            return Err(EngineError::invalid(format!(
                "'{}' has no published grouping yet",
                tournament.name
            ))
            .into());
        }
        ensure_entered(&conn, tournament_id, winner_ids.iter().chain(loser_ids.iter()))?;

        let new_result = NewResult {
            tournament_id,
            winner_ids,
            loser_ids,
            score_payload,
            reported_by,
        };
        let stored = database::results::report_result(&conn, &new_result, Utc::now())?;
        info!("  → Result {} awaiting confirmation", stored.id);
        Ok(stored)
    }

    pub fn confirm(&self, result_id: ResultId) -> Result<ConfirmOutcome> {
        let mut conn = self.connection()?;
        database::confirm_result(&mut conn, result_id, &self.config.rating, Utc::now())
    }

    pub fn reject(&self, result_id: ResultId) -> Result<MatchResult> {
        let conn = self.connection()?;
        let rejected = database::results::reject_result(&conn, result_id)?;
        info!("  → Result {} rejected", result_id);
        Ok(rejected)
    }

    pub fn bracket(&self, tournament_id: i64) -> Result<BracketView> {
        let (payload, results) = self.load_progress(tournament_id)?;
        let view = bracket::resolve_bracket(&payload, &results);
        for warning in &view.warnings {
            warn!("Result {}: {}", warning.result_id, warning.message);
        }
        Ok(view)
    }

    pub fn opponent(&self, tournament_id: i64, participant_id: ParticipantId) -> Result<OpponentStatus> {
        let (payload, results) = self.load_progress(tournament_id)?;
        let view = bracket::resolve_bracket(&payload, &results);
        Ok(bracket::current_opponent(&payload, &view, participant_id))
    }

    pub fn history(&self, participant_id: ParticipantId) -> Result<Vec<RatingHistoryEntry>> {
        let conn = self.connection()?;
        database::participants::get_by_id(&conn, participant_id)?;
        database::ratings::list_history(&conn, participant_id)
    }

    fn load_progress(&self, tournament_id: i64) -> Result<(GroupingPayload, Vec<MatchResult>)> {
        let conn = self.connection()?;
        let tournament = database::tournaments::get_by_id(&conn, tournament_id)?;
        let payload = tournament.grouping.ok_or_else(|| {
            EngineError::invalid(format!("'{}' has no published grouping yet", tournament.name))
        })?;
        let results = database::results::list_by_tournament(&conn, tournament_id)?;
        Ok((payload, results))
    }
}

fn ensure_entered<'a>(
    conn: &DbConn,
    tournament_id: i64,
    ids: impl Iterator<Item = &'a ParticipantId>,
) -> Result<()> {
    let entered: HashSet<ParticipantId> =
        database::participants::list_by_tournament(conn, tournament_id)?
            .into_iter()
            .map(|p| p.id)
            .collect();
    for id in ids {
        if !entered.contains(id) {
            return Err(EngineError::invalid(format!(
                "participant {} is not entered in this tournament",
                id
            ))
            .into());
        }
    }
    Ok(())
}
