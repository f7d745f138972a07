//! Confirmation is the one write path that moves ratings.
//!
//! The whole read-check-apply-mark sequence runs inside a `BEGIN IMMEDIATE`
//! transaction, so two concurrent confirmations of the same result settle it once.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

use super::{participants, ratings, results};
use crate::config::settings::RatingSettings;
use crate::domain::{MatchResult, ResultId};
use crate::errors::EngineError;
use crate::rating::{build_settlement, RatingSnapshot, SettlementBatch};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    Settled(SettlementBatch),
    AlreadyConfirmed,
}

pub fn confirm_result(
    conn: &mut Connection,
    result_id: ResultId,
    settings: &RatingSettings,
    verified_at: DateTime<Utc>,
) -> Result<ConfirmOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("Failed to open confirmation transaction")?;

    let result = results::get_by_id(&tx, result_id)?;
    if result.confirmed {
        info!("  → Result {} was already confirmed, nothing to settle", result_id);
        return Ok(ConfirmOutcome::AlreadyConfirmed);
    }

    let snapshots = load_snapshots(&tx, &result)?;
    let batch = build_settlement(&result, &snapshots, settings)?;
    ratings::apply_batch(&tx, &batch, verified_at)?;
    if !results::mark_confirmed(&tx, result_id, verified_at)? {
        return Err(EngineError::inconsistent(format!(
            "result {} changed while it was being confirmed",
            result_id
        ))
        .into());
    }

    tx.commit().context("Failed to commit confirmation")?;
    info!(
        "  → Settled result {} ({} rating changes)",
        result_id,
        batch.changes.len()
    );
    Ok(ConfirmOutcome::Settled(batch))
}

fn load_snapshots(conn: &Connection, result: &MatchResult) -> Result<Vec<RatingSnapshot>> {
    let ids = result
        .winner_participant_ids
        .iter()
        .chain(result.loser_participant_ids.iter());

    let mut snapshots = Vec::new();
    for id in ids {
        if let Some(record) = participants::find_by_id(conn, *id)? {
            snapshots.push(RatingSnapshot::from(&record));
        }
    }
    Ok(snapshots)
}
