use log::debug;
use std::collections::HashMap;

use super::elo::{settle_singles, settle_team};
use super::types::{RatingChange, RatingDelta, RatingSnapshot, SettlementBatch};
use crate::config::settings::RatingSettings;
use crate::domain::{MatchResult, ParticipantId, RatingHistoryEntry};
use crate::errors::{EngineError, EngineResult};

/// Computes the rating batch for a confirmed result. Applying it is the caller's job.
pub fn build_settlement(
    result: &MatchResult,
    snapshots: &[RatingSnapshot],
    config: &RatingSettings,
) -> EngineResult<SettlementBatch> {
    result.validate()?;

    let by_id: HashMap<ParticipantId, RatingSnapshot> = snapshots
        .iter()
        .map(|s| (s.participant_id, *s))
        .collect();
    let winners = collect_side(&result.winner_participant_ids, &by_id)?;
    let losers = collect_side(&result.loser_participant_ids, &by_id)?;

    let deltas = compute_deltas(&winners, &losers, config);
    let changes = build_changes(&deltas, &by_id, winners.len());
    let history = build_history(result, &changes);

    debug!(
        "Settled result {}: {} rating changes",
        result.id,
        changes.len()
    );

    Ok(SettlementBatch {
        result_id: result.id,
        changes,
        history,
    })
}

fn collect_side(
    ids: &[ParticipantId],
    by_id: &HashMap<ParticipantId, RatingSnapshot>,
) -> EngineResult<Vec<RatingSnapshot>> {
    ids.iter()
        .map(|id| {
            by_id.get(id).copied().ok_or_else(|| {
                EngineError::invalid("a player in this result has no rating record")
            })
        })
        .collect()
}

fn compute_deltas(
    winners: &[RatingSnapshot],
    losers: &[RatingSnapshot],
    config: &RatingSettings,
) -> Vec<RatingDelta> {
    if let ([winner], [loser]) = (winners, losers) {
        let (delta_winner, delta_loser) = settle_singles(winner, loser, config);
        return vec![
            RatingDelta {
                participant_id: winner.participant_id,
                delta: delta_winner,
            },
            RatingDelta {
                participant_id: loser.participant_id,
                delta: delta_loser,
            },
        ];
    }
    settle_team(winners, losers, config)
}

fn build_changes(
    deltas: &[RatingDelta],
    by_id: &HashMap<ParticipantId, RatingSnapshot>,
    winner_count: usize,
) -> Vec<RatingChange> {
    deltas
        .iter()
        .enumerate()
        .map(|(idx, d)| {
            let before = by_id.get(&d.participant_id).map(|s| s.rating).unwrap_or(0);
            RatingChange {
                participant_id: d.participant_id,
                before,
                after: before + d.delta,
                delta: d.delta,
                won: idx < winner_count,
            }
        })
        .collect()
}

fn build_history(result: &MatchResult, changes: &[RatingChange]) -> Vec<RatingHistoryEntry> {
    changes
        .iter()
        .map(|c| RatingHistoryEntry {
            participant_id: c.participant_id,
            match_ref: result.id,
            before: c.before,
            after: c.after,
            delta: c.delta,
        })
        .collect()
}
