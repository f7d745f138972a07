//! Recomputes the knockout bracket from the published payload and every result.
//!
//! Nothing is cached between calls: the same inputs always give the same view.
//! Group tables only count the first meeting of each pair, so knockout rematches
//! between group-mates cannot reshuffle qualifiers. Adding results never
//! un-resolves a decided match unless the same pairing is reported again.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashMap;

use super::view::{
    BracketView, FilledMatch, FilledRound, FilledSide, Outcome, ResolutionWarning, TournamentState,
};
use crate::domain::{
    GroupingPayload, KnockoutMatch, KnockoutRound, MatchResult, ParticipantId, SlotSource,
};
use crate::standings::{self, GroupStandings};

type QualifierMap = HashMap<(String, usize), ParticipantId>;
type WinnerMap = HashMap<String, ParticipantId>;

pub fn resolve_bracket(payload: &GroupingPayload, results: &[MatchResult]) -> BracketView {
    let (usable, warnings) = screen_results(payload, results);
    let standings = standings::compute_all(payload, &usable);
    let qualifiers = qualifier_map(&standings);

    let mut winners = WinnerMap::new();
    let rounds: Vec<FilledRound> = payload
        .knockout
        .iter()
        .flat_map(|k| k.rounds.iter())
        .map(|round| fill_round(round, payload, &usable, &qualifiers, &mut winners))
        .collect();

    let champion = find_champion(payload, &standings, &rounds);
    let state = tournament_state(payload, &standings, &rounds, champion);
    debug!(
        "Resolved bracket: {:?}, {} winners recorded, {} warnings",
        state,
        winners.len(),
        warnings.len()
    );

    BracketView {
        state,
        standings,
        rounds,
        champion,
        warnings,
    }
}

/// Keeps confirmed, well-formed results whose players all belong to the grouping.
fn screen_results(
    payload: &GroupingPayload,
    results: &[MatchResult],
) -> (Vec<MatchResult>, Vec<ResolutionWarning>) {
    let mut usable = Vec::new();
    let mut warnings = Vec::new();

    for result in results.iter().filter(|r| r.confirmed) {
        match check_result(payload, result) {
            Ok(()) => usable.push(result.clone()),
            Err(message) => {
                warn!("Skipping result {}: {}", result.id, message);
                warnings.push(ResolutionWarning {
                    result_id: result.id,
                    message,
                });
            }
        }
    }
    (usable, warnings)
}

fn check_result(payload: &GroupingPayload, result: &MatchResult) -> Result<(), String> {
    result.validate().map_err(|e| e.to_string())?;

    let outsider = result
        .winner_participant_ids
        .iter()
        .chain(result.loser_participant_ids.iter())
        .any(|id| payload.group_of(*id).is_none());
    if outsider {
        return Err("result names a player who is not in any group".to_string());
    }
    Ok(())
}

fn qualifier_map(standings: &[GroupStandings]) -> QualifierMap {
    let mut map = QualifierMap::new();
    for group in standings.iter().filter(|s| s.completed) {
        for row in &group.rows {
            map.insert((group.group.clone(), row.rank), row.participant_id);
        }
    }
    map
}

fn fill_round(
    round: &KnockoutRound,
    payload: &GroupingPayload,
    results: &[MatchResult],
    qualifiers: &QualifierMap,
    winners: &mut WinnerMap,
) -> FilledRound {
    let matches = round
        .matches
        .iter()
        .map(|m| {
            let filled = fill_match(m, payload, results, qualifiers, winners);
            if let Some(winner) = filled.winner_id {
                winners.insert(filled.id.clone(), winner);
            }
            filled
        })
        .collect();

    FilledRound {
        name: round.name.clone(),
        matches,
    }
}

fn fill_match(
    knockout_match: &KnockoutMatch,
    payload: &GroupingPayload,
    results: &[MatchResult],
    qualifiers: &QualifierMap,
    winners: &WinnerMap,
) -> FilledMatch {
    let mut home = open_side(&knockout_match.home_label, payload, qualifiers, winners);
    let mut away = open_side(&knockout_match.away_label, payload, qualifiers, winners);
    let decided = match (home.participant_id, away.participant_id) {
        (Some(h), Some(a)) if h != a => decisive_result(h, a, results, payload.generated_at)
            .and_then(|r| r.singles_pair().map(|(winner, _)| (r, winner))),
        _ => None,
    };

    let mut result_id = None;
    let mut winner_id = None;
    if let Some((result, winner)) = decided {
        record_outcome(&mut home, result, winner);
        record_outcome(&mut away, result, winner);
        result_id = Some(result.id);
        winner_id = Some(winner);
    }

    FilledMatch {
        id: knockout_match.id.clone(),
        home,
        away,
        result_id,
        winner_id,
    }
}

fn open_side(
    source: &SlotSource,
    payload: &GroupingPayload,
    qualifiers: &QualifierMap,
    winners: &WinnerMap,
) -> FilledSide {
    let participant_id = resolve_source(source, qualifiers, winners);
    let label = participant_id
        .and_then(|id| payload.participant_name(id).map(str::to_string))
        .unwrap_or_else(|| match source {
            SlotSource::Participant { name, .. } => name.clone(),
            other => other.label(),
        });

    FilledSide {
        source: source.clone(),
        label,
        participant_id,
        outcome: None,
        score: None,
    }
}

fn resolve_source(
    source: &SlotSource,
    qualifiers: &QualifierMap,
    winners: &WinnerMap,
) -> Option<ParticipantId> {
    match source {
        SlotSource::Qualifier { group, rank } => qualifiers.get(&(group.clone(), *rank)).copied(),
        SlotSource::WinnerOf { match_id } => winners.get(match_id).copied(),
        SlotSource::Participant { id, .. } => Some(*id),
    }
}

/// Latest verified result between the pair reported after the grouping was published.
/// Earlier meetings belong to the group stage.
fn decisive_result<'a>(
    a: ParticipantId,
    b: ParticipantId,
    results: &'a [MatchResult],
    published_at: DateTime<Utc>,
) -> Option<&'a MatchResult> {
    results
        .iter()
        .filter(|r| r.confirmed && r.is_between(a, b) && r.created_at >= published_at)
        .max_by_key(|r| (r.settled_at(), r.id))
}

fn record_outcome(side: &mut FilledSide, result: &MatchResult, winner: ParticipantId) {
    let won = side.participant_id == Some(winner);
    side.outcome = Some(if won { Outcome::Winner } else { Outcome::Loser });
    side.score = result.set_score().map(|s| {
        if won {
            s.winner_view()
        } else {
            s.loser_view()
        }
    });
}

fn find_champion(
    payload: &GroupingPayload,
    standings: &[GroupStandings],
    rounds: &[FilledRound],
) -> Option<ParticipantId> {
    if payload.knockout.is_some() {
        return rounds
            .last()
            .filter(|r| r.matches.len() == 1)
            .and_then(|r| r.matches[0].winner_id);
    }
    match standings {
        [only] => only.qualifier(1),
        _ => None,
    }
}

fn tournament_state(
    payload: &GroupingPayload,
    standings: &[GroupStandings],
    rounds: &[FilledRound],
    champion: Option<ParticipantId>,
) -> TournamentState {
    let groups_done = standings.iter().all(|s| s.completed);
    if payload.knockout.is_none() {
        return if groups_done {
            TournamentState::Finished
        } else {
            TournamentState::GroupStage
        };
    }
    if champion.is_some() {
        return TournamentState::Finished;
    }
    let bracket_started = rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .any(|m| m.home.is_resolved() && m.away.is_resolved());
    if groups_done || bracket_started {
        TournamentState::Knockout
    } else {
        TournamentState::GroupStage
    }
}
