use log::debug;

use super::resolution::resolve_bracket;
use super::view::{BracketView, OpponentStatus, Outcome, TournamentState};
use crate::domain::{GroupingPayload, MatchResult, ParticipantId, SlotSource};

/// Convenience wrapper that recomputes the view first.
pub fn find_current_opponent(
    payload: &GroupingPayload,
    results: &[MatchResult],
    participant_id: ParticipantId,
) -> OpponentStatus {
    let view = resolve_bracket(payload, results);
    current_opponent(payload, &view, participant_id)
}

pub fn current_opponent(
    payload: &GroupingPayload,
    view: &BracketView,
    participant_id: ParticipantId,
) -> OpponentStatus {
    let Some(group) = payload.group_of(participant_id) else {
        return OpponentStatus::NotEntered;
    };

    if view.state == TournamentState::Finished {
        return OpponentStatus::Finished {
            champion: view.champion == Some(participant_id),
        };
    }

    for knockout_match in view.rounds.iter().flat_map(|r| r.matches.iter()) {
        let Some((own, other)) = knockout_match.sides_for(participant_id) else {
            continue;
        };
        match own.outcome {
            Some(Outcome::Winner) => continue,
            Some(Outcome::Loser) => return OpponentStatus::Eliminated,
            None => {}
        }
        debug!(
            "Participant {} pending in {}",
            participant_id, knockout_match.id
        );
        return match other.participant_id {
            Some(opponent) if !view.is_eliminated(opponent) => OpponentStatus::Opponent {
                match_id: knockout_match.id.clone(),
                opponent_id: opponent,
            },
            _ => OpponentStatus::Waiting {
                match_id: Some(knockout_match.id.clone()),
            },
        };
    }

    if missed_the_cut(payload, view, &group.name, participant_id) {
        return OpponentStatus::Eliminated;
    }
    OpponentStatus::Waiting { match_id: None }
}

/// Group finished and the participant's place feeds no bracket slot.
fn missed_the_cut(
    payload: &GroupingPayload,
    view: &BracketView,
    group_name: &str,
    participant_id: ParticipantId,
) -> bool {
    let Some(knockout) = &payload.knockout else {
        return false;
    };
    let Some(standing) = view
        .standings
        .iter()
        .find(|s| s.group == group_name && s.completed)
    else {
        return false;
    };
    let Some(rank) = standing
        .rows
        .iter()
        .find(|r| r.participant_id == participant_id)
        .map(|r| r.rank)
    else {
        return false;
    };

    let has_slot = knockout
        .rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .flat_map(|m| [&m.home_label, &m.away_label])
        .any(|source| match source {
            SlotSource::Qualifier { group, rank: slot_rank } => {
                group == group_name && *slot_rank == rank
            }
            SlotSource::Participant { id, .. } => *id == participant_id,
            SlotSource::WinnerOf { .. } => false,
        });
    !has_slot
}
