//! Round-robin standings within one group.
//!
//! Ordering is wins, set differential, sets won, then seed rating. Head-to-head
//! is not consulted. Each pair counts once, at its first meeting.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::domain::{Group, GroupingPayload, MatchResult, ParticipantId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingRow {
    pub rank: usize,
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub set_wins: u32,
    pub set_losses: u32,
}

impl StandingRow {
    pub fn set_differential(&self) -> i64 {
        self.set_wins as i64 - self.set_losses as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStandings {
    pub group: String,
    pub rows: Vec<StandingRow>,
    pub played_pairs: usize,
    pub required_matches: usize,
    pub completed: bool,
}

impl GroupStandings {
    /// Occupant of a finishing place, only once the group is completed
    pub fn qualifier(&self, rank: usize) -> Option<ParticipantId> {
        if !self.completed || rank == 0 {
            return None;
        }
        self.rows.get(rank - 1).map(|r| r.participant_id)
    }
}

pub fn compute_all(payload: &GroupingPayload, results: &[MatchResult]) -> Vec<GroupStandings> {
    payload
        .groups
        .iter()
        .map(|g| compute_standings(g, results))
        .collect()
}

pub fn compute_standings(group: &Group, results: &[MatchResult]) -> GroupStandings {
    let relevant = group_results(group, results);
    let mut rows = initial_rows(group);
    tally(&mut rows, &relevant);

    let mut ordered: Vec<StandingRow> = rows.into_values().collect();
    let seed_position = seed_positions(group);
    ordered.sort_by(|a, b| {
        compare_rows(a, b).then_with(|| {
            seed_position
                .get(&a.participant_id)
                .cmp(&seed_position.get(&b.participant_id))
        })
    });
    for (idx, row) in ordered.iter_mut().enumerate() {
        row.rank = idx + 1;
    }

    let played_pairs = count_played_pairs(&relevant);
    let required = required_matches(group.players.len());
    GroupStandings {
        group: group.name.clone(),
        rows: ordered,
        played_pairs,
        required_matches: required,
        completed: played_pairs >= required,
    }
}

/// Confirmed singles results with both players inside the group, first meeting
/// of each pair only. Later meetings (knockout rematches) leave the table alone.
pub fn group_results<'a>(group: &Group, results: &'a [MatchResult]) -> Vec<&'a MatchResult> {
    let mut first_meetings: HashMap<(ParticipantId, ParticipantId), &'a MatchResult> =
        HashMap::new();
    for result in results.iter().filter(|r| r.confirmed) {
        let Some((w, l)) = result.singles_pair() else {
            continue;
        };
        if !group.contains(w) || !group.contains(l) {
            continue;
        }
        first_meetings
            .entry((w.min(l), w.max(l)))
            .and_modify(|kept| {
                if (result.created_at, result.id) < (kept.created_at, kept.id) {
                    *kept = result;
                }
            })
            .or_insert(result);
    }

    let mut kept: Vec<&MatchResult> = first_meetings.into_values().collect();
    kept.sort_by_key(|r| (r.created_at, r.id));
    kept
}

/// Every pair once; groups of one or none need nothing
pub fn required_matches(group_size: usize) -> usize {
    if group_size <= 1 {
        return 0;
    }
    group_size * (group_size - 1) / 2
}

fn initial_rows(group: &Group) -> HashMap<ParticipantId, StandingRow> {
    group
        .players
        .iter()
        .map(|p| {
            (
                p.id(),
                StandingRow {
                    rank: 0,
                    participant_id: p.id(),
                    display_name: p.name().to_string(),
                    rating: p.rating,
                    wins: 0,
                    losses: 0,
                    set_wins: 0,
                    set_losses: 0,
                },
            )
        })
        .collect()
}

fn seed_positions(group: &Group) -> HashMap<ParticipantId, usize> {
    group
        .players
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.id(), idx))
        .collect()
}

fn tally(rows: &mut HashMap<ParticipantId, StandingRow>, results: &[&MatchResult]) {
    for result in results {
        let Some((winner, loser)) = result.singles_pair() else {
            continue;
        };
        let score = result.set_score();

        if let Some(row) = rows.get_mut(&winner) {
            row.wins += 1;
            if let Some(s) = score {
                row.set_wins += s.winner_sets;
                row.set_losses += s.loser_sets;
            }
        }
        if let Some(row) = rows.get_mut(&loser) {
            row.losses += 1;
            if let Some(s) = score {
                row.set_wins += s.loser_sets;
                row.set_losses += s.winner_sets;
            }
        }
    }
}

fn compare_rows(a: &StandingRow, b: &StandingRow) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.set_differential().cmp(&a.set_differential()))
        .then_with(|| b.set_wins.cmp(&a.set_wins))
        .then_with(|| b.rating.cmp(&a.rating))
}

fn count_played_pairs(results: &[&MatchResult]) -> usize {
    results
        .iter()
        .filter_map(|r| r.singles_pair())
        .map(|(w, l)| (w.min(l), w.max(l)))
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Participant, SeedPlayer};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn group(ratings: &[i32]) -> Group {
        Group {
            name: "A组".to_string(),
            players: ratings
                .iter()
                .enumerate()
                .map(|(i, &rating)| {
                    SeedPlayer::from(Participant {
                        id: i as i64 + 1,
                        display_name: format!("P{}", i + 1),
                        rating_before: rating,
                        points_before: 0,
                    })
                })
                .collect(),
            average_points: 0,
        }
    }

    fn win(id: i64, winner: i64, loser: i64, score: serde_json::Value) -> MatchResult {
        MatchResult {
            id,
            winner_participant_ids: vec![winner],
            loser_participant_ids: vec![loser],
            confirmed: true,
            score_payload: score,
            reported_by: winner,
            created_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, id as u32 % 60).unwrap(),
            verified_at: None,
        }
    }

    fn order(standings: &GroupStandings) -> Vec<i64> {
        standings.rows.iter().map(|r| r.participant_id).collect()
    }

    #[test]
    fn wins_rank_first() {
        let g = group(&[1500, 1500, 1500]);
        let results = vec![
            win(1, 3, 1, json!(null)),
            win(2, 3, 2, json!(null)),
            win(3, 2, 1, json!(null)),
        ];
        let standings = compute_standings(&g, &results);
        assert_eq!(order(&standings), vec![3, 2, 1]);
        assert_eq!(standings.rows[0].rank, 1);
        assert!(standings.completed);
    }

    #[test]
    fn set_differential_breaks_equal_wins() {
        let g = group(&[1500, 1500, 1500]);
        let results = vec![
            win(1, 1, 2, json!({"winnerSets": 3, "loserSets": 0})),
            win(2, 2, 3, json!({"winnerSets": 3, "loserSets": 2})),
            win(3, 3, 1, json!({"winnerSets": 3, "loserSets": 2})),
        ];
        let standings = compute_standings(&g, &results);
        // differentials: P1 +2, P3 0, P2 -2
        assert_eq!(order(&standings), vec![1, 3, 2]);
        assert_eq!(standings.rows[0].set_wins, 5);
    }

    #[test]
    fn sets_won_then_rating_break_remaining_ties() {
        let g = group(&[1400, 1600, 1500, 1500]);
        let results = vec![
            win(1, 1, 3, json!({"winnerSets": 3, "loserSets": 1})),
            win(2, 2, 4, json!({"winnerSets": 2, "loserSets": 0})),
        ];
        let standings = compute_standings(&g, &results);
        assert_eq!(standings.rows[0].participant_id, 1);
        assert_eq!(standings.rows[1].participant_id, 2);

        let no_scores = vec![win(1, 1, 3, json!(null)), win(2, 2, 4, json!(null))];
        let standings = compute_standings(&g, &no_scores);
        assert_eq!(order(&standings)[..2], [2, 1]);
    }

    #[test]
    fn unconfirmed_and_outside_results_are_ignored() {
        let g = group(&[1500, 1500]);
        let mut pending = win(1, 1, 2, json!(null));
        pending.confirmed = false;
        let outsider = win(2, 1, 99, json!(null));
        let standings = compute_standings(&g, &[pending, outsider]);
        assert!(standings.rows.iter().all(|r| r.wins == 0 && r.losses == 0));
        assert!(!standings.completed);
        assert_eq!(standings.qualifier(1), None);
    }

    #[test]
    fn recomputation_is_stable() {
        let g = group(&[1500, 1500, 1500, 1500]);
        let results = vec![win(1, 4, 1, json!(null)), win(2, 2, 3, json!(null))];
        let first = compute_standings(&g, &results);
        let second = compute_standings(&g, &results);
        assert_eq!(first, second);
    }

    #[test]
    fn rematches_do_not_complete_a_group_early() {
        let g = group(&[1500, 1500, 1500]);
        let results = vec![
            win(1, 1, 2, json!(null)),
            win(2, 2, 1, json!(null)),
            win(3, 1, 3, json!(null)),
        ];
        let standings = compute_standings(&g, &results);
        assert_eq!(standings.played_pairs, 2);
        assert!(!standings.completed);
    }

    #[test]
    fn only_the_first_meeting_of_a_pair_counts() {
        let g = group(&[1500, 1500, 1500]);
        let mut results = vec![
            win(1, 1, 2, json!({"winnerSets": 3, "loserSets": 2})),
            win(2, 2, 3, json!({"winnerSets": 3, "loserSets": 0})),
            win(3, 3, 1, json!({"winnerSets": 3, "loserSets": 2})),
        ];
        let before = compute_standings(&g, &results);

        results.push(win(4, 2, 1, json!({"winnerSets": 3, "loserSets": 0})));
        let after = compute_standings(&g, &results);
        assert_eq!(before, after);

        // out-of-order input picks the same first meeting
        results.reverse();
        assert_eq!(compute_standings(&g, &results), before);
    }

    #[test]
    fn tiny_groups_need_no_matches() {
        assert_eq!(required_matches(0), 0);
        assert_eq!(required_matches(1), 0);
        assert_eq!(required_matches(5), 10);
        let standings = compute_standings(&group(&[1500]), &[]);
        assert!(standings.completed);
        assert_eq!(standings.qualifier(1), Some(1));
    }
}
