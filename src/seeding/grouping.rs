//! Snake distribution of ranked participants into round-robin groups

use chrono::{DateTime, Utc};
use log::{debug, info};

use super::knockout::build_knockout;
use crate::config::settings::GroupingSettings;
use crate::domain::{Group, GroupingPayload, Participant, SeedPlayer, TournamentFormat};
use crate::errors::{EngineError, EngineResult};

const GROUP_SUFFIX: &str = "组";

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingRequest {
    pub format: TournamentFormat,
    /// Falls back to the configured default when absent
    pub qualifiers_per_group: Option<usize>,
    /// Overrides the size-derived group count
    pub group_count: Option<usize>,
}

impl GroupingRequest {
    pub fn new(format: TournamentFormat) -> Self {
        Self {
            format,
            qualifiers_per_group: None,
            group_count: None,
        }
    }
}

/// Builds the immutable payload published when registration closes.
pub fn generate_grouping(
    participants: &[Participant],
    request: &GroupingRequest,
    settings: &GroupingSettings,
    generated_at: DateTime<Utc>,
) -> EngineResult<GroupingPayload> {
    if participants.len() < 2 {
        return Err(EngineError::invalid(
            "cannot generate grouping: fewer than 2 participants",
        ));
    }

    let seeded = rank_for_seeding(participants);
    let group_count = resolve_group_count(seeded.len(), request, settings)?;
    let groups = build_groups(snake_distribute(seeded, group_count));
    info!(
        "  → Distributed {} participants into {} groups",
        participants.len(),
        groups.len()
    );

    let knockout = if request.format.has_knockout() {
        let qualifiers = request
            .qualifiers_per_group
            .unwrap_or(settings.default_qualifiers_per_group);
        Some(build_knockout(&groups, qualifiers, settings)?)
    } else {
        None
    };

    Ok(GroupingPayload {
        generated_at,
        format: request.format,
        groups,
        knockout,
    })
}

/// Orders by points then rating, both descending. Ties keep the caller's order.
pub fn rank_for_seeding(participants: &[Participant]) -> Vec<SeedPlayer> {
    let mut seeded: Vec<SeedPlayer> = participants.iter().cloned().map(SeedPlayer::from).collect();
    seeded.sort_by(|a, b| b.points.cmp(&a.points).then(b.rating.cmp(&a.rating)));
    seeded
}

fn resolve_group_count(
    total: usize,
    request: &GroupingRequest,
    settings: &GroupingSettings,
) -> EngineResult<usize> {
    match request.group_count {
        Some(count) => validate_group_count(count, total, settings),
        None => {
            let ideal = settings.ideal_group_size(request.format).max(1);
            Ok(total.div_ceil(ideal).clamp(1, settings.max_groups))
        }
    }
}

fn validate_group_count(count: usize, total: usize, settings: &GroupingSettings) -> EngineResult<usize> {
    if count == 0 || count > settings.max_groups {
        return Err(EngineError::invalid(format!(
            "group count must be between 1 and {}",
            settings.max_groups
        )));
    }
    if count > total {
        return Err(EngineError::invalid(format!(
            "cannot split {} participants into {} groups",
            total, count
        )));
    }
    Ok(count)
}

/// Round 0 fills groups left to right, round 1 right to left, and so on.
pub fn snake_distribute(seeded: Vec<SeedPlayer>, group_count: usize) -> Vec<Vec<SeedPlayer>> {
    let group_count = group_count.max(1);
    let mut buckets: Vec<Vec<SeedPlayer>> = vec![Vec::new(); group_count];

    for (idx, player) in seeded.into_iter().enumerate() {
        let target = snake_position(idx, group_count);
        buckets[target].push(player);
    }

    debug!(
        "Snake sizes: {:?}",
        buckets.iter().map(Vec::len).collect::<Vec<_>>()
    );
    buckets
}

fn snake_position(idx: usize, group_count: usize) -> usize {
    let round = idx / group_count;
    let offset = idx % group_count;
    if round % 2 == 0 {
        offset
    } else {
        group_count - 1 - offset
    }
}

fn build_groups(buckets: Vec<Vec<SeedPlayer>>) -> Vec<Group> {
    buckets
        .into_iter()
        .enumerate()
        .map(|(idx, players)| Group {
            name: group_name(idx),
            average_points: average_points(&players),
            players,
        })
        .collect()
}

pub fn group_name(idx: usize) -> String {
    let letter = (b'A' + (idx % 26) as u8) as char;
    format!("{}{}", letter, GROUP_SUFFIX)
}

fn average_points(players: &[SeedPlayer]) -> i32 {
    if players.is_empty() {
        return 0;
    }
    let sum: i64 = players.iter().map(|p| p.points as i64).sum();
    (sum as f64 / players.len() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn participants(count: usize) -> Vec<Participant> {
        (0..count)
            .map(|i| Participant {
                id: i as i64 + 1,
                display_name: format!("Player {}", i + 1),
                rating_before: 1500 - i as i32,
                points_before: 1000 - 10 * i as i32,
            })
            .collect()
    }

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn snake_keeps_group_sizes_within_one() {
        for total in 2..=64 {
            for groups in 1..=total.min(16) {
                let seeded = rank_for_seeding(&participants(total));
                let buckets = snake_distribute(seeded, groups);
                let sizes: Vec<usize> = buckets.iter().map(Vec::len).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "{} into {}: {:?}", total, groups, sizes);

                let ids: HashSet<i64> = buckets.iter().flatten().map(|p| p.id()).collect();
                assert_eq!(ids.len(), total);
            }
        }
    }

    #[test]
    fn snake_reverses_every_other_round() {
        let seeded = rank_for_seeding(&participants(8));
        let buckets = snake_distribute(seeded, 3);
        let ids: Vec<Vec<i64>> = buckets
            .iter()
            .map(|b| b.iter().map(|p| p.id()).collect())
            .collect();
        assert_eq!(ids, vec![vec![1, 6, 7], vec![2, 5, 8], vec![3, 4]]);
    }

    #[test]
    fn nine_players_group_only_gives_two_groups() {
        let request = GroupingRequest::new(TournamentFormat::GroupOnly);
        let payload = generate_grouping(
            &participants(9),
            &request,
            &GroupingSettings::default(),
            published(),
        )
        .unwrap();

        let sizes: Vec<usize> = payload.groups.iter().map(|g| g.players.len()).collect();
        assert_eq!(sizes, vec![5, 4]);
        assert_eq!(payload.groups[0].name, "A组");
        assert!(payload.knockout.is_none());
    }

    #[test]
    fn ranks_by_points_then_rating() {
        let mut list = participants(3);
        list[2].points_before = 5000;
        list[0].points_before = list[1].points_before;
        list[0].rating_before = 1000;
        let order: Vec<i64> = rank_for_seeding(&list).iter().map(|p| p.id()).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn average_points_is_rounded_mean() {
        let payload = generate_grouping(
            &participants(4),
            &GroupingRequest {
                group_count: Some(1),
                ..GroupingRequest::new(TournamentFormat::GroupOnly)
            },
            &GroupingSettings::default(),
            published(),
        )
        .unwrap();
        assert_eq!(payload.groups[0].average_points, 985);
    }

    #[test]
    fn group_count_is_capped() {
        let payload = generate_grouping(
            &participants(100),
            &GroupingRequest::new(TournamentFormat::GroupOnly),
            &GroupingSettings {
                group_only_group_size: 3,
                ..GroupingSettings::default()
            },
            published(),
        )
        .unwrap();
        assert_eq!(payload.groups.len(), 16);
    }

    #[test]
    fn rejects_too_few_participants() {
        let err = generate_grouping(
            &participants(1),
            &GroupingRequest::new(TournamentFormat::GroupOnly),
            &GroupingSettings::default(),
            published(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot generate grouping: fewer than 2 participants"
        );
    }

    #[test]
    fn rejects_more_groups_than_participants() {
        let err = generate_grouping(
            &participants(3),
            &GroupingRequest {
                group_count: Some(4),
                ..GroupingRequest::new(TournamentFormat::GroupOnly)
            },
            &GroupingSettings::default(),
            published(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InputInvalid(_)));
    }
}
