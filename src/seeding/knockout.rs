//! Knockout skeleton: provisional qualifier seeds and symbolic round labels

use log::debug;

use crate::config::settings::GroupingSettings;
use crate::domain::{Group, KnockoutMatch, KnockoutRound, KnockoutSkeleton, SlotSource};
use crate::errors::{EngineError, EngineResult};

const KNOCKOUT_STAGE: &str = "knockout";

pub fn build_knockout(
    groups: &[Group],
    qualifiers_per_group: usize,
    settings: &GroupingSettings,
) -> EngineResult<KnockoutSkeleton> {
    validate_qualifiers(groups, qualifiers_per_group)?;

    let seeds = qualifier_seeds(groups, qualifiers_per_group);
    let bracket_size = bracket_size_for(seeds.len(), settings.max_bracket_size);
    if bracket_size < 2 {
        return Err(EngineError::invalid(
            "a knockout stage needs at least 2 qualifiers",
        ));
    }
    debug!(
        "{} qualifiers, bracket of {}",
        seeds.len(),
        bracket_size
    );

    // Cutting to a power of two can pair group-mates in round 1 (A1 v A2 for
    // three groups of two qualifiers); their group meeting then decides it.
    Ok(KnockoutSkeleton {
        stage: KNOCKOUT_STAGE.to_string(),
        bracket_size,
        rounds: build_rounds(&seeds[..bracket_size]),
    })
}

fn validate_qualifiers(groups: &[Group], qualifiers_per_group: usize) -> EngineResult<()> {
    if qualifiers_per_group == 0 {
        return Err(EngineError::invalid(
            "at least one player per group must qualify",
        ));
    }
    let smallest = groups.iter().map(|g| g.players.len()).min().unwrap_or(0);
    if qualifiers_per_group > smallest {
        return Err(EngineError::invalid(format!(
            "{} qualifiers per group exceeds the smallest group size of {}",
            qualifiers_per_group, smallest
        )));
    }
    Ok(())
}

/// Rank-major order: every group winner first, then every runner-up, ...
fn qualifier_seeds(groups: &[Group], qualifiers_per_group: usize) -> Vec<SlotSource> {
    (1..=qualifiers_per_group)
        .flat_map(|rank| groups.iter().map(move |g| SlotSource::qualifier(&g.name, rank)))
        .collect()
}

/// Largest power of two not above `min(cap, qualified)`
pub fn bracket_size_for(qualified: usize, cap: usize) -> usize {
    let limit = qualified.min(cap);
    if limit == 0 {
        return 0;
    }
    1usize << (usize::BITS - 1 - limit.leading_zeros())
}

/// Seed numbers in bracket order, e.g. 1,8,4,5,2,7,3,6 for eight.
/// Adjacent pairs sum to `size + 1`; seeds 1 and 2 sit in opposite halves.
pub fn bracket_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let mirror = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, mirror - s]).collect();
    }
    order
}

fn build_rounds(seeds: &[SlotSource]) -> Vec<KnockoutRound> {
    let mut rounds = vec![first_round(seeds)];
    let mut previous_ids = match_ids(&rounds[0]);
    let mut round_number = 1;

    while previous_ids.len() > 1 {
        round_number += 1;
        let round = next_round(round_number, &previous_ids);
        previous_ids = match_ids(&round);
        rounds.push(round);
    }
    rounds
}

fn first_round(seeds: &[SlotSource]) -> KnockoutRound {
    let order = bracket_order(seeds.len());
    let matches = order
        .chunks_exact(2)
        .enumerate()
        .map(|(idx, pair)| KnockoutMatch {
            id: match_id(1, idx + 1),
            home_label: seeds[pair[0] - 1].clone(),
            away_label: seeds[pair[1] - 1].clone(),
        })
        .collect();

    KnockoutRound {
        name: round_name(seeds.len()),
        matches,
    }
}

fn next_round(round_number: usize, previous_ids: &[String]) -> KnockoutRound {
    let matches = previous_ids
        .chunks_exact(2)
        .enumerate()
        .map(|(idx, pair)| KnockoutMatch {
            id: match_id(round_number, idx + 1),
            home_label: SlotSource::winner_of(&pair[0]),
            away_label: SlotSource::winner_of(&pair[1]),
        })
        .collect();

    KnockoutRound {
        name: round_name(previous_ids.len()),
        matches,
    }
}

fn match_ids(round: &KnockoutRound) -> Vec<String> {
    round.matches.iter().map(|m| m.id.clone()).collect()
}

fn match_id(round: usize, index: usize) -> String {
    format!("R{}M{}", round, index)
}

/// Named after the number of players still in.
pub fn round_name(slots: usize) -> String {
    match slots {
        2 => "Final".to_string(),
        4 => "Semifinal".to_string(),
        8 => "Quarterfinal".to_string(),
        n => format!("Round of {}", n),
    }
}
