//! Dynamic-K Elo for singles and team results

use super::types::{ExperienceLevel, RatingDelta, RatingSnapshot};
use crate::config::settings::RatingSettings;

/// Per-player sensitivity: experience sets the base, high ratings damp it.
pub fn k_factor(player: &RatingSnapshot, config: &RatingSettings) -> f64 {
    let base = experience_k(player.matches_played, config);
    let penalty = tier_penalty(player.rating, config);
    (base - penalty).clamp(config.min_k, config.max_k)
}

fn experience_k(matches_played: i32, config: &RatingSettings) -> f64 {
    let level = ExperienceLevel::from_matches_played(
        matches_played,
        config.new_player_matches,
        config.developing_matches,
    );
    match level {
        ExperienceLevel::Newcomer => config.new_player_k,
        ExperienceLevel::Developing => config.developing_k,
        ExperienceLevel::Seasoned => config.base_k,
    }
}

fn tier_penalty(rating: i32, config: &RatingSettings) -> f64 {
    if rating >= config.high_tier_rating {
        config.high_tier_penalty
    } else if rating >= config.upper_tier_rating {
        config.upper_tier_penalty
    } else {
        0.0
    }
}

pub fn expected_score(own_rating: f64, opponent_rating: f64, config: &RatingSettings) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent_rating - own_rating) / config.logistic_scale))
}

/// Returns (delta_winner, delta_loser); each side uses its own K.
pub fn settle_singles(
    winner: &RatingSnapshot,
    loser: &RatingSnapshot,
    config: &RatingSettings,
) -> (i32, i32) {
    let expected_winner = expected_score(winner.rating as f64, loser.rating as f64, config);
    let expected_loser = expected_score(loser.rating as f64, winner.rating as f64, config);

    let delta_winner = scaled_delta(k_factor(winner, config), 1.0 - expected_winner);
    let delta_loser = scaled_delta(k_factor(loser, config), 0.0 - expected_loser);
    (delta_winner, delta_loser)
}

/// Team expectation comes from average ratings; each member keeps an individual K.
/// Deltas are returned winners first, then losers, in input order.
pub fn settle_team(
    winners: &[RatingSnapshot],
    losers: &[RatingSnapshot],
    config: &RatingSettings,
) -> Vec<RatingDelta> {
    let winner_average = average_rating(winners);
    let loser_average = average_rating(losers);
    let expected_winner = expected_score(winner_average, loser_average, config);
    let expected_loser = expected_score(loser_average, winner_average, config);

    let winner_deltas = winners.iter().map(|p| RatingDelta {
        participant_id: p.participant_id,
        delta: scaled_delta(k_factor(p, config), 1.0 - expected_winner),
    });
    let loser_deltas = losers.iter().map(|p| RatingDelta {
        participant_id: p.participant_id,
        delta: scaled_delta(k_factor(p, config), 0.0 - expected_loser),
    });
    winner_deltas.chain(loser_deltas).collect()
}

fn average_rating(team: &[RatingSnapshot]) -> f64 {
    if team.is_empty() {
        return 0.0;
    }
    let sum: f64 = team.iter().map(|p| p.rating as f64).sum();
    sum / team.len() as f64
}

fn scaled_delta(k: f64, surprise: f64) -> i32 {
    (k * surprise).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64, rating: i32, matches_played: i32) -> RatingSnapshot {
        RatingSnapshot {
            participant_id: id,
            rating,
            matches_played,
        }
    }

    #[test]
    fn k_factor_follows_experience_and_tier() {
        let config = RatingSettings::default();
        assert_eq!(k_factor(&player(1, 1500, 0), &config), 40.0);
        assert_eq!(k_factor(&player(1, 1500, 29), &config), 40.0);
        assert_eq!(k_factor(&player(1, 1500, 30), &config), 28.0);
        assert_eq!(k_factor(&player(1, 1500, 150), &config), 20.0);
        assert_eq!(k_factor(&player(1, 2000, 150), &config), 16.0);
        assert_eq!(k_factor(&player(1, 2250, 150), &config), 12.0);
        assert_eq!(k_factor(&player(1, 2250, 10), &config), 32.0);
    }

    #[test]
    fn k_factor_is_clamped() {
        let config = RatingSettings {
            high_tier_penalty: 30.0,
            ..RatingSettings::default()
        };
        assert_eq!(k_factor(&player(1, 2300, 500), &config), 12.0);
    }

    #[test]
    fn equal_ratings_give_half_expectation() {
        let config = RatingSettings::default();
        assert!((expected_score(1500.0, 1500.0, &config) - 0.5).abs() < 1e-9);
        assert!(expected_score(1700.0, 1500.0, &config) > 0.5);
    }

    #[test]
    fn even_singles_with_equal_k_is_symmetric() {
        let config = RatingSettings::default();
        let (w, l) = settle_singles(&player(1, 1500, 50), &player(2, 1500, 50), &config);
        assert_eq!((w, l), (14, -14));

        let (w, l) = settle_singles(&player(1, 1500, 120), &player(2, 1500, 120), &config);
        assert_eq!((w, l), (10, -10));
    }

    #[test]
    fn upset_moves_more_than_expected_win() {
        let config = RatingSettings::default();
        let (upset, _) = settle_singles(&player(1, 1400, 200), &player(2, 1600, 200), &config);
        let (expected, _) = settle_singles(&player(2, 1600, 200), &player(1, 1400, 200), &config);
        assert!(upset > expected);
    }

    #[test]
    fn singles_uses_independent_k_per_side() {
        let config = RatingSettings::default();
        let (w, l) = settle_singles(&player(1, 1500, 5), &player(2, 1500, 500), &config);
        assert_eq!(w, 20);
        assert_eq!(l, -10);
    }

    #[test]
    fn team_members_share_expectation_but_not_k() {
        let config = RatingSettings::default();
        let winners = [player(1, 1600, 5), player(2, 1400, 300)];
        let losers = [player(3, 1500, 300), player(4, 1500, 300)];
        let deltas = settle_team(&winners, &losers, &config);

        assert_eq!(deltas.len(), 4);
        assert_eq!(deltas[0], RatingDelta { participant_id: 1, delta: 20 });
        assert_eq!(deltas[1], RatingDelta { participant_id: 2, delta: 10 });
        assert_eq!(deltas[2], RatingDelta { participant_id: 3, delta: -10 });
        assert_eq!(deltas[3], RatingDelta { participant_id: 4, delta: -10 });
    }
}
