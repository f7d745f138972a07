//! Terminal views of standings and brackets

use colored::Colorize;

use crate::bracket::{BracketView, FilledMatch, FilledSide, Outcome, TournamentState};
use crate::standings::GroupStandings;

pub fn render_standings(standings: &[GroupStandings]) -> String {
    let mut lines = Vec::new();
    for group in standings {
        let progress = format!("{}/{}", group.played_pairs, group.required_matches);
        let status = if group.completed {
            "completed".green()
        } else {
            progress.as_str().yellow()
        };
        lines.push(format!("{} [{}]", group.group.bold(), status));
        lines.push(format!(
            "  {:>2}  {:<24} {:>5} {:>3} {:>3} {:>7}",
            "#", "Name", "Elo", "W", "L", "Sets"
        ));
        for row in &group.rows {
            lines.push(format!(
                "  {:>2}  {:<24} {:>5} {:>3} {:>3} {:>7}",
                row.rank,
                row.display_name,
                row.rating,
                row.wins,
                row.losses,
                format!("{}:{}", row.set_wins, row.set_losses)
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

pub fn render_bracket(view: &BracketView) -> String {
    let mut lines = vec![format!("State: {}", state_label(view.state))];
    for round in &view.rounds {
        lines.push(String::new());
        lines.push(round.name.bold().to_string());
        for knockout_match in &round.matches {
            lines.push(render_match(knockout_match));
        }
    }
    if let Some(champion) = view.champion {
        let name = view
            .rounds
            .last()
            .and_then(|r| r.matches.first())
            .and_then(|m| m.sides_for(champion))
            .map(|(own, _)| own.label.clone())
            .or_else(|| champion_name(view, champion))
            .unwrap_or_else(|| champion.to_string());
        lines.push(String::new());
        lines.push(format!("Champion: {}", name.green().bold()));
    }
    for warning in &view.warnings {
        lines.push(format!(
            "{} result {}: {}",
            "warning:".red(),
            warning.result_id,
            warning.message
        ));
    }
    lines.join("\n")
}

fn render_match(knockout_match: &FilledMatch) -> String {
    format!(
        "  {:<6} {}  vs  {}",
        knockout_match.id,
        render_side(&knockout_match.home),
        render_side(&knockout_match.away)
    )
}

fn render_side(side: &FilledSide) -> String {
    let score = side
        .score
        .as_ref()
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();
    let text = format!("{}{}", side.label, score);
    match side.outcome {
        Some(Outcome::Winner) => text.green().to_string(),
        Some(Outcome::Loser) => text.dimmed().to_string(),
        None if side.is_resolved() => text,
        None => text.italic().to_string(),
    }
}

fn champion_name(view: &BracketView, champion: i64) -> Option<String> {
    view.standings
        .iter()
        .flat_map(|s| s.rows.iter())
        .find(|r| r.participant_id == champion)
        .map(|r| r.display_name.clone())
}

fn state_label(state: TournamentState) -> &'static str {
    match state {
        TournamentState::GroupStage => "group stage",
        TournamentState::Knockout => "knockout",
        TournamentState::Finished => "finished",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::StandingRow;

    fn standings(completed: bool) -> GroupStandings {
        GroupStandings {
            group: "A组".to_string(),
            rows: vec![StandingRow {
                rank: 1,
                participant_id: 3,
                display_name: "Ann".to_string(),
                rating: 1512,
                wins: 2,
                losses: 0,
                set_wins: 6,
                set_losses: 1,
            }],
            played_pairs: 1,
            required_matches: 3,
            completed,
        }
    }

    #[test]
    fn standings_list_every_row() {
        colored::control::set_override(false);
        let text = render_standings(&[standings(false)]);
        assert!(text.starts_with("A组 [1/3]"));
        assert!(text.contains("Ann"));
        assert!(text.contains("6:1"));
    }

    #[test]
    fn group_only_champion_is_named_from_standings() {
        colored::control::set_override(false);
        let view = BracketView {
            state: TournamentState::Finished,
            standings: vec![standings(true)],
            rounds: Vec::new(),
            champion: Some(3),
            warnings: Vec::new(),
        };
        let text = render_bracket(&view);
        assert!(text.contains("State: finished"));
        assert!(text.contains("Champion: Ann"));
    }
}
