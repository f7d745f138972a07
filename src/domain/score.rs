use serde_json::Value;

/// Sets won by each side of a result, from the winner's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScore {
    pub winner_sets: u32,
    pub loser_sets: u32,
}

impl SetScore {
    /// Reads `{"sets": [[w, l], ...]}` or `{"winnerSets": w, "loserSets": l}`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        parse_set_list(payload).or_else(|| parse_set_totals(payload))
    }

    pub fn winner_view(&self) -> String {
        format!("{}:{}", self.winner_sets, self.loser_sets)
    }

    pub fn loser_view(&self) -> String {
        format!("{}:{}", self.loser_sets, self.winner_sets)
    }
}

fn parse_set_list(payload: &Value) -> Option<SetScore> {
    let sets = payload.get("sets")?.as_array()?;
    if sets.is_empty() {
        return None;
    }

    let mut score = SetScore {
        winner_sets: 0,
        loser_sets: 0,
    };
    for set in sets {
        let (own, other) = parse_set_points(set)?;
        if own > other {
            score.winner_sets += 1;
        } else if other > own {
            score.loser_sets += 1;
        }
    }
    Some(score)
}

fn parse_set_points(set: &Value) -> Option<(u64, u64)> {
    let pair = set.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    Some((pair[0].as_u64()?, pair[1].as_u64()?))
}

fn parse_set_totals(payload: &Value) -> Option<SetScore> {
    let winner_sets = payload.get("winnerSets")?.as_u64()?;
    let loser_sets = payload.get("loserSets")?.as_u64()?;
    Some(SetScore {
        winner_sets: u32::try_from(winner_sets).ok()?,
        loser_sets: u32::try_from(loser_sets).ok()?,
    })
}
