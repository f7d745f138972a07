use crate::domain::TournamentFormat;

const DEFAULT_DATABASE_PATH: &str = "club_tournament.db";

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub initial_rating: i32,
    pub base_k: f64,
    pub new_player_k: f64,
    pub new_player_matches: i32,
    pub developing_k: f64,
    pub developing_matches: i32,
    pub upper_tier_rating: i32,
    pub upper_tier_penalty: f64,
    pub high_tier_rating: i32,
    pub high_tier_penalty: f64,
    pub min_k: f64,
    pub max_k: f64,
    pub logistic_scale: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1500,
            base_k: 20.0,
            new_player_k: 40.0,
            new_player_matches: 30,
            developing_k: 28.0,
            developing_matches: 100,
            upper_tier_rating: 2000,
            upper_tier_penalty: 4.0,
            high_tier_rating: 2200,
            high_tier_penalty: 8.0,
            min_k: 12.0,
            max_k: 48.0,
            logistic_scale: 400.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupingSettings {
    pub knockout_group_size: usize,
    pub group_only_group_size: usize,
    pub max_groups: usize,
    pub default_qualifiers_per_group: usize,
    pub max_bracket_size: usize,
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            knockout_group_size: 4,
            group_only_group_size: 6,
            max_groups: 16,
            default_qualifiers_per_group: 2,
            max_bracket_size: 64,
        }
    }
}

impl GroupingSettings {
    pub fn ideal_group_size(&self, format: TournamentFormat) -> usize {
        match format {
            TournamentFormat::GroupKnockout => self.knockout_group_size,
            TournamentFormat::GroupOnly => self.group_only_group_size,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub grouping: GroupingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            grouping: GroupingSettings::default(),
        }
    }

    pub fn database_path() -> String {
        std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string())
    }
}
