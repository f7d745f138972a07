pub mod elo;
pub mod settlement;
pub mod types;

pub use elo::{expected_score, k_factor, settle_singles, settle_team};
pub use settlement::build_settlement;
pub use types::{ExperienceLevel, RatingChange, RatingDelta, RatingSnapshot, SettlementBatch};
