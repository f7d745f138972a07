pub mod settings;

pub use settings::{AppConfig, GroupingSettings, RatingSettings};
