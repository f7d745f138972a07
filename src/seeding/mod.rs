pub mod grouping;
pub mod knockout;

pub use grouping::{generate_grouping, rank_for_seeding, snake_distribute, GroupingRequest};
pub use knockout::{bracket_order, bracket_size_for, build_knockout};
