pub mod opponent;
pub mod resolution;
pub mod view;

pub use opponent::{current_opponent, find_current_opponent};
pub use resolution::resolve_bracket;
pub use view::{
    BracketView, FilledMatch, FilledRound, FilledSide, OpponentStatus, Outcome,
    ResolutionWarning, TournamentState,
};
