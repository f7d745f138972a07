pub mod models;
pub mod payload;
pub mod score;
pub mod slot;

pub use models::*;
pub use payload::*;
pub use score::SetScore;
pub use slot::SlotSource;
