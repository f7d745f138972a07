pub mod confirmation;
pub mod connection;
pub mod models;
pub mod participants;
pub mod ratings;
pub mod results;
pub mod setup;
pub mod tournaments;

pub use confirmation::{confirm_result, ConfirmOutcome};
pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};
pub use models::*;
