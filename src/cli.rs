use clap::{Parser, Subcommand};

use crate::domain::TournamentFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Club tournament progression engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Create (or wipe) the database schema
    Init,
    /// Add a participant, or update the seeding points of an existing one
    AddParticipant {
        #[arg(short, long)]
        name: String,
        /// Starting Elo rating (defaults to 1500, ignored for existing participants)
        #[arg(short, long)]
        rating: Option<i32>,
        /// Seeding points
        #[arg(short, long)]
        points: Option<i32>,
    },
    /// List every participant by rating
    Participants,
    /// Create a tournament in registration
    CreateTournament {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, value_enum, default_value_t = TournamentFormat::GroupKnockout)]
        format: TournamentFormat,
        /// Players advancing from each group (defaults to 2)
        #[arg(short, long)]
        qualifiers: Option<usize>,
    },
    /// Register participants for a tournament
    Register {
        #[arg(short, long)]
        tournament: i64,
        /// Participant ids
        #[arg(required = true)]
        participants: Vec<i64>,
    },
    /// Close registration and publish groups and the knockout skeleton
    Seed {
        #[arg(short, long)]
        tournament: i64,
        /// Override the number of groups
        #[arg(short, long)]
        groups: Option<usize>,
    },
    /// Report a result; it counts once confirmed
    Report {
        #[arg(short, long)]
        tournament: i64,
        /// Winning participant ids, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        winners: Vec<i64>,
        /// Losing participant ids, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        losers: Vec<i64>,
        /// Score JSON, e.g. '{"winnerSets":3,"loserSets":1}'
        #[arg(short, long)]
        score: Option<String>,
        /// Reporting participant (defaults to the first winner)
        #[arg(long)]
        reported_by: Option<i64>,
    },
    /// Confirm a reported result and settle ratings
    Confirm { result: i64 },
    /// Delete a result that was not confirmed yet
    Reject { result: i64 },
    /// Show group standings
    Standings {
        #[arg(short, long)]
        tournament: i64,
        #[arg(long)]
        json: bool,
    },
    /// Show the filled knockout bracket
    Bracket {
        #[arg(short, long)]
        tournament: i64,
        #[arg(long)]
        json: bool,
    },
    /// Show who a participant plays next
    Opponent {
        #[arg(short, long)]
        tournament: i64,
        #[arg(short, long)]
        participant: i64,
    },
    /// Show the rating history of a participant
    History {
        #[arg(short, long)]
        participant: i64,
    },
}
