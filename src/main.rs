use anyhow::Result;

use club_tournament::cli::Command;
use club_tournament::{
    handle_add_participant, handle_bracket, handle_confirm, handle_create_tournament,
    handle_history, handle_init, handle_opponent, handle_participants, handle_register,
    handle_reject, handle_report, handle_seed, handle_standings, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::AddParticipant {
            name,
            rating,
            points,
        } => handle_add_participant(name, *rating, *points),
        Command::Participants => handle_participants(),
        Command::CreateTournament {
            name,
            format,
            qualifiers,
        } => handle_create_tournament(name, *format, *qualifiers),
        Command::Register {
            tournament,
            participants,
        } => handle_register(*tournament, participants),
        Command::Seed { tournament, groups } => handle_seed(*tournament, *groups),
        Command::Report {
            tournament,
            winners,
            losers,
            score,
            reported_by,
        } => handle_report(*tournament, winners, losers, score.as_deref(), *reported_by),
        Command::Confirm { result } => handle_confirm(*result),
        Command::Reject { result } => handle_reject(*result),
        Command::Standings { tournament, json } => handle_standings(*tournament, *json),
        Command::Bracket { tournament, json } => handle_bracket(*tournament, *json),
        Command::Opponent {
            tournament,
            participant,
        } => handle_opponent(*tournament, *participant),
        Command::History { participant } => handle_history(*participant),
    }
}
