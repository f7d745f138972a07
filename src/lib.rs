pub mod bracket;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod rating;
pub mod render;
pub mod seeding;
pub mod services;
pub mod standings;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use serde::Serialize;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::database::ConfirmOutcome;
use crate::domain::{ParticipantId, ResultId, TournamentFormat};
use crate::errors::with_parse_context;
use crate::services::tournament::TournamentService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn open_service() -> Result<TournamentService> {
    let config = AppConfig::new();
    TournamentService::open(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

pub fn handle_init() -> Result<()> {
    open_service()?.init()
}

pub fn handle_add_participant(name: &str, rating: Option<i32>, points: Option<i32>) -> Result<()> {
    let record = open_service()?.add_participant(name, rating, points)?;
    print_json(&record)
}

pub fn handle_participants() -> Result<()> {
    let records = open_service()?.list_participants()?;
    print_json(&records)
}

pub fn handle_create_tournament(
    name: &str,
    format: TournamentFormat,
    qualifiers: Option<usize>,
) -> Result<()> {
    let tournament = open_service()?.create_tournament(name, format, qualifiers)?;
    print_json(&tournament)
}

pub fn handle_register(tournament: i64, participants: &[ParticipantId]) -> Result<()> {
    let added = open_service()?.register(tournament, participants)?;
    println!("Registered {} new participants", added);
    Ok(())
}

pub fn handle_seed(tournament: i64, groups: Option<usize>) -> Result<()> {
    let payload = open_service()?.seed(tournament, groups)?;
    print_json(&payload)
}

pub fn handle_report(
    tournament: i64,
    winners: &[ParticipantId],
    losers: &[ParticipantId],
    score: Option<&str>,
    reported_by: Option<ParticipantId>,
) -> Result<()> {
    let score_payload: serde_json::Value = match score {
        Some(text) => with_parse_context(serde_json::from_str(text), "score JSON")?,
        None => serde_json::Value::Null,
    };
    let reporter = reported_by
        .or_else(|| winners.first().copied())
        .context("A result needs a reporting participant")?;
    let result = open_service()?.report(
        tournament,
        winners.to_vec(),
        losers.to_vec(),
        score_payload,
        reporter,
    )?;
    print_json(&result)
}

pub fn handle_confirm(result: ResultId) -> Result<()> {
    match open_service()?.confirm(result)? {
        ConfirmOutcome::Settled(batch) => print_json(&batch),
        ConfirmOutcome::AlreadyConfirmed => {
            println!("Result {} was already confirmed", result);
            Ok(())
        }
    }
}

pub fn handle_reject(result: ResultId) -> Result<()> {
    let rejected = open_service()?.reject(result)?;
    println!("Rejected result {}", rejected.id);
    Ok(())
}

pub fn handle_standings(tournament: i64, json: bool) -> Result<()> {
    let view = open_service()?.bracket(tournament)?;
    if json {
        return print_json(&view.standings);
    }
    println!("{}", render::render_standings(&view.standings));
    Ok(())
}

pub fn handle_bracket(tournament: i64, json: bool) -> Result<()> {
    let view = open_service()?.bracket(tournament)?;
    if json {
        return print_json(&view);
    }
    println!("{}", render::render_bracket(&view));
    Ok(())
}

pub fn handle_opponent(tournament: i64, participant: ParticipantId) -> Result<()> {
    let status = open_service()?.opponent(tournament, participant)?;
    print_json(&status)
}

pub fn handle_history(participant: ParticipantId) -> Result<()> {
    let history = open_service()?.history(participant)?;
    print_json(&history)
}
