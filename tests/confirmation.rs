use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;

use club_tournament::config::settings::RatingSettings;
use club_tournament::database::{
    self, confirm_result, participants, ratings, results, tournaments, ConfirmOutcome, DbConn,
    NewResult,
};
use club_tournament::domain::TournamentFormat;
use club_tournament::errors::EngineError;

fn store() -> (database::DbPool, DbConn) {
    let pool = database::create_memory_pool().unwrap();
    let conn = database::get_connection(&pool).unwrap();
    database::setup::reset_database(&conn).unwrap();
    (pool, conn)
}

fn singles(tournament_id: i64, winner: i64, loser: i64) -> NewResult {
    NewResult {
        tournament_id,
        winner_ids: vec![winner],
        loser_ids: vec![loser],
        score_payload: json!({"sets": [[11, 7], [9, 11], [11, 5], [11, 8]]}),
        reported_by: loser,
    }
}

#[test]
fn second_confirmation_is_a_no_op() {
    let (_pool, mut conn) = store();
    let ann = participants::upsert_participant(&conn, "Ann", 1500, None).unwrap();
    let bob = participants::upsert_participant(&conn, "Bob", 1500, None).unwrap();
    let tournament =
        tournaments::create_tournament(&conn, "Club Night", TournamentFormat::GroupOnly, None)
            .unwrap();
    let reported_at = Utc.with_ymd_and_hms(2024, 9, 14, 19, 0, 0).unwrap();
    let pending = results::report_result(&conn, &singles(tournament.id, ann.id, bob.id), reported_at)
        .unwrap();

    let settings = RatingSettings::default();
    let first = confirm_result(&mut conn, pending.id, &settings, reported_at + Duration::minutes(3))
        .unwrap();
    let ConfirmOutcome::Settled(batch) = first else {
        panic!("first confirmation should settle");
    };
    assert_eq!(batch.changes.len(), 2);
    assert_eq!(batch.changes[0].delta, 20);
    assert_eq!(batch.changes[1].delta, -20);

    let second = confirm_result(&mut conn, pending.id, &settings, reported_at + Duration::minutes(4))
        .unwrap();
    assert_eq!(second, ConfirmOutcome::AlreadyConfirmed);

    let ann = participants::get_by_id(&conn, ann.id).unwrap();
    let bob = participants::get_by_id(&conn, bob.id).unwrap();
    assert_eq!((ann.rating, ann.matches_played, ann.wins), (1520, 1, 1));
    assert_eq!((bob.rating, bob.matches_played, bob.losses), (1480, 1, 1));
    assert_eq!(ratings::list_history(&conn, ann.id).unwrap().len(), 1);
    assert_eq!(ratings::list_history(&conn, bob.id).unwrap()[0].after, 1480);

    let stored = results::get_by_id(&conn, pending.id).unwrap();
    assert!(stored.confirmed);
    assert_eq!(stored.verified_at, Some(reported_at + Duration::minutes(3)));
}

#[test]
fn failed_settlement_leaves_the_result_pending() {
    let (_pool, mut conn) = store();
    let ann = participants::upsert_participant(&conn, "Ann", 1500, None).unwrap();
    let tournament =
        tournaments::create_tournament(&conn, "Club Night", TournamentFormat::GroupOnly, None)
            .unwrap();
    let reported_at = Utc.with_ymd_and_hms(2024, 9, 14, 19, 0, 0).unwrap();
    let orphan = results::report_result(&conn, &singles(tournament.id, ann.id, 999), reported_at)
        .unwrap();

    let err = confirm_result(&mut conn, orphan.id, &RatingSettings::default(), reported_at)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::InputInvalid(_))
    ));
    assert!(!results::get_by_id(&conn, orphan.id).unwrap().confirmed);
    assert_eq!(participants::get_by_id(&conn, ann.id).unwrap().rating, 1500);
}

#[test]
fn unknown_result_is_not_found() {
    let (_pool, mut conn) = store();
    let err = confirm_result(&mut conn, 12, &RatingSettings::default(), Utc::now()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::not_found("result 12"))
    );
}

#[test]
fn rejected_results_disappear() {
    let (_pool, conn) = store();
    let ann = participants::upsert_participant(&conn, "Ann", 1500, None).unwrap();
    let bob = participants::upsert_participant(&conn, "Bob", 1500, None).unwrap();
    let tournament =
        tournaments::create_tournament(&conn, "Club Night", TournamentFormat::GroupOnly, None)
            .unwrap();
    let pending = results::report_result(
        &conn,
        &singles(tournament.id, bob.id, ann.id),
        Utc::now(),
    )
    .unwrap();

    results::reject_result(&conn, pending.id).unwrap();
    assert!(results::list_by_tournament(&conn, tournament.id)
        .unwrap()
        .is_empty());
}

#[test]
fn racing_confirmations_settle_once() {
    let path = std::env::temp_dir().join(format!("club_tournament_race_{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let pool = database::create_pool(path.to_str().unwrap()).unwrap();

    let (ann, bob, pending) = {
        let conn = database::get_connection(&pool).unwrap();
        database::setup::reset_database(&conn).unwrap();
        let ann = participants::upsert_participant(&conn, "Ann", 1500, None).unwrap();
        let bob = participants::upsert_participant(&conn, "Bob", 1500, None).unwrap();
        let tournament =
            tournaments::create_tournament(&conn, "Club Night", TournamentFormat::GroupOnly, None)
                .unwrap();
        let reported_at = Utc.with_ymd_and_hms(2024, 9, 14, 19, 0, 0).unwrap();
        let pending =
            results::report_result(&conn, &singles(tournament.id, ann.id, bob.id), reported_at)
                .unwrap();
        (ann, bob, pending)
    };

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = (0..2)
        .map(|i| {
            let pool = pool.clone();
            let barrier = Arc::clone(&barrier);
            let result_id = pending.id;
            thread::spawn(move || {
                let mut conn = database::get_connection(&pool).unwrap();
                let verified_at = Utc.with_ymd_and_hms(2024, 9, 14, 19, 5, i).unwrap();
                barrier.wait();
                confirm_result(&mut conn, result_id, &RatingSettings::default(), verified_at)
                    .unwrap()
            })
        })
        .collect();
    let outcomes: Vec<ConfirmOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let settled = outcomes
        .iter()
        .filter(|o| matches!(o, ConfirmOutcome::Settled(_)))
        .count();
    assert_eq!(settled, 1);
    assert!(outcomes.contains(&ConfirmOutcome::AlreadyConfirmed));

    let conn = database::get_connection(&pool).unwrap();
    assert_eq!(ratings::list_history(&conn, ann.id).unwrap().len(), 1);
    assert_eq!(ratings::list_history(&conn, bob.id).unwrap().len(), 1);
    assert_eq!(participants::get_by_id(&conn, ann.id).unwrap().rating, 1520);
    assert_eq!(participants::get_by_id(&conn, bob.id).unwrap().matches_played, 1);

    drop(conn);
    drop(pool);
    let _ = std::fs::remove_file(&path);
    let _ = std::fs::remove_file(path.with_extension("db-journal"));
}
