//! Multi-statement persistence flows against the scripted engine.

use chrono::{NaiveTime, TimeZone, Utc};
use courtside::domain::{GenderType, RoleType, WeekTimeRange};
use courtside::persistence::{account, email_verification, reservation, venue};
use courtside::raw_row;
use courtside::test_helpers::MockEngine;
use courtside::value::Value;
use courtside::{DbError, QueryExecutor};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

#[test]
fn register_inserts_account_and_code_in_one_transaction() {
    let engine = MockEngine::new();
    let code = Uuid::new_v4();
    engine.push_row(raw_row![42]);
    engine.push_row(raw_row![code]);
    let db = QueryExecutor::new(&engine);

    let email: String = SafeEmail().fake();
    let nickname: String = Name().fake();
    let (id, issued) = account::register(
        &db,
        &email,
        "salt$hash",
        &nickname,
        GenderType::Unrevealed,
        RoleType::Normal,
    )
    .unwrap();

    assert_eq!((id, issued), (42, code));
    assert_eq!(engine.transaction_log(), vec!["BEGIN", "COMMIT"]);
    let statements = engine.statements();
    assert!(statements[0].sql.starts_with("INSERT INTO account"));
    assert_eq!(statements[0].args[0], Value::Text(email.clone()));
    assert!(statements[1].sql.starts_with("INSERT INTO email_verification"));
    assert_eq!(statements[1].args, vec![Value::Int(42), Value::Text(email)]);
}

#[test]
fn register_with_taken_email_rolls_back() {
    let engine = MockEngine::new();
    engine.push_error(MockEngine::unique_violation());
    let db = QueryExecutor::new(&engine);

    let err = account::register(
        &db,
        "taken@example.com",
        "salt$hash",
        "taken",
        GenderType::Female,
        RoleType::Provider,
    )
    .unwrap_err();

    assert!(matches!(err, DbError::UniqueViolation));
    assert_eq!(engine.transaction_log(), vec!["BEGIN", "ROLLBACK"]);
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn verify_email_with_used_code_touches_no_account() {
    let engine = MockEngine::new();
    engine.push_rows(vec![]);
    let db = QueryExecutor::new(&engine);

    assert!(!email_verification::verify_email(&db, Uuid::new_v4()).unwrap());
    assert_eq!(engine.statements().len(), 1);
    assert_eq!(engine.transaction_log(), vec!["BEGIN", "COMMIT"]);
}

#[test]
fn reset_password_updates_the_code_owner() {
    let engine = MockEngine::new();
    engine.push_row(raw_row![9]);
    engine.push_affected(1);
    let db = QueryExecutor::new(&engine);

    assert_eq!(
        account::reset_password(&db, Uuid::new_v4(), "salt$new").unwrap(),
        Some(9)
    );
    let update = &engine.statements()[1];
    assert!(update.sql.starts_with("UPDATE account"));
    assert_eq!(update.args, vec![Value::Text("salt$new".into()), Value::Int(9)]);
}

#[test]
fn venue_add_writes_business_hours_with_the_new_id() {
    let engine = MockEngine::new();
    engine.push_row(raw_row![17]);
    engine.push_affected(2);
    let db = QueryExecutor::new(&engine);

    let open = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let close = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
    let new_venue: venue::NewVenue = serde_json::from_value(serde_json::json!({
        "stadium_id": 3,
        "name": "Court A",
        "floor": "1F",
        "reservation_interval": 60,
        "is_reservable": true,
        "is_chargeable": false,
        "fee_rate": null,
        "fee_type": null,
        "area": 300,
        "capacity": 20,
        "sport_equipments": null,
        "facilities": null,
        "court_count": 2,
        "court_type": "indoor",
        "sport_id": 1,
    }))
    .unwrap();
    let new_venue = venue::NewVenue {
        business_hours: vec![
            WeekTimeRange { weekday: 1, start_time: open, end_time: close },
            WeekTimeRange { weekday: 2, start_time: open, end_time: close },
        ],
        ..new_venue
    };

    assert_eq!(venue::add(&db, &new_venue).unwrap(), 17);

    let hours = &engine.statements()[1];
    assert!(hours.sql.starts_with("INSERT INTO business_hour"));
    // $1/$2 and $6/$7 are the repeated place_id/place_type of both tuples.
    assert_eq!(hours.args.len(), 10);
    assert_eq!(hours.args[0], Value::Int(17));
    assert_eq!(hours.args[1], Value::Text("venue".into()));
    assert_eq!(hours.args[5], Value::Int(17));
    assert_eq!(engine.transaction_log(), vec!["BEGIN", "COMMIT"]);
}

#[test]
fn join_without_vacancy_adds_no_member() {
    let engine = MockEngine::new();
    engine.push_affected(0);
    let db = QueryExecutor::new(&engine);

    assert!(!reservation::join(&db, 5, 8).unwrap());
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn join_twice_is_a_unique_violation() {
    let engine = MockEngine::new();
    engine.push_affected(1);
    engine.push_error(MockEngine::unique_violation());
    let db = QueryExecutor::new(&engine);

    assert!(matches!(
        reservation::join(&db, 5, 8),
        Err(DbError::UniqueViolation)
    ));
    assert_eq!(engine.transaction_log(), vec!["BEGIN", "ROLLBACK"]);
}

#[test]
fn read_by_code_maps_technical_levels() {
    let engine = MockEngine::new();
    engine.push_row(raw_row![
        3,
        1,
        2,
        4,
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap(),
        vec!["intermediate".to_string()],
        "JOINME",
        Some("bring water"),
        3,
        1,
        true,
        false,
    ]);
    let db = QueryExecutor::new(&engine);

    let found = reservation::read_by_code(&db, "JOINME").unwrap().unwrap();
    assert_eq!(found.vacancy, 1);
    assert_eq!(found.remark.as_deref(), Some("bring water"));
    assert_eq!(found.technical_level.len(), 1);
}
