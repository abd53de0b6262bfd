//! Route-level behaviour: envelopes, status codes, auth and permissions.

use chrono::{DateTime, Duration, TimeZone, Utc};
use courtside::client::{ClientError, Mailer};
use courtside::domain::RoleType;
use courtside::http::{App, HttpReply, HttpRequest};
use courtside::raw_row;
use courtside::row::RawRow;
use courtside::security::{Credentials, Sha256Credentials};
use courtside::test_helpers::MockEngine;
use courtside::value::Value;
use fake::faker::internet::en::{Password, SafeEmail};
use fake::Fake;
use serde_json::json;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SECRET: &str = "route-test-secret";

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn credentials() -> Sha256Credentials {
    Sha256Credentials::new(SECRET, 3600)
}

fn app(engine: &Arc<MockEngine>) -> App {
    App::new(engine.clone(), Arc::new(credentials())).with_clock(fixed_now)
}

fn bearer(account_id: i32, role: RoleType) -> String {
    format!("Bearer {}", credentials().issue_token(account_id, role, fixed_now()))
}

fn post_json(path: &str, body: serde_json::Value) -> HttpRequest {
    HttpRequest::new("POST", path).with_body(body.to_string())
}

fn error_kind(reply: &HttpReply) -> serde_json::Value {
    reply.body_json()["error"].clone()
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, Uuid)>>,
}

impl Mailer for RecordingMailer {
    fn send_verification(&self, to: &str, code: Uuid) -> Result<(), ClientError> {
        self.sent.lock().unwrap().push((to.to_string(), code));
        Ok(())
    }

    fn send_password_reset(&self, to: &str, code: Uuid) -> Result<(), ClientError> {
        self.sent.lock().unwrap().push((to.to_string(), code));
        Ok(())
    }
}

fn stadium_row(owner_id: i32) -> RawRow {
    raw_row![
        3,
        "Riverside",
        1,
        owner_id,
        None::<String>,
        None::<String>,
        121.5,
        25.0,
        "Taipei",
        "Da'an",
        true,
        Value::Null,
        Value::Null,
    ]
}

#[test]
fn health_and_unknown_routes() {
    let engine = Arc::new(MockEngine::new());
    let app = app(&engine);

    let reply = app.handle(&HttpRequest::new("GET", "/health"));
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body_json(), json!({ "data": { "health": "ok" }, "error": null }));

    let reply = app.handle(&HttpRequest::new("DELETE", "/stadium/1"));
    assert_eq!(reply.status, 404);
    assert_eq!(error_kind(&reply), "NotFound");
}

#[test]
fn non_numeric_path_id_is_illegal_input() {
    let engine = Arc::new(MockEngine::new());
    let reply = app(&engine).handle(&HttpRequest::new("GET", "/venue/abc"));
    assert_eq!(reply.status, 422);
    assert!(engine.statements().is_empty());
}

#[test]
fn login_with_unknown_email_clears_session() {
    let engine = Arc::new(MockEngine::new());
    engine.push_rows(vec![]);
    let email: String = SafeEmail().fake();

    let reply = app(&engine).handle(&post_json(
        "/login",
        json!({ "email": email, "password": "whatever" }),
    ));

    assert_eq!(reply.status, 401);
    assert_eq!(error_kind(&reply), "LoginFailed");
    assert!(reply.clear_session);
}

#[test]
fn login_returns_a_token_the_app_accepts() {
    let engine = Arc::new(MockEngine::new());
    let password: String = Password(8..16).fake();
    let stored = credentials().hash_password(&password);
    engine.push_row(raw_row![12, stored, "provider"]);
    let app = app(&engine);

    let reply = app.handle(&post_json(
        "/login",
        json!({ "email": "owner@example.com", "password": password }),
    ));
    assert_eq!(reply.status, 200);
    let body = reply.body_json();
    assert_eq!(body["data"]["account_id"], 12);

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let req = HttpRequest::new("GET", "/").with_header("Authorization", &format!("Bearer {token}"));
    let claims = app.authenticate(&req).unwrap();
    assert_eq!(claims.account_id, 12);
    assert_eq!(claims.role, RoleType::Provider);
}

#[test]
fn login_with_wrong_password_fails() {
    let engine = Arc::new(MockEngine::new());
    engine.push_row(raw_row![12, credentials().hash_password("right"), "normal"]);

    let reply = app(&engine).handle(&post_json(
        "/login",
        json!({ "email": "player@example.com", "password": "wrong" }),
    ));
    assert_eq!(error_kind(&reply), "LoginFailed");
}

#[test]
fn add_account_sends_verification_mail() {
    let engine = Arc::new(MockEngine::new());
    let code = Uuid::new_v4();
    engine.push_row(raw_row![5]);
    engine.push_row(raw_row![code]);
    let mailer = Arc::new(RecordingMailer::default());
    let app = app(&engine).with_mailer(mailer.clone());

    let reply = app.handle(&post_json(
        "/account",
        json!({
            "email": "new@example.com",
            "password": "secret",
            "nickname": "newbie",
            "gender": "female",
            "role": "normal",
        }),
    ));

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body_json()["data"]["id"], 5);
    assert_eq!(
        *mailer.sent.lock().unwrap(),
        vec![("new@example.com".to_string(), code)]
    );
}

#[test]
fn add_account_with_taken_email_is_email_exists() {
    let engine = Arc::new(MockEngine::new());
    engine.push_error(MockEngine::unique_violation());

    let reply = app(&engine).handle(&post_json(
        "/account",
        json!({
            "email": "taken@example.com",
            "password": "secret",
            "nickname": "dup",
            "gender": "male",
            "role": "normal",
        }),
    ));

    assert_eq!(reply.status, 409);
    assert_eq!(error_kind(&reply), "EmailExists");
}

#[test]
fn email_verification_code_must_be_a_uuid() {
    let engine = Arc::new(MockEngine::new());
    let reply = app(&engine).handle(&HttpRequest::new("GET", "/email-verification?code=nope"));
    assert_eq!(reply.status, 422);
    assert_eq!(error_kind(&reply), "IllegalInput");
}

#[test]
fn add_venue_requires_provider_role() {
    let engine = Arc::new(MockEngine::new());
    let req = post_json("/venue", json!({}))
        .with_header("Authorization", &bearer(1, RoleType::Normal));

    let reply = app(&engine).handle(&req);
    assert_eq!(reply.status, 403);
    assert_eq!(error_kind(&reply), "NoPermission");
    assert!(engine.statements().is_empty());
}

#[test]
fn edit_venue_of_another_owner_is_rejected() {
    let engine = Arc::new(MockEngine::new());
    engine.push_row(raw_row![
        9, 3, "Court A", "1F", Some(60), true, false, None::<f64>, None::<String>,
        300, 20, 0, None::<String>, None::<String>, 2, "indoor", 1, true,
    ]);
    engine.push_row(stadium_row(77));
    let req = HttpRequest::new("PATCH", "/venue/9")
        .with_header("Authorization", &bearer(1, RoleType::Provider))
        .with_body(json!({ "name": "Renamed" }).to_string());

    let reply = app(&engine).handle(&req);
    assert_eq!(error_kind(&reply), "NoPermission");
    assert_eq!(engine.statements().len(), 2);
}

#[test]
fn expired_token_is_login_expired() {
    let engine = Arc::new(MockEngine::new());
    let stale = credentials().issue_token(1, RoleType::Normal, fixed_now() - Duration::hours(2));
    let req = HttpRequest::new("GET", "/view/my-reservation")
        .with_header("Authorization", &format!("Bearer {stale}"));

    let reply = app(&engine).handle(&req);
    assert_eq!(reply.status, 401);
    assert_eq!(error_kind(&reply), "LoginExpired");
    assert!(reply.clear_session);
}

#[test]
fn joining_a_full_reservation_is_rejected() {
    let engine = Arc::new(MockEngine::new());
    engine.push_row(raw_row![
        3,
        1,
        2,
        4,
        Utc.with_ymd_and_hms(2024, 5, 2, 18, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 2, 20, 0, 0).unwrap(),
        Vec::<String>::new(),
        "FULL01",
        None::<String>,
        4,
        0,
        true,
        false,
    ]);
    let req = HttpRequest::new("POST", "/reservation/code/FULL01")
        .with_header("Authorization", &bearer(8, RoleType::Normal));

    let reply = app(&engine).handle(&req);
    assert_eq!(reply.status, 409);
    assert_eq!(error_kind(&reply), "ReservationFull");
    assert_eq!(engine.statements().len(), 1);
}

#[test]
fn my_reservations_are_paged_with_status() {
    let engine = Arc::new(MockEngine::new());
    engine.push_rows(vec![raw_row![
        3,
        Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
        "Riverside",
        "Court A",
        true,
        2,
        false,
    ]]);
    engine.push_row(raw_row![1_i64]);
    let req = HttpRequest::new("GET", "/view/my-reservation?limit=5")
        .with_header("Authorization", &bearer(8, RoleType::Normal));

    let reply = app(&engine).handle(&req);
    assert_eq!(reply.status, 200);
    let body = reply.body_json();
    assert_eq!(body["data"]["total_count"], 1);
    assert_eq!(body["data"]["limit"], 5);
    assert_eq!(body["data"]["data"][0]["status"], "ongoing");
    assert_eq!(engine.pending(), 0);
}

#[test]
fn negative_pagination_is_illegal_input() {
    let engine = Arc::new(MockEngine::new());
    let reply = app(&engine).handle(&HttpRequest::new("GET", "/stadium?offset=-3"));
    assert_eq!(reply.status, 422);
    assert!(engine.statements().is_empty());
}

#[test]
fn venue_browse_defaults_to_descending_order() {
    let engine = Arc::new(MockEngine::new());
    engine.push_rows(vec![]);
    engine.push_row(raw_row![0_i64]);

    let reply = app(&engine).handle(&HttpRequest::new("GET", "/venue"));
    assert_eq!(reply.status, 200);
    let statements = engine.statements();
    assert!(statements[0].sql.contains("ORDER BY current_user_count DESC, id"));

    let engine = Arc::new(MockEngine::new());
    engine.push_rows(vec![]);
    engine.push_row(raw_row![0_i64]);
    app(&engine).handle(&HttpRequest::new("GET", "/venue?order=asc"));
    assert!(engine.statements()[0].sql.contains("ORDER BY current_user_count ASC, id"));
}

#[test]
fn reservation_browse_defaults_to_descending_order() {
    let engine = Arc::new(MockEngine::new());
    engine.push_rows(vec![]);

    let reply = app(&engine).handle(&HttpRequest::new("POST", "/view/reservation"));
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body_json()["data"], json!([]));
    let statements = engine.statements();
    assert_eq!(statements.len(), 1);
    assert!(statements[0].sql.contains("ORDER BY reservation.start_time DESC, reservation.id"));

    let engine = Arc::new(MockEngine::new());
    engine.push_rows(vec![]);
    app(&engine).handle(&post_json("/view/reservation", json!({ "sport_id": 1 })));
    assert!(engine.statements()[0].sql.contains("reservation.start_time DESC"));
}
