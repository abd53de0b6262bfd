use crate::domain::{GenderType, RoleType};
use crate::http::error::AppError;
use crate::http::request::{check_email, HttpRequest};
use crate::http::response::{HttpReply, CONTENT_TYPE_HTML};
use crate::http::App;
use crate::persistence::{account, email_verification};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(super) fn default_page() -> HttpReply {
    HttpReply::text(200, CONTENT_TYPE_HTML, r#"<a href="/docs">/docs</a>"#)
}

pub(super) fn health_check() -> HttpReply {
    HttpReply::ok(serde_json::json!({ "health": "ok" }))
}

#[cfg(feature = "metrics")]
pub(super) fn metrics() -> HttpReply {
    use crate::http::response::CONTENT_TYPE_TEXT;
    use crate::metrics::METRICS;

    HttpReply::text(200, CONTENT_TYPE_TEXT, METRICS.render())
}

#[derive(Deserialize)]
struct LoginInput {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginOutput {
    account_id: i32,
    token: String,
}

pub(super) fn login(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let input: LoginInput = req.json()?;
    check_email(&input.email)?;

    let (account_id, pass_hash, role) =
        account::read_by_email(&app.db(), &input.email)?.ok_or(AppError::LoginFailed)?;
    if !app.credentials.verify_password(&input.password, &pass_hash) {
        return Err(AppError::LoginFailed);
    }

    let token = app.credentials.issue_token(account_id, role, app.now());
    Ok(HttpReply::ok(LoginOutput { account_id, token }))
}

#[derive(Deserialize)]
struct AddAccountInput {
    email: String,
    password: String,
    nickname: String,
    gender: GenderType,
    role: RoleType,
}

#[derive(Serialize)]
struct AddAccountOutput {
    id: i32,
}

pub(super) fn add_account(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let input: AddAccountInput = req.json()?;
    check_email(&input.email)?;
    if input.password.is_empty() {
        return Err(AppError::IllegalInput("password must not be empty".to_string()));
    }

    let pass_hash = app.credentials.hash_password(&input.password);
    let (id, code) = account::register(
        &app.db(),
        &input.email,
        &pass_hash,
        &input.nickname,
        input.gender,
        input.role,
    )
    .map_err(|e| match AppError::from(e) {
        AppError::UniqueViolation => AppError::EmailExists,
        other => other,
    })?;

    app.mailer.send_verification(&input.email, code)?;
    Ok(HttpReply::ok(AddAccountOutput { id }))
}

#[derive(Serialize)]
struct SuccessOutput {
    success: bool,
}

pub(super) fn email_verification(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let code: Uuid = req.query_required("code")?;
    if !email_verification::verify_email(&app.db(), code)? {
        return Err(AppError::NotFound);
    }
    Ok(HttpReply::ok(SuccessOutput { success: true }))
}

#[derive(Deserialize)]
struct EmailInput {
    email: String,
}

pub(super) fn resend_email_verification(
    app: &App,
    req: &HttpRequest,
) -> Result<HttpReply, AppError> {
    let input: EmailInput = req.json()?;
    check_email(&input.email)?;
    let db = app.db();

    let (account_id, _, _) =
        account::read_by_email(&db, &input.email)?.ok_or(AppError::NotFound)?;
    let code = match email_verification::read(&db, account_id, &input.email)? {
        Some(code) => code,
        None => email_verification::add(&db, account_id, &input.email)?,
    };

    app.mailer.send_verification(&input.email, code)?;
    Ok(HttpReply::ok(SuccessOutput { success: true }))
}

pub(super) fn forget_password(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let input: EmailInput = req.json()?;
    check_email(&input.email)?;
    let db = app.db();

    let (account_id, _, _) =
        account::read_by_email(&db, &input.email)?.ok_or(AppError::NotFound)?;
    let code = email_verification::add(&db, account_id, &input.email)?;

    app.mailer.send_password_reset(&input.email, code)?;
    Ok(HttpReply::empty())
}

#[derive(Deserialize)]
struct ResetPasswordInput {
    code: Uuid,
    password: String,
}

pub(super) fn reset_password(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let input: ResetPasswordInput = req.json()?;
    if input.password.is_empty() {
        return Err(AppError::IllegalInput("password must not be empty".to_string()));
    }

    let pass_hash = app.credentials.hash_password(&input.password);
    account::reset_password(&app.db(), input.code, &pass_hash)?.ok_or(AppError::NotFound)?;
    Ok(HttpReply::empty())
}
