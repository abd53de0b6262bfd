//! Route table.

mod public;
mod reservation;
mod stadium;
mod venue;
mod view;

use crate::http::error::AppError;
use crate::http::request::HttpRequest;
use crate::http::response::HttpReply;
use crate::http::App;

pub(crate) fn route(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let segments: Vec<&str> = req
        .path
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (req.method.as_str(), segments.as_slice()) {
        ("GET", []) => Ok(public::default_page()),
        ("GET", ["health"]) => Ok(public::health_check()),
        #[cfg(feature = "metrics")]
        ("GET", ["metrics"]) => Ok(public::metrics()),
        ("POST", ["login"]) => public::login(app, req),
        ("POST", ["account"]) => public::add_account(app, req),
        ("GET" | "POST", ["email-verification"]) => public::email_verification(app, req),
        ("POST", ["email-verification", "resend"]) => public::resend_email_verification(app, req),
        ("POST", ["forget-password"]) => public::forget_password(app, req),
        ("POST", ["reset-password"]) => public::reset_password(app, req),

        ("GET", ["stadium"]) => stadium::browse_stadium(app, req),
        ("GET", ["stadium", id]) => stadium::read_stadium(app, path_id(id)?),

        ("GET", ["venue"]) => venue::browse_venue(app, req),
        ("POST", ["venue"]) => venue::add_venue(app, req),
        ("GET", ["venue", id]) => venue::read_venue(app, path_id(id)?),
        ("PATCH", ["venue", id]) => venue::edit_venue(app, req, path_id(id)?),
        ("GET", ["venue", id, "court"]) => venue::browse_court(app, path_id(id)?),

        ("POST", ["view", "reservation"]) => reservation::browse_reservation(app, req),
        ("GET", ["reservation", id]) => reservation::read_reservation(app, path_id(id)?),
        ("POST", ["reservation", "code", code]) => reservation::join_reservation(app, req, code),

        ("GET", ["view", "my-reservation"]) => view::browse_my_reservation(app, req),
        ("GET", ["view", "provider-stadium"]) => view::browse_provider_stadium(app, req),

        _ => Err(AppError::NotFound),
    }
}

fn path_id(raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::IllegalInput(format!("invalid id in path: {raw:?}")))
}
