use crate::domain::{BrowseReservationSortBy, DateTimeRange, Sorter, TechnicalType};
use crate::http::error::AppError;
use crate::http::request::{check_pagination, HttpRequest, DEFAULT_LIMIT, DEFAULT_OFFSET};
use crate::http::response::HttpReply;
use crate::http::App;
use crate::persistence::reservation;
use serde::Deserialize;

#[derive(Deserialize)]
struct BrowseReservationInput {
    city_id: Option<i32>,
    district_id: Option<i32>,
    sport_id: Option<i32>,
    stadium_id: Option<i32>,
    #[serde(default)]
    time_ranges: Vec<DateTimeRange>,
    technical_level: Option<TechnicalType>,
    #[serde(default = "default_sort_by")]
    sort_by: BrowseReservationSortBy,
    #[serde(default = "default_order")]
    order: Sorter,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default = "default_offset")]
    offset: i64,
}

fn default_sort_by() -> BrowseReservationSortBy {
    BrowseReservationSortBy::Time
}

fn default_order() -> Sorter {
    Sorter::Desc
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_offset() -> i64 {
    DEFAULT_OFFSET
}

pub(super) fn browse_reservation(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let input: BrowseReservationInput = if req.body.is_empty() {
        serde_json::from_str("{}")?
    } else {
        req.json()?
    };
    check_pagination(input.limit, input.offset)?;
    if let Some(range) = input.time_ranges.iter().find(|r| r.start_time > r.end_time) {
        return Err(AppError::IllegalInput(format!(
            "time range starts after it ends: {} > {}",
            range.start_time, range.end_time
        )));
    }

    let reservations = reservation::browse(
        &app.db(),
        input.city_id,
        input.district_id,
        input.sport_id,
        input.stadium_id,
        &input.time_ranges,
        input.technical_level,
        input.sort_by,
        input.order,
        input.limit,
        input.offset,
    )?;
    Ok(HttpReply::ok(reservations))
}

pub(super) fn read_reservation(app: &App, reservation_id: i32) -> Result<HttpReply, AppError> {
    let reservation = reservation::read(&app.db(), reservation_id)?.ok_or(AppError::NotFound)?;
    Ok(HttpReply::ok(reservation))
}

pub(super) fn join_reservation(app: &App, req: &HttpRequest, code: &str) -> Result<HttpReply, AppError> {
    let claims = app.authenticate(req)?;
    let db = app.db();

    let target = reservation::read_by_code(&db, code)?.ok_or(AppError::NotFound)?;
    if target.is_cancelled {
        return Err(AppError::NotFound);
    }
    if target.vacancy <= 0 {
        return Err(AppError::ReservationFull);
    }
    // Vacancy may run out between the read and the update.
    if !reservation::join(&db, target.id, claims.account_id)? {
        return Err(AppError::ReservationFull);
    }

    app.calendar.add_member(target.id, claims.account_id)?;
    Ok(HttpReply::ok(true))
}
