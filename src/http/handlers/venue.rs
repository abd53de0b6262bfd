use crate::domain::{RoleType, Sorter, VenueAvailableSortBy};
use crate::http::error::AppError;
use crate::http::request::HttpRequest;
use crate::http::response::{HttpReply, Page};
use crate::http::App;
use crate::persistence::venue::{self, NewVenue, VenueChanges};
use crate::persistence::{court, stadium};
use crate::security::TokenClaims;
use serde::Serialize;

pub(super) fn browse_venue(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let name: Option<String> = req.query_opt("name")?;
    let sort_by = req.query_or("sort_by", VenueAvailableSortBy::CurrentUserCount)?;
    let order = req.query_or("order", Sorter::Desc)?;
    let (limit, offset) = req.pagination()?;

    let (venues, total_count) = venue::browse(
        &app.db(),
        name.as_deref(),
        req.query_opt("stadium_id")?,
        req.query_opt("sport_id")?,
        req.query_opt("is_reservable")?,
        sort_by,
        order,
        limit,
        offset,
    )?;
    Ok(HttpReply::ok(Page {
        data: venues,
        total_count,
        limit,
        offset,
    }))
}

pub(super) fn read_venue(app: &App, venue_id: i32) -> Result<HttpReply, AppError> {
    let venue = venue::read(&app.db(), venue_id, false)?.ok_or(AppError::NotFound)?;
    Ok(HttpReply::ok(venue))
}

pub(super) fn browse_court(app: &App, venue_id: i32) -> Result<HttpReply, AppError> {
    let db = app.db();
    venue::read(&db, venue_id, false)?.ok_or(AppError::NotFound)?;
    Ok(HttpReply::ok(court::browse(&db, venue_id)?))
}

#[derive(Serialize)]
struct AddVenueOutput {
    id: i32,
}

pub(super) fn add_venue(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let claims = app.authenticate(req)?;
    if claims.role != RoleType::Provider {
        return Err(AppError::NoPermission);
    }
    let input: NewVenue = req.json()?;
    if input.capacity < 0 || input.court_count < 0 {
        return Err(AppError::IllegalInput(
            "capacity and court_count must not be negative".to_string(),
        ));
    }

    let db = app.db();
    check_stadium_owner(app, &claims, input.stadium_id)?;
    let id = venue::add(&db, &input)?;
    Ok(HttpReply::ok(AddVenueOutput { id }))
}

pub(super) fn edit_venue(app: &App, req: &HttpRequest, venue_id: i32) -> Result<HttpReply, AppError> {
    let claims = app.authenticate(req)?;
    let changes: VenueChanges = req.json()?;

    let db = app.db();
    let current = venue::read(&db, venue_id, true)?.ok_or(AppError::NotFound)?;
    check_stadium_owner(app, &claims, current.stadium_id)?;

    venue::edit(&db, venue_id, &changes)?;
    Ok(HttpReply::empty())
}

/// `NoPermission` unless the caller owns the stadium; unknown stadiums are `NotFound`.
fn check_stadium_owner(app: &App, claims: &TokenClaims, stadium_id: i32) -> Result<(), AppError> {
    let stadium = stadium::read(&app.db(), stadium_id, true)?.ok_or(AppError::NotFound)?;
    if stadium.owner_id != claims.account_id {
        return Err(AppError::NoPermission);
    }
    Ok(())
}
