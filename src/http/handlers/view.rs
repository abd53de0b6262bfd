use crate::domain::{RoleType, Sorter, ViewMyReservationSortBy, ViewProviderStadiumSortBy};
use crate::http::error::AppError;
use crate::http::request::HttpRequest;
use crate::http::response::{HttpReply, Page};
use crate::http::App;
use crate::persistence::view;

pub(super) fn browse_my_reservation(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let claims = app.authenticate(req)?;
    let sort_by = req.query_or("sort_by", ViewMyReservationSortBy::Time)?;
    let order = req.query_or("order", Sorter::Desc)?;
    let (limit, offset) = req.pagination()?;

    let (data, total_count) = view::browse_my_reservation(
        &app.db(),
        claims.account_id,
        sort_by,
        order,
        limit,
        offset,
        app.now(),
    )?;
    Ok(HttpReply::ok(Page {
        data,
        total_count,
        limit,
        offset,
    }))
}

pub(super) fn browse_provider_stadium(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let claims = app.authenticate(req)?;
    if claims.role != RoleType::Provider {
        return Err(AppError::NoPermission);
    }
    let sort_by = req.query_or("sort_by", ViewProviderStadiumSortBy::StadiumName)?;
    let order = req.query_or("order", Sorter::Asc)?;
    let (limit, offset) = req.pagination()?;

    let (data, total_count) = view::browse_provider_stadium(
        &app.db(),
        claims.account_id,
        req.query_opt("city_id")?,
        req.query_opt("district_id")?,
        req.query_opt("is_published")?,
        sort_by,
        order,
        limit,
        offset,
    )?;
    Ok(HttpReply::ok(Page {
        data,
        total_count,
        limit,
        offset,
    }))
}
