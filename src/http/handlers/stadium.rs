use crate::http::error::AppError;
use crate::http::request::HttpRequest;
use crate::http::response::HttpReply;
use crate::http::App;
use crate::persistence::stadium;

pub(super) fn browse_stadium(app: &App, req: &HttpRequest) -> Result<HttpReply, AppError> {
    let name: Option<String> = req.query_opt("name")?;
    let (limit, offset) = req.pagination()?;

    let stadiums = stadium::browse(
        &app.db(),
        name.as_deref(),
        req.query_opt("city_id")?,
        req.query_opt("district_id")?,
        req.query_opt("sport_id")?,
        limit,
        offset,
    )?;
    Ok(HttpReply::ok(stadiums))
}

pub(super) fn read_stadium(app: &App, stadium_id: i32) -> Result<HttpReply, AppError> {
    let stadium = stadium::read(&app.db(), stadium_id, false)?.ok_or(AppError::NotFound)?;
    Ok(HttpReply::ok(stadium))
}
