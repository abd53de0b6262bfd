//! Paginated read-side views for account pages.

use crate::domain::{
    compose_reservation_status, Sorter, ViewMyReservation, ViewMyReservationSortBy,
    ViewProviderStadium, ViewProviderStadiumSortBy,
};
use crate::executor::{DbError, QueryExecutor};
use crate::params;
use crate::query::{where_clause, Criteria};
use crate::raw_sql::count_rows;
use crate::row::{map_rows, FromRow, RawRow};
use chrono::{DateTime, Utc};

/// Reservations `account_id` is a member of, one page, plus the total.
///
/// `status` is derived per row from its times and `now`.
pub fn browse_my_reservation(
    db: &QueryExecutor<'_>,
    account_id: i32,
    sort_by: ViewMyReservationSortBy,
    order: Sorter,
    limit: i64,
    offset: i64,
    now: DateTime<Utc>,
) -> Result<(Vec<ViewMyReservation>, i64), DbError> {
    let query = format!(
        "SELECT reservation.id AS reservation_id,\
         \n       start_time,\
         \n       end_time,\
         \n       stadium.name AS stadium_name,\
         \n       venue.name AS venue_name,\
         \n       is_manager,\
         \n       vacancy,\
         \n       is_cancelled\
         \n  FROM reservation\
         \n INNER JOIN venue ON venue.id = reservation.venue_id\
         \n INNER JOIN stadium ON stadium.id = reservation.stadium_id\
         \n INNER JOIN reservation_member\
         \n         ON reservation_member.reservation_id = reservation.id\
         \n        AND reservation_member.account_id = %(account_id)s\
         \n ORDER BY {} {}",
        sort_by.sql(),
        order.sql(),
    );
    let params = params! { "account_id" => account_id, "limit" => limit, "offset" => offset };

    let rows = db.fetch_all(&format!("{query}\n LIMIT %(limit)s OFFSET %(offset)s"), &params)?;
    let reservations = rows
        .into_iter()
        .map(|row| -> Result<ViewMyReservation, DbError> {
            let mut r = row.reader();
            let reservation_id = r.next()?;
            let start_time = r.next()?;
            let end_time = r.next()?;
            let stadium_name = r.next()?;
            let venue_name = r.next()?;
            let is_manager = r.next()?;
            let vacancy = r.next()?;
            let is_cancelled = r.next()?;
            r.finish()?;
            Ok(ViewMyReservation {
                reservation_id,
                start_time,
                end_time,
                stadium_name,
                venue_name,
                is_manager,
                vacancy,
                status: compose_reservation_status(start_time, end_time, is_cancelled, now),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let total_count = count_rows(db, &query, &params)?;

    Ok((reservations, total_count))
}

impl FromRow for ViewProviderStadium {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let stadium = ViewProviderStadium {
            stadium_id: r.next()?,
            city_name: r.next()?,
            district_name: r.next()?,
            stadium_name: r.next()?,
            venue_count: r.next()?,
            is_published: r.next()?,
        };
        r.finish()?;
        Ok(stadium)
    }
}

/// Stadiums owned by `owner_id` with their venue counts, one page, plus the total.
#[allow(clippy::too_many_arguments)]
pub fn browse_provider_stadium(
    db: &QueryExecutor<'_>,
    owner_id: i32,
    city_id: Option<i32>,
    district_id: Option<i32>,
    is_published: Option<bool>,
    sort_by: ViewProviderStadiumSortBy,
    order: Sorter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<ViewProviderStadium>, i64), DbError> {
    let (fragments, mut params) = Criteria::new()
        .add("owner_id", Some(owner_id), "stadium.owner_id = %(owner_id)s")
        .add("city_id", city_id, "city.id = %(city_id)s")
        .add("district_id", district_id, "district.id = %(district_id)s")
        .add("is_published", is_published, "stadium.is_published = %(is_published)s")
        .compose();

    let query = format!(
        "SELECT stadium.id AS stadium_id,\
         \n       city.name AS city_name,\
         \n       district.name AS district_name,\
         \n       stadium.name AS stadium_name,\
         \n       COUNT(venue.id) AS venue_count,\
         \n       stadium.is_published\
         \n  FROM stadium\
         \n INNER JOIN district ON district.id = stadium.district_id\
         \n INNER JOIN city ON city.id = district.city_id\
         \n  LEFT JOIN venue ON venue.stadium_id = stadium.id\
         \n {}\
         \n GROUP BY stadium.id, city.id, district.id\
         \n ORDER BY {} {}",
        where_clause(&fragments),
        sort_by.sql(),
        order.sql(),
    );

    params.insert("limit", limit);
    params.insert("offset", offset);
    let rows = db.fetch_all(&format!("{query}\n LIMIT %(limit)s OFFSET %(offset)s"), &params)?;
    let total_count = count_rows(db, &query, &params)?;

    Ok((map_rows(rows)?, total_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReservationStatus;
    use crate::raw_row;
    use crate::test_helpers::MockEngine;
    use crate::value::Value;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_browse_my_reservation_derives_status() {
        let engine = MockEngine::new();
        engine.push_rows(vec![
            raw_row![1, day(11), day(17), "stadium_name", "venue_name", true, 1, false],
            raw_row![2, day(28), day(30), "s", "v", false, 0, true],
        ]);
        engine.push_row(raw_row![2i64]);
        let db = QueryExecutor::new(&engine);

        let (reservations, total) = browse_my_reservation(
            &db,
            1,
            ViewMyReservationSortBy::Status,
            Sorter::Desc,
            10,
            0,
            day(30),
        )
        .unwrap();

        assert_eq!(total, 2);
        assert_eq!(reservations[0].status, ReservationStatus::Finished);
        assert_eq!(reservations[1].status, ReservationStatus::Cancelled);

        let statements = engine.statements();
        assert!(statements[0]
            .sql
            .contains("ORDER BY (start_time, is_cancelled) DESC\n LIMIT $2 OFFSET $3"));
        assert!(statements[1].sql.ends_with("ORDER BY (start_time, is_cancelled) DESC) AS tbl"));
        assert_eq!(statements[1].args, vec![Value::Int(1)]);
    }

    #[test]
    fn test_browse_provider_stadium() {
        let engine = MockEngine::new();
        engine.push_rows(vec![
            raw_row![1, "c1", "d1", "s1", 1i64, true],
            raw_row![2, "c2", "d2", "s2", 2i64, false],
        ]);
        engine.push_row(raw_row![2i64]);
        let db = QueryExecutor::new(&engine);

        let (stadiums, total) = browse_provider_stadium(
            &db,
            1,
            Some(1),
            None,
            None,
            ViewProviderStadiumSortBy::StadiumName,
            Sorter::Asc,
            10,
            0,
        )
        .unwrap();

        assert_eq!(total, 2);
        assert_eq!(stadiums[1].venue_count, 2);
        assert!(!stadiums[1].is_published);
        let sql = &engine.statements()[0].sql;
        assert!(sql.contains("WHERE stadium.owner_id = $1 AND city.id = $2"));
        assert!(sql.contains("ORDER BY stadium_name ASC"));
    }
}
