use crate::domain::{
    BrowseReservationSortBy, DateTimeRange, Reservation, Sorter, TechnicalType,
};
use crate::executor::{DbError, QueryExecutor};
use crate::params;
use crate::persistence::reservation_member;
use crate::query::{and_where, where_clause, Criteria, ParameterSet};
use crate::row::{map_rows, FromRow, RawRow};

const RESERVATION_COLUMNS: &str = "reservation.id, reservation.stadium_id, reservation.venue_id,\
     \n       reservation.court_id, reservation.start_time, reservation.end_time,\
     \n       reservation.technical_level::VARCHAR[], reservation.invitation_code,\
     \n       reservation.remark, reservation.member_count, reservation.vacancy,\
     \n       reservation.is_public, reservation.is_cancelled";

impl FromRow for Reservation {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let id = r.next()?;
        let stadium_id = r.next()?;
        let venue_id = r.next()?;
        let court_id = r.next()?;
        let start_time = r.next()?;
        let end_time = r.next()?;
        let technical_level = r
            .next_list()?
            .iter()
            .map(|label| {
                label
                    .parse::<TechnicalType>()
                    .map_err(|e| DbError::Decode(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let reservation = Reservation {
            id,
            stadium_id,
            venue_id,
            court_id,
            start_time,
            end_time,
            technical_level,
            invitation_code: r.next()?,
            remark: r.next()?,
            member_count: r.next()?,
            vacancy: r.next()?,
            is_public: r.next()?,
            is_cancelled: r.next()?,
        };
        r.finish()?;
        Ok(reservation)
    }
}

/// `(start_time <= end AND end_time >= start) OR ...` over `time_ranges`.
fn overlap_clause(time_ranges: &[DateTimeRange], params: &mut ParameterSet) -> String {
    let groups: Vec<String> = time_ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            params.insert(format!("start_time_{i}"), range.start_time);
            params.insert(format!("end_time_{i}"), range.end_time);
            format!(
                "(reservation.start_time <= %(end_time_{i})s AND reservation.end_time >= %(start_time_{i})s)"
            )
        })
        .collect();

    if groups.is_empty() {
        String::new()
    } else {
        format!("({})", groups.join(" OR "))
    }
}

/// Public, not cancelled reservations matching the filters.
#[allow(clippy::too_many_arguments)]
pub fn browse(
    db: &QueryExecutor<'_>,
    city_id: Option<i32>,
    district_id: Option<i32>,
    sport_id: Option<i32>,
    stadium_id: Option<i32>,
    time_ranges: &[DateTimeRange],
    technical_level: Option<TechnicalType>,
    sort_by: BrowseReservationSortBy,
    order: Sorter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Reservation>, DbError> {
    let (fragments, mut params) = Criteria::new()
        .add("city_id", city_id, "district.city_id = %(city_id)s")
        .add("district_id", district_id, "stadium.district_id = %(district_id)s")
        .add("sport_id", sport_id, "venue.sport_id = %(sport_id)s")
        .add("stadium_id", stadium_id, "reservation.stadium_id = %(stadium_id)s")
        .add(
            "technical_level",
            technical_level,
            "%(technical_level)s = ANY(reservation.technical_level)",
        )
        .add("is_public", Some(true), "reservation.is_public = %(is_public)s")
        .add("is_cancelled", Some(false), "reservation.is_cancelled = %(is_cancelled)s")
        .compose();

    let overlap = overlap_clause(time_ranges, &mut params);
    let where_sql = and_where(&where_clause(&fragments), &overlap);
    params.insert("limit", limit);
    params.insert("offset", offset);

    let rows = db.fetch_all(
        &format!(
            "SELECT {RESERVATION_COLUMNS}\
             \n  FROM reservation\
             \n INNER JOIN stadium ON stadium.id = reservation.stadium_id\
             \n INNER JOIN district ON district.id = stadium.district_id\
             \n INNER JOIN venue ON venue.id = reservation.venue_id\
             \n {where_sql}\
             \n ORDER BY {} {}, reservation.id\
             \n LIMIT %(limit)s OFFSET %(offset)s",
            sort_by.sql(),
            order.sql(),
        ),
        &params,
    )?;
    map_rows(rows)
}

pub fn read(db: &QueryExecutor<'_>, reservation_id: i32) -> Result<Option<Reservation>, DbError> {
    db.fetch_one(
        &format!(
            "SELECT {RESERVATION_COLUMNS}\
             \n  FROM reservation\
             \n WHERE reservation.id = %(reservation_id)s"
        ),
        &params! { "reservation_id" => reservation_id },
    )?
    .map(Reservation::from_row)
    .transpose()
}

pub fn read_by_code(
    db: &QueryExecutor<'_>,
    invitation_code: &str,
) -> Result<Option<Reservation>, DbError> {
    db.fetch_one(
        &format!(
            "SELECT {RESERVATION_COLUMNS}\
             \n  FROM reservation\
             \n WHERE reservation.invitation_code = %(invitation_code)s"
        ),
        &params! { "invitation_code" => invitation_code },
    )?
    .map(Reservation::from_row)
    .transpose()
}

/// Take one vacancy and add `account_id` as a member, atomically.
///
/// Returns `false` without writing anything when no vacancy is left. A member who
/// already joined fails with `DbError::UniqueViolation` and the vacancy is restored.
pub fn join(db: &QueryExecutor<'_>, reservation_id: i32, account_id: i32) -> Result<bool, DbError> {
    db.transaction(|tx| {
        let taken = tx.fetch_none(
            "UPDATE reservation\
             \n   SET vacancy = vacancy - 1,\
             \n       member_count = member_count + 1\
             \n WHERE id = %(reservation_id)s\
             \n   AND vacancy > 0",
            &params! { "reservation_id" => reservation_id },
        )?;
        if taken == 0 {
            return Ok(false);
        }
        reservation_member::batch_add(tx, reservation_id, &[account_id])?;
        Ok(true)
    })
}
