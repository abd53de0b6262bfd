use crate::domain::{BusinessHour, PlaceType, WeekTimeRange};
use crate::executor::{DbError, QueryExecutor};
use crate::query::{and_where, where_clause, Criteria, ParameterSet};
use crate::row::{map_rows, FromRow, RawRow};

impl FromRow for BusinessHour {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let hour = BusinessHour {
            id: r.next()?,
            place_id: r.next()?,
            place_type: r.next()?,
            weekday: r.next()?,
            start_time: r.next()?,
            end_time: r.next()?,
        };
        r.finish()?;
        Ok(hour)
    }
}

/// `(weekday = w AND start_time <= end AND end_time >= start) OR ...` for overlapping
/// windows, with `weekday_{i}`/`start_time_{i}`/`end_time_{i}` parameters.
///
/// `table` qualifies the columns. Returns an empty string for no ranges.
pub(crate) fn overlap_clause(
    table: &str,
    time_ranges: &[WeekTimeRange],
    params: &mut ParameterSet,
) -> String {
    let groups: Vec<String> = time_ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            params.insert(format!("weekday_{i}"), range.weekday);
            params.insert(format!("start_time_{i}"), range.start_time);
            params.insert(format!("end_time_{i}"), range.end_time);
            format!(
                "({table}.weekday = %(weekday_{i})s\
                 \n AND {table}.start_time <= %(end_time_{i})s\
                 \n AND {table}.end_time >= %(start_time_{i})s)"
            )
        })
        .collect();

    if groups.is_empty() {
        String::new()
    } else {
        format!("({})", groups.join(" OR "))
    }
}

/// Business hours of one place, optionally only those overlapping `time_ranges`.
pub fn browse(
    db: &QueryExecutor<'_>,
    place_type: Option<PlaceType>,
    place_id: Option<i32>,
    time_ranges: &[WeekTimeRange],
) -> Result<Vec<BusinessHour>, DbError> {
    let (fragments, mut params) = Criteria::new()
        .add("place_type", place_type, "business_hour.type = %(place_type)s")
        .add("place_id", place_id, "business_hour.place_id = %(place_id)s")
        .compose();

    let overlap = overlap_clause("business_hour", time_ranges, &mut params);
    let where_sql = and_where(&where_clause(&fragments), &overlap);

    let rows = db.fetch_all(
        &format!(
            "SELECT id, place_id, type, weekday, start_time, end_time\
             \n  FROM business_hour\
             \n {where_sql}\
             \n ORDER BY id"
        ),
        &params,
    )?;
    map_rows(rows)
}

/// Insert one business-hour row per range with a single statement.
///
/// `place_type`/`place_id` are referenced by every VALUES tuple and bound once per
/// occurrence. No ranges, no statement.
pub fn batch_add(
    db: &QueryExecutor<'_>,
    place_type: PlaceType,
    place_id: i32,
    ranges: &[WeekTimeRange],
) -> Result<u64, DbError> {
    if ranges.is_empty() {
        return Ok(0);
    }

    let mut params = ParameterSet::new()
        .with("place_type", place_type)
        .with("place_id", place_id);
    let tuples: Vec<String> = ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            params.insert(format!("weekday_{i}"), range.weekday);
            params.insert(format!("start_time_{i}"), range.start_time);
            params.insert(format!("end_time_{i}"), range.end_time);
            format!(
                "(%(place_id)s, %(place_type)s, %(weekday_{i})s, %(start_time_{i})s, %(end_time_{i})s)"
            )
        })
        .collect();

    db.fetch_none(
        &format!(
            "INSERT INTO business_hour (place_id, type, weekday, start_time, end_time)\
             \n     VALUES {}",
            tuples.join(", ")
        ),
        &params,
    )
}
