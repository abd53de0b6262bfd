use crate::domain::{FeeType, PlaceType, Sorter, Venue, VenueAvailableSortBy, WeekTimeRange};
use crate::executor::{DbError, QueryExecutor};
use crate::params;
use crate::persistence::business_hour;
use crate::query::{where_clause, Criteria};
use crate::raw_sql::{count_rows, query_value};
use crate::row::{map_rows, FromRow, RawRow};
use serde::Deserialize;

const VENUE_COLUMNS: &str = "id, stadium_id, name, floor, reservation_interval, is_reservable,\
     \n       is_chargeable, fee_rate, fee_type, area, capacity, current_user_count,\
     \n       sport_equipments, facilities, court_count, court_type, sport_id, is_published";

impl FromRow for Venue {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let venue = Venue {
            id: r.next()?,
            stadium_id: r.next()?,
            name: r.next()?,
            floor: r.next()?,
            reservation_interval: r.next()?,
            is_reservable: r.next()?,
            is_chargeable: r.next()?,
            fee_rate: r.next()?,
            fee_type: r.next()?,
            area: r.next()?,
            capacity: r.next()?,
            current_user_count: r.next()?,
            sport_equipments: r.next()?,
            facilities: r.next()?,
            court_count: r.next()?,
            court_type: r.next()?,
            sport_id: r.next()?,
            is_published: r.next()?,
        };
        r.finish()?;
        Ok(venue)
    }
}

/// Fields of a venue to create.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewVenue {
    pub stadium_id: i32,
    pub name: String,
    pub floor: String,
    pub reservation_interval: Option<i32>,
    pub is_reservable: bool,
    pub is_chargeable: bool,
    pub fee_rate: Option<f64>,
    pub fee_type: Option<FeeType>,
    pub area: i32,
    pub capacity: i32,
    pub sport_equipments: Option<String>,
    pub facilities: Option<String>,
    pub court_count: i32,
    pub court_type: String,
    pub sport_id: i32,
    #[serde(default)]
    pub business_hours: Vec<WeekTimeRange>,
}

/// Partial update of a venue; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VenueChanges {
    pub name: Option<String>,
    pub floor: Option<String>,
    pub area: Option<i32>,
    pub capacity: Option<i32>,
    pub sport_id: Option<i32>,
    pub is_reservable: Option<bool>,
    pub reservation_interval: Option<i32>,
    pub is_chargeable: Option<bool>,
    pub fee_rate: Option<f64>,
    pub fee_type: Option<FeeType>,
    pub sport_equipments: Option<String>,
    pub facilities: Option<String>,
    pub court_type: Option<String>,
}

/// Published venues matching the filters, one page, plus the unpaginated total.
#[allow(clippy::too_many_arguments)]
pub fn browse(
    db: &QueryExecutor<'_>,
    name: Option<&str>,
    stadium_id: Option<i32>,
    sport_id: Option<i32>,
    is_reservable: Option<bool>,
    sort_by: VenueAvailableSortBy,
    order: Sorter,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Venue>, i64), DbError> {
    let (fragments, mut params) = Criteria::new()
        .add(
            "name",
            name.filter(|n| !n.is_empty()).map(|n| format!("%{n}%")),
            "name LIKE %(name)s",
        )
        .add("stadium_id", stadium_id, "stadium_id = %(stadium_id)s")
        .add("sport_id", sport_id, "sport_id = %(sport_id)s")
        .add("is_reservable", is_reservable, "is_reservable = %(is_reservable)s")
        .add("is_published", Some(true), "is_published = %(is_published)s")
        .compose();

    let query = format!(
        "SELECT {VENUE_COLUMNS}\
         \n  FROM venue\
         \n {}\
         \n ORDER BY {} {}, id",
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

pub fn read(
    db: &QueryExecutor<'_>,
    venue_id: i32,
    include_unpublished: bool,
) -> Result<Option<Venue>, DbError> {
    let (fragments, params) = Criteria::new()
        .add("venue_id", Some(venue_id), "id = %(venue_id)s")
        .add(
            "is_published",
            (!include_unpublished).then_some(true),
            "is_published = %(is_published)s",
        )
        .compose();

    db.fetch_one(
        &format!(
            "SELECT {VENUE_COLUMNS}\
             \n  FROM venue\
             \n {}",
            where_clause(&fragments)
        ),
        &params,
    )?
    .map(Venue::from_row)
    .transpose()
}

/// Create a venue and its business hours in one transaction.
pub fn add(db: &QueryExecutor<'_>, venue: &NewVenue) -> Result<i32, DbError> {
    db.transaction(|tx| {
        let venue_id = query_value::<i32>(
            tx,
            "INSERT INTO venue (stadium_id, name, floor, reservation_interval, is_reservable,\
             \n                   is_chargeable, fee_rate, fee_type, area, capacity,\
             \n                   sport_equipments, facilities, court_count, court_type, sport_id)\
             \n     VALUES (%(stadium_id)s, %(name)s, %(floor)s, %(reservation_interval)s, %(is_reservable)s,\
             \n             %(is_chargeable)s, %(fee_rate)s, %(fee_type)s, %(area)s, %(capacity)s,\
             \n             %(sport_equipments)s, %(facilities)s, %(court_count)s, %(court_type)s, %(sport_id)s)\
             \n  RETURNING id",
            &params! {
                "stadium_id" => venue.stadium_id,
                "name" => &venue.name,
                "floor" => &venue.floor,
                "reservation_interval" => venue.reservation_interval,
                "is_reservable" => venue.is_reservable,
                "is_chargeable" => venue.is_chargeable,
                "fee_rate" => venue.fee_rate,
                "fee_type" => venue.fee_type,
                "area" => venue.area,
                "capacity" => venue.capacity,
                "sport_equipments" => venue.sport_equipments.clone(),
                "facilities" => venue.facilities.clone(),
                "court_count" => venue.court_count,
                "court_type" => &venue.court_type,
                "sport_id" => venue.sport_id,
            },
        )?
        .ok_or_else(|| DbError::Decode("INSERT INTO venue returned no id".to_string()))?;

        business_hour::batch_add(tx, PlaceType::Venue, venue_id, &venue.business_hours)?;
        Ok(venue_id)
    })
}

/// Update the present fields of `changes`. Returns the affected row count; no
/// present field means no statement and `0`.
pub fn edit(db: &QueryExecutor<'_>, venue_id: i32, changes: &VenueChanges) -> Result<u64, DbError> {
    let c = changes.clone();
    let (assignments, mut params) = Criteria::new()
        .add("name", c.name, "name = %(name)s")
        .add("floor", c.floor, "floor = %(floor)s")
        .add("area", c.area, "area = %(area)s")
        .add("capacity", c.capacity, "capacity = %(capacity)s")
        .add("sport_id", c.sport_id, "sport_id = %(sport_id)s")
        .add("is_reservable", c.is_reservable, "is_reservable = %(is_reservable)s")
        .add(
            "reservation_interval",
            c.reservation_interval,
            "reservation_interval = %(reservation_interval)s",
        )
        .add("is_chargeable", c.is_chargeable, "is_chargeable = %(is_chargeable)s")
        .add("fee_rate", c.fee_rate, "fee_rate = %(fee_rate)s")
        .add("fee_type", c.fee_type, "fee_type = %(fee_type)s")
        .add("sport_equipments", c.sport_equipments, "sport_equipments = %(sport_equipments)s")
        .add("facilities", c.facilities, "facilities = %(facilities)s")
        .add("court_type", c.court_type, "court_type = %(court_type)s")
        .compose();

    if assignments.is_empty() {
        return Ok(0);
    }
    params.insert("venue_id", venue_id);

    db.fetch_none(
        &format!(
            "UPDATE venue\
             \n   SET {}\
             \n WHERE id = %(venue_id)s",
            assignments.join(", ")
        ),
        &params,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_row;
    use crate::test_helpers::MockEngine;
    use crate::value::Value;

    fn venue_row(id: i32) -> RawRow {
        raw_row![
            id, 1, "Court A", "B1", Some(60), true, true, Some(150.0), Some("per_hour"),
            400, 12, 3, None::<String>, Some("showers"), 2, "indoor", 5, true,
        ]
    }

    #[test]
    fn test_venue_from_row() {
        let venue = Venue::from_row(venue_row(8)).unwrap();
        assert_eq!(venue.id, 8);
        assert_eq!(venue.fee_type, Some(FeeType::PerHour));
        assert_eq!(venue.facilities.as_deref(), Some("showers"));
    }

    #[test]
    fn test_browse_counts_unpaginated_query() {
        let engine = MockEngine::new();
        engine.push_rows(vec![venue_row(1), venue_row(2)]);
        engine.push_row(raw_row![7i64]);
        let db = QueryExecutor::new(&engine);

        let (venues, total) = browse(
            &db,
            None,
            Some(1),
            None,
            Some(true),
            VenueAvailableSortBy::CurrentUserCount,
            Sorter::Desc,
            2,
            0,
        )
        .unwrap();

        assert_eq!(venues.len(), 2);
        assert_eq!(total, 7);

        let statements = engine.statements();
        assert!(statements[0].sql.contains("ORDER BY current_user_count DESC, id\n LIMIT $4 OFFSET $5"));
        assert!(statements[1].sql.starts_with("SELECT COUNT(*)  FROM (SELECT id, stadium_id"));
        assert!(statements[1].sql.ends_with("ORDER BY current_user_count DESC, id) AS tbl"));
        assert_eq!(statements[1].args.len(), 3);
    }

    #[test]
    fn test_edit_only_present_fields() {
        let engine = MockEngine::new();
        engine.push_affected(1);
        let db = QueryExecutor::new(&engine);

        let changes = VenueChanges {
            name: Some("Court B".to_string()),
            fee_type: Some(FeeType::PerPerson),
            ..VenueChanges::default()
        };
        assert_eq!(edit(&db, 3, &changes).unwrap(), 1);

        let statement = &engine.statements()[0];
        assert!(statement.sql.contains("SET name = $1, fee_type = $2\n WHERE id = $3"));
        assert_eq!(statement.args[1], Value::Text("per_person".to_string()));
        assert_eq!(statement.args[2], Value::Int(3));
    }

    #[test]
    fn test_edit_without_changes_is_noop() {
        let engine = MockEngine::new();
        let db = QueryExecutor::new(&engine);
        assert_eq!(edit(&db, 3, &VenueChanges::default()).unwrap(), 0);
        assert!(engine.statements().is_empty());
    }

    #[test]
    fn test_add_inserts_hours_in_same_transaction() {
        let engine = MockEngine::new();
        engine.push_row(raw_row![21]);
        engine.push_affected(1);
        let db = QueryExecutor::new(&engine);

        let venue: NewVenue = serde_json::from_value(serde_json::json!({
            "stadium_id": 1, "name": "Court A", "floor": "1F", "reservation_interval": null,
            "is_reservable": true, "is_chargeable": false, "fee_rate": null, "fee_type": null,
            "area": 100, "capacity": 10, "sport_equipments": null, "facilities": null,
            "court_count": 1, "court_type": "indoor", "sport_id": 2,
            "business_hours": [{"weekday": 1, "start_time": "08:00:00", "end_time": "12:00:00"}]
        }))
        .unwrap();

        assert_eq!(add(&db, &venue).unwrap(), 21);
        let statements = engine.statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[1].sql.starts_with("INSERT INTO business_hour"));
        assert_eq!(statements[1].args[0], Value::Int(21));
        assert_eq!(engine.transaction_log(), vec!["BEGIN", "COMMIT"]);
    }
}
