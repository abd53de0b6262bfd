use crate::domain::{BusinessHour, PlaceType, ViewStadium};
use crate::executor::{DbError, QueryExecutor};
use crate::query::{where_clause, Criteria, ParameterSet};
use crate::row::{map_rows, FromRow, RawRow};

/// Stadium with its city, district, sports and opening hours.
///
/// Children are aggregated per stadium; a stadium without venues or hours still
/// appears, with empty lists.
const VIEW_STADIUM_SELECT: &str = "SELECT stadium.id, stadium.name, stadium.district_id, stadium.owner_id,\
     \n       stadium.contact_number, stadium.description, stadium.long, stadium.lat,\
     \n       city.name,\
     \n       district.name,\
     \n       stadium.is_published,\
     \n       ARRAY_AGG(DISTINCT sport.name) FILTER (WHERE sport.name IS NOT NULL),\
     \n       JSONB_AGG(DISTINCT JSONB_BUILD_ARRAY(business_hour.id, business_hour.place_id,\
     \n                                            business_hour.type, business_hour.weekday,\
     \n                                            business_hour.start_time, business_hour.end_time))\
     \n           FILTER (WHERE business_hour.id IS NOT NULL)\
     \n  FROM stadium\
     \n INNER JOIN district ON stadium.district_id = district.id\
     \n INNER JOIN city ON district.city_id = city.id\
     \n  LEFT JOIN venue ON stadium.id = venue.stadium_id\
     \n  LEFT JOIN sport ON venue.sport_id = sport.id\
     \n  LEFT JOIN business_hour ON business_hour.place_id = stadium.id\
     \n                         AND business_hour.type = %(place_type)s";

impl FromRow for ViewStadium {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let mut stadium = ViewStadium {
            id: r.next()?,
            name: r.next()?,
            district_id: r.next()?,
            owner_id: r.next()?,
            contact_number: r.next()?,
            description: r.next()?,
            long: r.next()?,
            lat: r.next()?,
            city: r.next()?,
            district: r.next()?,
            is_published: r.next()?,
            sports: r.next_list()?,
            business_hours: r.next_children::<BusinessHour>()?,
        };
        r.finish()?;
        stadium.sports.sort();
        stadium.business_hours.sort_by_key(|hour| hour.id);
        Ok(stadium)
    }
}

/// Published stadiums matching the filters. `name` is a substring match.
pub fn browse(
    db: &QueryExecutor<'_>,
    name: Option<&str>,
    city_id: Option<i32>,
    district_id: Option<i32>,
    sport_id: Option<i32>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ViewStadium>, DbError> {
    let (fragments, mut params) = Criteria::new()
        .add(
            "name",
            name.filter(|n| !n.is_empty()).map(|n| format!("%{n}%")),
            "stadium.name LIKE %(name)s",
        )
        .add("city_id", city_id, "district.city_id = %(city_id)s")
        .add("district_id", district_id, "district.id = %(district_id)s")
        .add("sport_id", sport_id, "venue.sport_id = %(sport_id)s")
        .add("is_published", Some(true), "stadium.is_published = %(is_published)s")
        .compose();
    params.extend(
        ParameterSet::new()
            .with("place_type", PlaceType::Stadium)
            .with("limit", limit)
            .with("offset", offset),
    );

    let rows = db.fetch_all(
        &format!(
            "{VIEW_STADIUM_SELECT}\
             \n {}\
             \n GROUP BY stadium.id, city.id, district.id\
             \n ORDER BY stadium.id\
             \n LIMIT %(limit)s OFFSET %(offset)s",
            where_clause(&fragments)
        ),
        &params,
    )?;
    map_rows(rows)
}

/// One stadium; unpublished ones only with `include_unpublished`.
pub fn read(
    db: &QueryExecutor<'_>,
    stadium_id: i32,
    include_unpublished: bool,
) -> Result<Option<ViewStadium>, DbError> {
    let (fragments, mut params) = Criteria::new()
        .add("stadium_id", Some(stadium_id), "stadium.id = %(stadium_id)s")
        .add(
            "is_published",
            (!include_unpublished).then_some(true),
            "stadium.is_published = %(is_published)s",
        )
        .compose();
    params.insert("place_type", PlaceType::Stadium);

    db.fetch_one(
        &format!(
            "{VIEW_STADIUM_SELECT}\
             \n {}\
             \n GROUP BY stadium.id, city.id, district.id",
            where_clause(&fragments)
        ),
        &params,
    )?
    .map(ViewStadium::from_row)
    .transpose()
}
