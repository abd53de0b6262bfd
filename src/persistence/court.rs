use crate::domain::Court;
use crate::executor::{DbError, QueryExecutor};
use crate::params;
use crate::row::{map_rows, FromRow, RawRow};

impl FromRow for Court {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let court = Court {
            id: r.next()?,
            venue_id: r.next()?,
            number: r.next()?,
            is_published: r.next()?,
        };
        r.finish()?;
        Ok(court)
    }
}

/// Published courts of a venue, by court number.
pub fn browse(db: &QueryExecutor<'_>, venue_id: i32) -> Result<Vec<Court>, DbError> {
    let rows = db.fetch_all(
        "SELECT id, venue_id, number, is_published\
         \n  FROM court\
         \n WHERE venue_id = %(venue_id)s\
         \n   AND is_published = %(is_published)s\
         \n ORDER BY number, id",
        &params! { "venue_id" => venue_id, "is_published" => true },
    )?;
    map_rows(rows)
}
