//! Raw SQL Helpers
//!
//! Small conveniences on top of the executor: unprepared control statements, single
//! value queries, and the `COUNT(*)` wrapper used by paginated browse queries.

use crate::executor::{DbError, QueryExecutor};
use crate::query::ParameterSet;
use crate::value::TryGetable;
use may_postgres::Client;

/// Execute a parameterless control statement (`BEGIN`, `SAVEPOINT sp_1`, ...).
///
/// # Errors
///
/// Returns `DbError::Postgres` if the statement fails.
pub fn execute_unprepared(client: &Client, sql: &str) -> Result<(), DbError> {
    log::debug!("{sql}");
    client.execute(sql, &[])?;
    Ok(())
}

/// Query the first column of the first row.
///
/// Returns `Ok(None)` when the statement produced no row.
///
/// # Errors
///
/// Returns `DbError::Decode` if the value cannot be extracted as `T`, and any
/// execution error unchanged.
pub fn query_value<T: TryGetable>(
    db: &QueryExecutor<'_>,
    template: &str,
    params: &ParameterSet,
) -> Result<Option<T>, DbError> {
    match db.fetch_one(template, params)? {
        Some(row) => {
            let mut reader = row.reader();
            let value = reader.next::<T>()?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Count the rows an unpaginated query would return.
///
/// `query` must not carry `LIMIT`/`OFFSET`; it is wrapped as
/// `SELECT COUNT(*) FROM (<query>) AS tbl`.
pub fn count_rows(
    db: &QueryExecutor<'_>,
    query: &str,
    params: &ParameterSet,
) -> Result<i64, DbError> {
    let sql = count_sql(query);
    Ok(query_value::<i64>(db, &sql, params)?.unwrap_or(0))
}

pub(crate) fn count_sql(query: &str) -> String {
    format!("SELECT COUNT(*)  FROM ({query}) AS tbl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use crate::raw_row;
    use crate::test_helpers::MockEngine;

    #[test]
    fn test_count_rows_wraps_query() {
        let engine = MockEngine::new();
        engine.push_rows(vec![raw_row![12_i64]]);
        let db = QueryExecutor::new(&engine);

        let count = count_rows(&db, "SELECT id FROM venue WHERE sport_id = %(sport_id)s", &params! { "sport_id" => 2 })
            .unwrap();

        assert_eq!(count, 12);
        assert_eq!(
            engine.statements()[0].sql,
            "SELECT COUNT(*)  FROM (SELECT id FROM venue WHERE sport_id = $1) AS tbl"
        );
    }

    #[test]
    fn test_query_value_absent() {
        let engine = MockEngine::new();
        engine.push_rows(vec![]);
        let db = QueryExecutor::new(&engine);

        let value: Option<i32> = query_value(&db, "SELECT id FROM t", &params! {}).unwrap();
        assert_eq!(value, None);
    }
}
