use crate::executor::{DbError, QueryExecutor};
use crate::query::ParameterSet;

/// Add members to a reservation with one multi-row insert.
///
/// A member who already joined fails the whole statement with
/// `DbError::UniqueViolation`.
pub fn batch_add(
    db: &QueryExecutor<'_>,
    reservation_id: i32,
    member_ids: &[i32],
) -> Result<u64, DbError> {
    if member_ids.is_empty() {
        return Ok(0);
    }

    let mut params = ParameterSet::new()
        .with("reservation_id", reservation_id)
        .with("is_manager", false);
    let tuples: Vec<String> = member_ids
        .iter()
        .enumerate()
        .map(|(i, member_id)| {
            params.insert(format!("account_id_{i}"), *member_id);
            format!("(%(reservation_id)s, %(account_id_{i})s, %(is_manager)s)")
        })
        .collect();

    db.fetch_none(
        &format!(
            "INSERT INTO reservation_member (reservation_id, account_id, is_manager)\
             \n     VALUES {}",
            tuples.join(", ")
        ),
        &params,
    )
}
