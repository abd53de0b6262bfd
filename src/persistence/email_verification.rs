use crate::executor::{DbError, QueryExecutor};
use crate::params;
use crate::raw_sql::query_value;
use uuid::Uuid;

/// Issue a fresh verification code for `email`.
pub fn add(db: &QueryExecutor<'_>, account_id: i32, email: &str) -> Result<Uuid, DbError> {
    query_value::<Uuid>(
        db,
        "INSERT INTO email_verification (account_id, email)\
         \n     VALUES (%(account_id)s, %(email)s)\
         \n  RETURNING code",
        &params! { "account_id" => account_id, "email" => email },
    )?
    .ok_or_else(|| DbError::Decode("INSERT INTO email_verification returned no code".to_string()))
}

/// Latest unconsumed code of an account for `email`.
pub fn read(db: &QueryExecutor<'_>, account_id: i32, email: &str) -> Result<Option<Uuid>, DbError> {
    query_value::<Uuid>(
        db,
        "SELECT code\
         \n  FROM email_verification\
         \n WHERE account_id = %(account_id)s\
         \n   AND email = %(email)s\
         \n   AND is_consumed = %(is_consumed)s\
         \n ORDER BY created_at DESC\
         \n LIMIT 1",
        &params! { "account_id" => account_id, "email" => email, "is_consumed" => false },
    )
}

/// Mark `code` consumed and return its account. Unknown or used codes yield `None`.
pub fn consume(db: &QueryExecutor<'_>, code: Uuid) -> Result<Option<i32>, DbError> {
    query_value::<i32>(
        db,
        "UPDATE email_verification\
         \n   SET is_consumed = %(is_consumed)s\
         \n WHERE code = %(code)s\
         \n   AND is_consumed = NOT %(is_consumed)s\
         \n RETURNING account_id",
        &params! { "is_consumed" => true, "code" => code },
    )
}

/// Consume `code` and mark its account verified in one transaction.
///
/// Returns `false` when the code is unknown or already used.
pub fn verify_email(db: &QueryExecutor<'_>, code: Uuid) -> Result<bool, DbError> {
    db.transaction(|tx| {
        let Some(account_id) = consume(tx, code)? else {
            return Ok(false);
        };
        tx.fetch_none(
            "UPDATE account\
             \n   SET is_verified = %(is_verified)s\
             \n WHERE id = %(account_id)s",
            &params! { "is_verified" => true, "account_id" => account_id },
        )?;
        Ok(true)
    })
}
