use crate::domain::{Account, GenderType, RoleType};
use crate::executor::{DbError, QueryExecutor};
use crate::params;
use crate::persistence::email_verification;
use crate::raw_sql::query_value;
use crate::row::{FromRow, RawRow};
use uuid::Uuid;

impl FromRow for Account {
    fn from_row(row: RawRow) -> Result<Self, DbError> {
        let mut r = row.reader();
        let account = Account {
            id: r.next()?,
            email: r.next()?,
            nickname: r.next()?,
            gender: r.next()?,
            role: r.next()?,
            is_verified: r.next()?,
            is_google_login: r.next()?,
        };
        r.finish()?;
        Ok(account)
    }
}

/// Insert an account and return its id.
///
/// A taken email fails with `DbError::UniqueViolation`.
pub fn add(
    db: &QueryExecutor<'_>,
    email: &str,
    pass_hash: &str,
    nickname: &str,
    gender: GenderType,
    role: RoleType,
    is_google_login: bool,
) -> Result<i32, DbError> {
    query_value::<i32>(
        db,
        "INSERT INTO account (email, pass_hash, nickname, gender, role, is_google_login)\
         \n     VALUES (%(email)s, %(pass_hash)s, %(nickname)s, %(gender)s, %(role)s, %(is_google_login)s)\
         \n  RETURNING id",
        &params! {
            "email" => email,
            "pass_hash" => pass_hash,
            "nickname" => nickname,
            "gender" => gender,
            "role" => role,
            "is_google_login" => is_google_login,
        },
    )?
    .ok_or_else(|| DbError::Decode("INSERT INTO account returned no id".to_string()))
}

/// Insert an account together with its first verification code, atomically.
pub fn register(
    db: &QueryExecutor<'_>,
    email: &str,
    pass_hash: &str,
    nickname: &str,
    gender: GenderType,
    role: RoleType,
) -> Result<(i32, Uuid), DbError> {
    db.transaction(|tx| {
        let account_id = add(tx, email, pass_hash, nickname, gender, role, false)?;
        let code = email_verification::add(tx, account_id, email)?;
        Ok((account_id, code))
    })
}

pub fn read(db: &QueryExecutor<'_>, account_id: i32) -> Result<Option<Account>, DbError> {
    db.fetch_one(
        "SELECT id, email, nickname, gender, role, is_verified, is_google_login\
         \n  FROM account\
         \n WHERE id = %(account_id)s",
        &params! { "account_id" => account_id },
    )?
    .map(Account::from_row)
    .transpose()
}

/// `(id, pass_hash, role)` of the account registered under `email`.
pub fn read_by_email(
    db: &QueryExecutor<'_>,
    email: &str,
) -> Result<Option<(i32, String, RoleType)>, DbError> {
    let Some(row) = db.fetch_one(
        "SELECT id, pass_hash, role\
         \n  FROM account\
         \n WHERE email = %(email)s",
        &params! { "email" => email },
    )?
    else {
        return Ok(None);
    };

    let mut r = row.reader();
    let found = (r.next()?, r.next()?, r.next()?);
    r.finish()?;
    Ok(Some(found))
}

/// Consume a verification code and set the password of its account.
///
/// Returns the account id, or `None` when the code is unknown or already used.
pub fn reset_password(
    db: &QueryExecutor<'_>,
    code: Uuid,
    pass_hash: &str,
) -> Result<Option<i32>, DbError> {
    db.transaction(|tx| {
        let Some(account_id) = email_verification::consume(tx, code)? else {
            return Ok(None);
        };
        tx.fetch_none(
            "UPDATE account\
             \n   SET pass_hash = %(pass_hash)s\
             \n WHERE id = %(account_id)s",
            &params! { "pass_hash" => pass_hash, "account_id" => account_id },
        )?;
        Ok(Some(account_id))
    })
}
