//! Application errors and their HTTP classification.

use crate::client::ClientError;
use crate::executor::DbError;
use crate::security::TokenError;
use std::fmt;

/// Every failure a handler can return.
///
/// Each variant knows its status code and the kind name written to the envelope's
/// `error` field. Unclassified failures map to 500 and are named after their kind.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input (422)
    IllegalInput(String),
    NotFound,
    LoginFailed,
    LoginExpired,
    NoPermission,
    EmailExists,
    ReservationFull,
    /// Uniqueness conflict not claimed by a more specific kind (409)
    UniqueViolation,
    /// Persistence failure (500)
    Db(DbError),
    /// Collaborator failure (500)
    Client(ClientError),
}

impl AppError {
    pub fn status(&self) -> u16 {
        match self {
            AppError::IllegalInput(_) => 422,
            AppError::NotFound => 404,
            AppError::LoginFailed | AppError::LoginExpired => 401,
            AppError::NoPermission => 403,
            AppError::EmailExists | AppError::ReservationFull | AppError::UniqueViolation => 409,
            AppError::Db(_) | AppError::Client(_) => 500,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AppError::IllegalInput(_) => "IllegalInput",
            AppError::NotFound => "NotFound",
            AppError::LoginFailed => "LoginFailed",
            AppError::LoginExpired => "LoginExpired",
            AppError::NoPermission => "NoPermission",
            AppError::EmailExists => "EmailExists",
            AppError::ReservationFull => "ReservationFull",
            AppError::UniqueViolation => "UniqueViolationError",
            AppError::Db(e) => e.kind_name(),
            AppError::Client(_) => "ClientError",
        }
    }

    /// Login failures also drop the session cookies.
    pub fn clears_session(&self) -> bool {
        matches!(self, AppError::LoginFailed | AppError::LoginExpired)
    }

    pub fn is_unclassified(&self) -> bool {
        self.status() >= 500
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IllegalInput(reason) => write!(f, "IllegalInput: {reason}"),
            AppError::Db(e) => write!(f, "{e}"),
            AppError::Client(e) => write!(f, "{e}"),
            other => f.write_str(other.kind_name()),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Db(e) => Some(e),
            AppError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation => AppError::UniqueViolation,
            other => AppError::Db(other),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::Client(err)
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::LoginExpired,
            TokenError::Malformed | TokenError::BadSignature => AppError::LoginFailed,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::IllegalInput(err.to_string())
    }
}
