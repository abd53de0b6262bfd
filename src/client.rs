//! Outbound collaborators: verification mail and calendar sync.
//!
//! The defaults only log; deployments plug in real clients behind the same traits.

use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError(pub String);

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client error: {}", self.0)
    }
}

impl std::error::Error for ClientError {}

pub trait Mailer: Send + Sync {
    /// Send the link that verifies `to`.
    fn send_verification(&self, to: &str, code: Uuid) -> Result<(), ClientError>;

    /// Send the code that allows resetting the password of `to`.
    fn send_password_reset(&self, to: &str, code: Uuid) -> Result<(), ClientError>;
}

/// Add reservation members to the shared calendar event.
pub trait CalendarSync: Send + Sync {
    fn add_member(&self, reservation_id: i32, member_id: i32) -> Result<(), ClientError>;
}

pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_verification(&self, to: &str, code: Uuid) -> Result<(), ClientError> {
        log::info!("verification mail to {to}: code {code}");
        Ok(())
    }

    fn send_password_reset(&self, to: &str, code: Uuid) -> Result<(), ClientError> {
        log::info!("password reset mail to {to}: code {code}");
        Ok(())
    }
}

pub struct LogCalendar;

impl CalendarSync for LogCalendar {
    fn add_member(&self, reservation_id: i32, member_id: i32) -> Result<(), ClientError> {
        log::info!("calendar: account {member_id} joined reservation {reservation_id}");
        Ok(())
    }
}
