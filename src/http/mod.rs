//! HTTP surface.
//!
//! [`App`] owns the collaborators and routes an [`HttpRequest`] to a handler. Handlers
//! return `Result<HttpReply, AppError>`; errors become envelopes in one place. The
//! `may_minihttp` adapter lives in [`service`] and only translates the wire format.

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod service;

pub use error::AppError;
pub use request::HttpRequest;
pub use response::{Envelope, HttpReply};

use crate::client::{CalendarSync, LogCalendar, LogMailer, Mailer};
use crate::executor::{QueryEngine, QueryExecutor};
use crate::security::{Credentials, TokenClaims};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Shared application state.
pub struct App {
    engine: Arc<dyn QueryEngine + Send + Sync>,
    pub credentials: Arc<dyn Credentials>,
    pub mailer: Arc<dyn Mailer>,
    pub calendar: Arc<dyn CalendarSync>,
    clock: fn() -> DateTime<Utc>,
}

impl App {
    /// App with logging mail and calendar clients and the system clock.
    pub fn new(
        engine: Arc<dyn QueryEngine + Send + Sync>,
        credentials: Arc<dyn Credentials>,
    ) -> Self {
        Self {
            engine,
            credentials,
            mailer: Arc::new(LogMailer),
            calendar: Arc::new(LogCalendar),
            clock: Utc::now,
        }
    }

    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar: Arc<dyn CalendarSync>) -> Self {
        self.calendar = calendar;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn db(&self) -> QueryExecutor<'_> {
        QueryExecutor::new(&*self.engine)
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Claims of the bearer token, or `LoginFailed` / `LoginExpired`.
    pub fn authenticate(&self, req: &HttpRequest) -> Result<TokenClaims, AppError> {
        let token = req.bearer_token().ok_or(AppError::LoginFailed)?;
        Ok(self.credentials.verify_token(token, self.now())?)
    }

    /// Route and run one request. Never fails; errors become envelopes.
    pub fn handle(&self, req: &HttpRequest) -> HttpReply {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("http.request", method = %req.method, path = %req.path).entered();

        match handlers::route(self, req) {
            Ok(reply) => reply,
            Err(err) => HttpReply::from_error(&err),
        }
    }
}
