//! Transaction Module
//!
//! Wraps a held `may_postgres::Client` in a transaction scope:
//! - depth 0 issues `BEGIN` / `COMMIT` / `ROLLBACK`
//! - deeper scopes use savepoints (`SAVEPOINT sp_n`, `RELEASE SAVEPOINT sp_n`,
//!   `ROLLBACK TO SAVEPOINT sp_n`)
//!
//! A scope that is dropped without being finished is rolled back.

use crate::executor::{ClientEngine, DbError};
use crate::raw_sql::execute_unprepared;
use may_postgres::Client;

/// An open transaction (or savepoint) on a borrowed client.
pub struct Transaction<'c> {
    client: &'c Client,
    depth: u32,
    closed: bool,
}

impl<'c> Transaction<'c> {
    /// Open a transaction at `depth`; `0` is a top-level transaction.
    pub fn begin(client: &'c Client, depth: u32) -> Result<Self, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("db.begin", depth).entered();

        let sql = if depth == 0 {
            "BEGIN".to_string()
        } else {
            format!("SAVEPOINT sp_{depth}")
        };
        execute_unprepared(client, &sql)?;

        Ok(Self {
            client,
            depth,
            closed: false,
        })
    }

    /// Engine that runs statements inside this transaction.
    pub fn engine(&self) -> ClientEngine<'c> {
        ClientEngine::nested(self.client, self.depth + 1)
    }

    /// Commit the transaction or release the savepoint.
    pub fn commit(mut self) -> Result<(), DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("db.commit", depth = self.depth).entered();

        self.closed = true;
        if self.depth == 0 {
            execute_unprepared(self.client, "COMMIT")
        } else {
            execute_unprepared(self.client, &format!("RELEASE SAVEPOINT sp_{}", self.depth))
        }
    }

    /// Roll back the transaction or return to the savepoint.
    pub fn rollback(mut self) -> Result<(), DbError> {
        self.closed = true;
        self.rollback_in_place()
    }

    /// Commit on `Ok`, roll back on `Err`, and hand back the body's result.
    ///
    /// A failed rollback is logged; the body's error is the one returned.
    pub fn finish<T>(self, result: Result<T, DbError>) -> Result<T, DbError> {
        match result {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback() {
                    log::error!("rollback after '{err}' failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn rollback_in_place(&self) -> Result<(), DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("db.rollback", depth = self.depth).entered();

        if self.depth == 0 {
            execute_unprepared(self.client, "ROLLBACK")
        } else {
            execute_unprepared(
                self.client,
                &format!("ROLLBACK TO SAVEPOINT sp_{}", self.depth),
            )
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.rollback_in_place() {
                log::error!("rollback of abandoned transaction failed: {e}");
            }
        }
    }
}
