//! Scripted in-memory engine for tests.
//!
//! `MockEngine` records every statement it receives (already rewritten into positional
//! form) and answers from a queue of scripted results, in order.

use crate::executor::{DbError, Fetch, QueryEngine};
use crate::row::RawRow;
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A statement as the engine saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub args: Vec<Value>,
    pub fetch: Fetch,
}

#[derive(Debug)]
enum Scripted {
    Rows(Vec<RawRow>),
    Affected(u64),
    Error(DbError),
}

#[derive(Default)]
struct MockState {
    responses: VecDeque<Scripted>,
    statements: Vec<RecordedStatement>,
    transactions: Vec<&'static str>,
}

/// Engine double that replays scripted results.
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error the mock classifies as a uniqueness violation.
    pub fn unique_violation() -> DbError {
        DbError::Other("23505 duplicate key value violates unique constraint".to_string())
    }

    pub fn push_rows(&self, rows: Vec<RawRow>) {
        self.lock().responses.push_back(Scripted::Rows(rows));
    }

    pub fn push_row(&self, row: RawRow) {
        self.push_rows(vec![row]);
    }

    pub fn push_affected(&self, affected: u64) {
        self.lock().responses.push_back(Scripted::Affected(affected));
    }

    pub fn push_error(&self, error: DbError) {
        self.lock().responses.push_back(Scripted::Error(error));
    }

    /// Every statement received so far.
    pub fn statements(&self) -> Vec<RecordedStatement> {
        self.lock().statements.clone()
    }

    /// `BEGIN` / `COMMIT` / `ROLLBACK` markers, in order.
    pub fn transaction_log(&self) -> Vec<&'static str> {
        self.lock().transactions.clone()
    }

    /// Number of scripted responses not consumed yet.
    pub fn pending(&self) -> usize {
        self.lock().responses.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn respond(&self, sql: &str, args: &[Value], fetch: Fetch) -> Result<Scripted, DbError> {
        let mut state = self.lock();
        state.statements.push(RecordedStatement {
            sql: sql.to_string(),
            args: args.to_vec(),
            fetch,
        });
        match state.responses.pop_front() {
            Some(Scripted::Error(e)) => Err(e),
            Some(other) => Ok(other),
            None => Err(DbError::Other(format!("no scripted response for: {sql}"))),
        }
    }
}

impl QueryEngine for MockEngine {
    fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<RawRow>, DbError> {
        match self.respond(sql, args, Fetch::All)? {
            Scripted::Rows(rows) => Ok(rows),
            _ => Ok(Vec::new()),
        }
    }

    fn fetch_one(&self, sql: &str, args: &[Value]) -> Result<Option<RawRow>, DbError> {
        match self.respond(sql, args, Fetch::One)? {
            Scripted::Rows(rows) => Ok(rows.into_iter().next()),
            _ => Ok(None),
        }
    }

    fn fetch_none(&self, sql: &str, args: &[Value]) -> Result<u64, DbError> {
        match self.respond(sql, args, Fetch::None)? {
            Scripted::Affected(n) => Ok(n),
            Scripted::Rows(rows) => Ok(rows.len() as u64),
            Scripted::Error(e) => Err(e),
        }
    }

    fn is_unique_violation(&self, err: &DbError) -> bool {
        match err {
            DbError::Other(msg) => msg.starts_with("23505"),
            DbError::UniqueViolation => true,
            _ => false,
        }
    }

    fn transaction(
        &self,
        body: &mut dyn FnMut(&dyn QueryEngine) -> Result<(), DbError>,
    ) -> Result<(), DbError> {
        self.lock().transactions.push("BEGIN");
        let result = body(self);
        self.lock()
            .transactions
            .push(if result.is_ok() { "COMMIT" } else { "ROLLBACK" });
        result
    }
}
