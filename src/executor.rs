//! Query Executor
//!
//! Provides the [`QueryEngine`] capability that abstracts one database engine, and the
//! [`QueryExecutor`] that every domain query goes through:
//!
//! 1. rewrite the `%(name)s` template into positional form and bind its arguments,
//! 2. log the rewritten statement with its arguments,
//! 3. dispatch on the [`Fetch`] directive,
//! 4. translate unique-constraint violations into [`DbError::UniqueViolation`].
//!
//! Every other engine failure is returned unchanged.

use crate::query::{to_positional, ParameterSet};
use crate::row::RawRow;
use crate::transaction::Transaction;
use crate::value::postgres::decode_row;
use crate::value::Value;
use may_postgres::error::SqlState;
use may_postgres::types::ToSql;
use may_postgres::{Client, Error as PostgresError};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// Persistence-layer error type
#[derive(Debug)]
pub enum DbError {
    /// `PostgreSQL` error from `may_postgres`
    Postgres(PostgresError),
    /// A uniqueness constraint rejected the statement
    UniqueViolation,
    /// The query template has malformed placeholder syntax
    Template(String),
    /// The template references a parameter that was not supplied
    MissingParameter(String),
    /// Row decoding/mapping error
    Decode(String),
    /// No pooled connection could be acquired
    Pool(String),
    /// Other execution errors
    Other(String),
}

impl DbError {
    /// Stable kind name, used as the error label in HTTP envelopes.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DbError::Postgres(_) => "PostgresError",
            DbError::UniqueViolation => "UniqueViolationError",
            DbError::Template(_) => "TemplateError",
            DbError::MissingParameter(_) => "MissingParameterError",
            DbError::Decode(_) => "DecodeError",
            DbError::Pool(_) => "PoolError",
            DbError::Other(_) => "DbError",
        }
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Postgres(e) => write!(f, "PostgreSQL error: {e}"),
            DbError::UniqueViolation => write!(f, "Unique constraint violation"),
            DbError::Template(s) => write!(f, "Template error: {s}"),
            DbError::MissingParameter(name) => {
                write!(f, "Missing query parameter: {name}")
            }
            DbError::Decode(s) => write!(f, "Decode error: {s}"),
            DbError::Pool(s) => write!(f, "Pool error: {s}"),
            DbError::Other(s) => write!(f, "Execution error: {s}"),
        }
    }
}

impl std::error::Error for DbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DbError::Postgres(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for DbError {
    fn from(err: PostgresError) -> Self {
        DbError::Postgres(err)
    }
}

/// Fetch-cardinality directive of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fetch {
    /// Execute only; no rows are returned.
    #[default]
    None,
    /// First row, or absence.
    One,
    /// Every row, possibly none.
    All,
}

impl Fetch {
    /// Parse a loosely typed directive. `"none"`/`"0"` and `"one"`/`"1"` and `"all"`
    /// are recognized exactly as written; anything else, including other casings or
    /// surrounding whitespace, falls back to [`Fetch::None`].
    pub fn from_directive(directive: &str) -> Self {
        match directive {
            "one" | "1" => Fetch::One,
            "all" => Fetch::All,
            _ => Fetch::None,
        }
    }
}

impl FromStr for Fetch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Fetch::from_directive(s))
    }
}

/// Result shape of [`QueryExecutor::execute`], one variant per [`Fetch`] directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Rows affected by an execute-only statement.
    None(u64),
    One(Option<RawRow>),
    All(Vec<RawRow>),
}

impl Fetched {
    pub fn into_one(self) -> Option<RawRow> {
        match self {
            Fetched::One(row) => row,
            Fetched::All(rows) => rows.into_iter().next(),
            Fetched::None(_) => None,
        }
    }

    pub fn into_all(self) -> Vec<RawRow> {
        match self {
            Fetched::All(rows) => rows,
            Fetched::One(row) => row.into_iter().collect(),
            Fetched::None(_) => Vec::new(),
        }
    }
}

/// Capability of one database engine.
///
/// Implementations receive statements already in their positional dialect. The
/// pooled implementation acquires a connection per call; the client implementation
/// runs on a connection it already holds (used inside transactions).
pub trait QueryEngine {
    /// Rewrite a named template into the engine's positional dialect and bind it.
    ///
    /// The default produces PostgreSQL `$n` placeholders, one per occurrence.
    fn format(&self, template: &str, params: &ParameterSet) -> Result<(String, Vec<Value>), DbError> {
        let query = to_positional(template)?;
        let args = query.bind(params)?;
        Ok((query.sql, args))
    }

    /// Execute and return every row.
    fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<RawRow>, DbError>;

    /// Execute and return the first row, if any.
    fn fetch_one(&self, sql: &str, args: &[Value]) -> Result<Option<RawRow>, DbError>;

    /// Execute without returning rows; yields the affected row count.
    fn fetch_none(&self, sql: &str, args: &[Value]) -> Result<u64, DbError>;

    /// Whether `err` is this engine's uniqueness-violation failure.
    fn is_unique_violation(&self, err: &DbError) -> bool;

    /// Run `body` atomically: commit when it returns `Ok`, roll back otherwise.
    fn transaction(
        &self,
        body: &mut dyn FnMut(&dyn QueryEngine) -> Result<(), DbError>,
    ) -> Result<(), DbError>;
}

/// Uniqueness check shared by the PostgreSQL engines.
pub fn is_postgres_unique_violation(err: &DbError) -> bool {
    match err {
        DbError::Postgres(e) => e.code() == Some(&SqlState::UNIQUE_VIOLATION),
        DbError::UniqueViolation => true,
        _ => false,
    }
}

/// [`QueryEngine`] on a single `may_postgres::Client`.
pub struct ClientEngine<'c> {
    client: &'c Client,
    depth: u32,
}

impl<'c> ClientEngine<'c> {
    pub fn new(client: &'c Client) -> Self {
        Self { client, depth: 0 }
    }

    pub(crate) fn nested(client: &'c Client, depth: u32) -> Self {
        Self { client, depth }
    }

    fn run<T>(
        &self,
        sql: &str,
        args: &[Value],
        op: impl FnOnce(&Client, &[&dyn ToSql]) -> Result<T, PostgresError>,
    ) -> Result<T, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("db.statement", sql = %sql, args = args.len()).entered();

        let params: Vec<&dyn ToSql> = args.iter().map(|a| a as &dyn ToSql).collect();
        let start = Instant::now();
        let result = op(self.client, &params).map_err(|e| {
            #[cfg(feature = "metrics")]
            METRICS.record_query_error();
            DbError::Postgres(e)
        });

        #[cfg(feature = "metrics")]
        METRICS.record_query(start.elapsed());
        #[cfg(not(feature = "metrics"))]
        let _ = start;

        result
    }
}

impl QueryEngine for ClientEngine<'_> {
    fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<RawRow>, DbError> {
        let rows = self.run(sql, args, |client, params| client.query(sql, params))?;
        rows.iter().map(decode_row).collect()
    }

    fn fetch_one(&self, sql: &str, args: &[Value]) -> Result<Option<RawRow>, DbError> {
        let rows = self.run(sql, args, |client, params| client.query(sql, params))?;
        rows.first().map(decode_row).transpose()
    }

    fn fetch_none(&self, sql: &str, args: &[Value]) -> Result<u64, DbError> {
        self.run(sql, args, |client, params| client.execute(sql, params))
    }

    fn is_unique_violation(&self, err: &DbError) -> bool {
        is_postgres_unique_violation(err)
    }

    fn transaction(
        &self,
        body: &mut dyn FnMut(&dyn QueryEngine) -> Result<(), DbError>,
    ) -> Result<(), DbError> {
        let tx = Transaction::begin(self.client, self.depth)?;
        let result = body(&tx.engine());
        tx.finish(result)
    }
}

/// Executes named-parameter templates against a [`QueryEngine`].
///
/// # Examples
///
/// ```no_run
/// use courtside::executor::{Fetch, QueryExecutor};
/// use courtside::pool::{ConnectionPool, DatabaseConfig};
/// use courtside::params;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = ConnectionPool::connect(&DatabaseConfig::default())?;
/// let db = QueryExecutor::new(&pool);
/// let rows = db.fetch_all(
///     "SELECT id FROM court WHERE venue_id = %(venue_id)s ORDER BY id",
///     &params! { "venue_id" => 1 },
/// )?;
/// let fetched = db.execute("SELECT 1", Fetch::One, &params! {})?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy)]
pub struct QueryExecutor<'e> {
    engine: &'e dyn QueryEngine,
}

impl<'e> QueryExecutor<'e> {
    pub fn new(engine: &'e dyn QueryEngine) -> Self {
        Self { engine }
    }

    /// Execute `template` with the given cardinality.
    ///
    /// # Errors
    ///
    /// - `DbError::Template` / `DbError::MissingParameter` before anything is executed
    /// - `DbError::UniqueViolation` when the engine reports a uniqueness conflict
    /// - any other engine error unchanged
    pub fn execute(
        &self,
        template: &str,
        fetch: Fetch,
        params: &ParameterSet,
    ) -> Result<Fetched, DbError> {
        let (sql, args) = self.engine.format(template, params)?;
        log::info!("{sql} {args:?}");

        let result = match fetch {
            Fetch::All => self.engine.fetch_all(&sql, &args).map(Fetched::All),
            Fetch::One => self.engine.fetch_one(&sql, &args).map(Fetched::One),
            Fetch::None => self.engine.fetch_none(&sql, &args).map(Fetched::None),
        };

        result.map_err(|e| {
            if self.engine.is_unique_violation(&e) {
                DbError::UniqueViolation
            } else {
                e
            }
        })
    }

    /// Execute and return every row.
    pub fn fetch_all(&self, template: &str, params: &ParameterSet) -> Result<Vec<RawRow>, DbError> {
        self.execute(template, Fetch::All, params).map(Fetched::into_all)
    }

    /// Execute and return the first row, or `None` when nothing matched.
    pub fn fetch_one(&self, template: &str, params: &ParameterSet) -> Result<Option<RawRow>, DbError> {
        self.execute(template, Fetch::One, params).map(Fetched::into_one)
    }

    /// Execute a statement for its side effects.
    pub fn fetch_none(&self, template: &str, params: &ParameterSet) -> Result<u64, DbError> {
        match self.execute(template, Fetch::None, params)? {
            Fetched::None(affected) => Ok(affected),
            _ => Ok(0),
        }
    }

    /// Run `f` inside a transaction on a single connection.
    ///
    /// Commits when `f` returns `Ok`; rolls back and returns the error otherwise.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&QueryExecutor<'_>) -> Result<R, DbError>,
    ) -> Result<R, DbError> {
        let mut f = Some(f);
        let mut output = None;
        self.engine.transaction(&mut |engine: &dyn QueryEngine| {
            let f = f
                .take()
                .ok_or_else(|| DbError::Other("transaction body ran twice".to_string()))?;
            let value = f(&QueryExecutor::new(engine))?;
            output = Some(value);
            Ok(())
        })?;
        output.ok_or_else(|| DbError::Other("transaction body did not run".to_string()))
    }
}
