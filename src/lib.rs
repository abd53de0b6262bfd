//! # Courtside
//!
//! Booking backend for sports venues on PostgreSQL and the `may` coroutine runtime.
//!
//! The data layer is a small dynamic-SQL toolkit:
//!
//! - [`query`] composes optional filter criteria into `%(name)s` templates and rewrites
//!   them to positional `$n` placeholders
//! - [`executor`] runs a template with a fetch cardinality (`none`, `one`, `all`) and
//!   translates unique violations
//! - [`row`] maps raw rows positionally into domain and view objects
//!
//! [`persistence`] holds one module of queries per table or view, and [`http`] is the
//! thin route layer on top of it.

#[macro_use]
pub mod macros;

pub mod client;
pub mod config;
pub mod connection;
pub mod domain;
pub mod executor;
pub mod http;
pub mod persistence;
pub mod pool;
pub mod query;
pub mod raw_sql;
pub mod row;
pub mod security;
pub mod transaction;
pub mod value;

#[cfg(feature = "metrics")]
pub mod metrics;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use executor::{DbError, Fetch, QueryEngine, QueryExecutor};
pub use pool::{ConnectionPool, DatabaseConfig};
pub use query::{Criteria, ParameterSet};
pub use row::{FromRow, RawRow};
pub use value::Value;
