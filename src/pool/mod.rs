//! Connection pooling.
//!
//! The pool is the only owner of database clients. Callers never hold a client across
//! statements; the executor checks one out per statement, or per transaction.

pub mod config;
pub mod manager;

pub use config::DatabaseConfig;
pub use manager::{ConnectionPool, Pool, Pooled, PooledConnection};
