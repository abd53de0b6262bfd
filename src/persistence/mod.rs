//! Domain queries.
//!
//! One module per table or view. Every function takes a [`QueryExecutor`], so the same
//! code runs on the pool, inside a transaction, or against the test engine.
//!
//! [`QueryExecutor`]: crate::executor::QueryExecutor

pub mod account;
pub mod business_hour;
pub mod court;
pub mod email_verification;
pub mod reservation;
pub mod reservation_member;
pub mod stadium;
pub mod venue;
pub mod view;
