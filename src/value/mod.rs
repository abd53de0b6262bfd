//! Value type system for Courtside
//!
//! [`Value`] is the single dynamically typed cell that flows through the query layer:
//! named parameters are stored as `Value`s, bound positionally through `ToSql`, and
//! every decoded column of a [`RawRow`](crate::row::RawRow) is a `Value` as well.
//!
//! ## Traits
//!
//! - **`TryGetable`** - Safe extraction of a Rust type out of a `Value`
//! - **`ToSql`** (in [`postgres`]) - Binding a `Value` to any PostgreSQL parameter type

pub mod postgres;
pub mod try_getable;

pub use try_getable::{TryGetable, ValueExtractionError};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

/// A single SQL value, either a bound parameter or a decoded column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Time(NaiveTime),
    Date(NaiveDate),
    Json(serde_json::Value),
    TextArray(Vec<String>),
    IntArray(Vec<i32>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, used in extraction errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::BigInt(_) => "BigInt",
            Value::Double(_) => "Double",
            Value::Text(_) => "Text",
            Value::Uuid(_) => "Uuid",
            Value::Timestamp(_) => "Timestamp",
            Value::TimestampTz(_) => "TimestampTz",
            Value::Time(_) => "Time",
            Value::Date(_) => "Date",
            Value::Json(_) => "Json",
            Value::TextArray(_) => "TextArray",
            Value::IntArray(_) => "IntArray",
        }
    }
}

macro_rules! impl_from_for_value {
    ($type:ty, $variant:ident) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_from_for_value!(bool, Bool);
impl_from_for_value!(i32, Int);
impl_from_for_value!(i64, BigInt);
impl_from_for_value!(f64, Double);
impl_from_for_value!(String, Text);
impl_from_for_value!(Uuid, Uuid);
impl_from_for_value!(NaiveDateTime, Timestamp);
impl_from_for_value!(DateTime<Utc>, TimestampTz);
impl_from_for_value!(NaiveTime, Time);
impl_from_for_value!(NaiveDate, Date);
impl_from_for_value!(serde_json::Value, Json);
impl_from_for_value!(Vec<String>, TextArray);
impl_from_for_value!(Vec<i32>, IntArray);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
