//! TryGetable trait for safe value extraction
//!
//! Row mappers pull typed fields out of decoded columns through this trait. Extraction
//! distinguishes a NULL cell from a cell of the wrong type so that a drifted SELECT list
//! surfaces as a clear error instead of a silently wrong field.

use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueExtractionError {
    /// The value is null
    NullValue,
    /// The value type doesn't match the expected type
    TypeMismatch {
        expected: String,
        actual: String,
    },
    /// Value conversion failed (e.g., overflow, invalid format)
    ConversionError(String),
}

impl std::fmt::Display for ValueExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueExtractionError::NullValue => write!(f, "Value is null"),
            ValueExtractionError::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {expected}, got {actual}")
            }
            ValueExtractionError::ConversionError(msg) => {
                write!(f, "Conversion error: {msg}")
            }
        }
    }
}

impl std::error::Error for ValueExtractionError {}

/// Trait for safe value extraction with error handling
///
/// ```rust
/// use courtside::value::{TryGetable, Value, ValueExtractionError};
///
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(Value::Int(42));
/// assert_eq!(result, Ok(42));
///
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(Value::Null);
/// assert!(matches!(result, Err(ValueExtractionError::NullValue)));
///
/// let result: Result<Option<i32>, ValueExtractionError> = TryGetable::try_get(Value::Null);
/// assert_eq!(result, Ok(None));
/// ```
pub trait TryGetable: Sized {
    /// Extract `Self` from a value.
    ///
    /// Returns:
    /// - `Ok(T)` if the value matches the expected type and is not null
    /// - `Err(ValueExtractionError::NullValue)` if the value is null
    /// - `Err(ValueExtractionError::TypeMismatch)` if the value type doesn't match
    /// - `Err(ValueExtractionError::ConversionError)` if conversion fails (e.g., overflow)
    fn try_get(value: Value) -> Result<Self, ValueExtractionError>;
}

fn mismatch(expected: &str, value: &Value) -> ValueExtractionError {
    ValueExtractionError::TypeMismatch {
        expected: expected.to_string(),
        actual: value.type_name().to_string(),
    }
}

macro_rules! impl_try_getable {
    ($type:ty, $variant:ident, $expected:expr) => {
        impl TryGetable for $type {
            fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Null => Err(ValueExtractionError::NullValue),
                    other => Err(mismatch($expected, &other)),
                }
            }
        }
    };
}

impl_try_getable!(bool, Bool, "Bool");
impl_try_getable!(String, Text, "Text");
impl_try_getable!(Uuid, Uuid, "Uuid");
impl_try_getable!(NaiveDateTime, Timestamp, "Timestamp");
impl_try_getable!(DateTime<Utc>, TimestampTz, "TimestampTz");
impl_try_getable!(NaiveTime, Time, "Time");
impl_try_getable!(NaiveDate, Date, "Date");
impl_try_getable!(serde_json::Value, Json, "Json");
impl_try_getable!(Vec<String>, TextArray, "TextArray");
impl_try_getable!(Vec<i32>, IntArray, "IntArray");

impl TryGetable for i32 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Int(v) => Ok(v),
            Value::BigInt(v) => i32::try_from(v).map_err(|_| {
                ValueExtractionError::ConversionError(format!("BigInt {v} does not fit in i32"))
            }),
            Value::Null => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Int", &other)),
        }
    }
}

impl TryGetable for i64 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::BigInt(v) => Ok(v),
            Value::Int(v) => Ok(i64::from(v)),
            Value::Null => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("BigInt", &other)),
        }
    }
}

impl TryGetable for f64 {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match value {
            Value::Double(v) => Ok(v),
            Value::Int(v) => Ok(f64::from(v)),
            Value::Null => Err(ValueExtractionError::NullValue),
            other => Err(mismatch("Double", &other)),
        }
    }
}

impl<T: TryGetable> TryGetable for Option<T> {
    fn try_get(value: Value) -> Result<Self, ValueExtractionError> {
        match T::try_get(value) {
            Ok(v) => Ok(Some(v)),
            Err(ValueExtractionError::NullValue) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
