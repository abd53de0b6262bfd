//! PostgreSQL binding and decoding for [`Value`].
//!
//! Binding: a `Value` accepts every parameter type and adapts to the server-inferred
//! type at bind time (integer width, enum labels). Decoding: every driver row is turned
//! into a [`RawRow`] by inspecting each column's type.

use crate::executor::DbError;
use crate::row::RawRow;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use may_postgres::types::{to_sql_checked, FromSql, IsNull, Kind, ToSql, Type};
use may_postgres::Row;
use std::error::Error;
use uuid::Uuid;

type BoxError = Box<dyn Error + Sync + Send>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT8 {
                    i64::from(*v).to_sql(ty, out)
                } else if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::FLOAT8 {
                    f64::from(*v).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::BigInt(v) => {
                if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Double(v) => {
                if *ty == Type::FLOAT4 {
                    narrow_to_real(*v)?.to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(v) => match ty.kind() {
                // Enum labels travel as their raw UTF-8 bytes.
                Kind::Enum(_) => {
                    out.extend_from_slice(v.as_bytes());
                    Ok(IsNull::No)
                }
                _ => v.to_sql(ty, out),
            },
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::TimestampTz(v) => v.to_sql(ty, out),
            Value::Time(v) => v.to_sql(ty, out),
            Value::Date(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
            Value::TextArray(v) => v.to_sql(ty, out),
            Value::IntArray(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Round a double to the nearest `real`, the way a `float8::float4` cast does.
///
/// Like the server cast, a finite value that overflows to infinity or a non-zero value
/// that underflows to zero is an error rather than a silent change of magnitude.
fn narrow_to_real(v: f64) -> Result<f32, BoxError> {
    let narrowed = v as f32;
    if v.is_finite() && narrowed.is_infinite() {
        return Err(format!("{v} is out of range for type real (overflow)").into());
    }
    if v != 0.0 && narrowed == 0.0 {
        return Err(format!("{v} is out of range for type real (underflow)").into());
    }
    Ok(narrowed)
}

/// Label of a PostgreSQL enum value.
struct EnumLabel(String);

impl<'a> FromSql<'a> for EnumLabel {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(EnumLabel(std::str::from_utf8(raw)?.to_owned()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

fn column<'a, T, F>(row: &'a Row, idx: usize, wrap: F) -> Result<Value, DbError>
where
    T: FromSql<'a>,
    F: FnOnce(T) -> Value,
{
    let cell = row
        .try_get::<usize, Option<T>>(idx)
        .map_err(|e| DbError::Decode(format!("column {idx}: {e}")))?;
    Ok(cell.map_or(Value::Null, wrap))
}

/// Decode one driver row into a [`RawRow`], preserving column order.
///
/// # Errors
///
/// Returns `DbError::Decode` for a column type the query layer does not model.
pub fn decode_row(row: &Row) -> Result<RawRow, DbError> {
    let mut values = Vec::with_capacity(row.columns().len());
    for (idx, col) in row.columns().iter().enumerate() {
        let ty = col.type_();
        let value = if *ty == Type::BOOL {
            column::<bool, _>(row, idx, Value::Bool)?
        } else if *ty == Type::INT2 {
            column::<i16, _>(row, idx, |v| Value::Int(i32::from(v)))?
        } else if *ty == Type::INT4 {
            column::<i32, _>(row, idx, Value::Int)?
        } else if *ty == Type::INT8 {
            column::<i64, _>(row, idx, Value::BigInt)?
        } else if *ty == Type::FLOAT4 {
            column::<f32, _>(row, idx, |v| Value::Double(f64::from(v)))?
        } else if *ty == Type::FLOAT8 {
            column::<f64, _>(row, idx, Value::Double)?
        } else if *ty == Type::TEXT
            || *ty == Type::VARCHAR
            || *ty == Type::BPCHAR
            || *ty == Type::NAME
        {
            column::<String, _>(row, idx, Value::Text)?
        } else if *ty == Type::UUID {
            column::<Uuid, _>(row, idx, Value::Uuid)?
        } else if *ty == Type::TIMESTAMP {
            column::<NaiveDateTime, _>(row, idx, Value::Timestamp)?
        } else if *ty == Type::TIMESTAMPTZ {
            column::<DateTime<Utc>, _>(row, idx, Value::TimestampTz)?
        } else if *ty == Type::TIME {
            column::<NaiveTime, _>(row, idx, Value::Time)?
        } else if *ty == Type::DATE {
            column::<NaiveDate, _>(row, idx, Value::Date)?
        } else if *ty == Type::JSON || *ty == Type::JSONB {
            column::<serde_json::Value, _>(row, idx, Value::Json)?
        } else if *ty == Type::TEXT_ARRAY || *ty == Type::VARCHAR_ARRAY {
            column::<Vec<String>, _>(row, idx, Value::TextArray)?
        } else if *ty == Type::INT4_ARRAY {
            column::<Vec<i32>, _>(row, idx, Value::IntArray)?
        } else if matches!(ty.kind(), Kind::Enum(_)) {
            column::<EnumLabel, _>(row, idx, |v| Value::Text(v.0))?
        } else {
            return Err(DbError::Decode(format!(
                "column {} ({}) has unsupported type {}",
                idx,
                col.name(),
                ty.name()
            )));
        };
        values.push(value);
    }
    Ok(RawRow::new(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_binds_as_enum_label() {
        let ty = Type::new(
            "place_type".to_string(),
            0,
            Kind::Enum(vec!["stadium".to_string(), "venue".to_string()]),
            "public".to_string(),
        );
        let mut out = BytesMut::new();
        let result = Value::Text("venue".into()).to_sql(&ty, &mut out).unwrap();
        assert!(matches!(result, IsNull::No));
        assert_eq!(&out[..], b"venue");
    }

    #[test]
    fn test_int_widens_to_int8() {
        let mut out = BytesMut::new();
        Value::Int(5).to_sql(&Type::INT8, &mut out).unwrap();
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn test_double_narrowing_to_real() {
        let mut out = BytesMut::new();
        Value::Double(121.5).to_sql(&Type::FLOAT4, &mut out).unwrap();
        assert_eq!(&out[..], &121.5_f32.to_be_bytes());

        assert!(Value::Double(1e300).to_sql(&Type::FLOAT4, &mut BytesMut::new()).is_err());
        assert!(Value::Double(-1e300).to_sql(&Type::FLOAT4, &mut BytesMut::new()).is_err());
        assert!(Value::Double(1e-300).to_sql(&Type::FLOAT4, &mut BytesMut::new()).is_err());
        assert!(Value::Double(f64::INFINITY).to_sql(&Type::FLOAT4, &mut BytesMut::new()).is_ok());
        assert!(Value::Double(0.0).to_sql(&Type::FLOAT4, &mut BytesMut::new()).is_ok());
        // Double precision columns keep every bit.
        assert!(Value::Double(1e300).to_sql(&Type::FLOAT8, &mut BytesMut::new()).is_ok());
    }

    #[test]
    fn test_bigint_narrowing_overflow_is_error() {
        let mut out = BytesMut::new();
        assert!(Value::BigInt(i64::MAX).to_sql(&Type::INT4, &mut out).is_err());
    }

    #[test]
    fn test_null_binds_as_null() {
        let mut out = BytesMut::new();
        let result = Value::Null.to_sql(&Type::TEXT, &mut out).unwrap();
        assert!(matches!(result, IsNull::Yes));
        assert!(out.is_empty());
    }
}
