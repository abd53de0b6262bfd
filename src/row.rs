//! Raw rows and positional row mapping.
//!
//! A [`RawRow`] is the ordered list of column values a statement returned. Mappers
//! consume it front to back with a [`RowReader`], so the field order of every mapper
//! has to match the SELECT list of its query. [`RowReader::finish`] turns a drift
//! between the two into a `DbError::Decode` instead of a silently shifted field.

use crate::executor::DbError;
use crate::value::{TryGetable, Value};
use serde::de::DeserializeOwned;

/// Ordered column values of a single result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    values: Vec<Value>,
}

impl RawRow {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Start reading the row positionally.
    pub fn reader(self) -> RowReader {
        RowReader {
            width: self.values.len(),
            values: self.values.into_iter(),
            position: 0,
        }
    }
}

impl From<Vec<Value>> for RawRow {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

/// Builds a [`RawRow`] from a list of values convertible into [`Value`].
///
/// ```
/// use courtside::raw_row;
/// let row = raw_row![1, "center court", None::<String>];
/// assert_eq!(row.len(), 3);
/// ```
#[macro_export]
macro_rules! raw_row {
    ($($value:expr),* $(,)?) => {
        $crate::row::RawRow::new(vec![$($crate::value::Value::from($value)),*])
    };
}

/// Positional cursor over a [`RawRow`].
pub struct RowReader {
    values: std::vec::IntoIter<Value>,
    position: usize,
    width: usize,
}

impl RowReader {
    /// Take the next column as `T`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Decode` when the row is exhausted or the column cannot be
    /// extracted as `T` (wrong type, or NULL for a non-optional field).
    pub fn next<T: TryGetable>(&mut self) -> Result<T, DbError> {
        let position = self.position;
        let value = self.values.next().ok_or_else(|| {
            DbError::Decode(format!(
                "row has {} columns, mapper asked for column {}",
                self.width, position
            ))
        })?;
        self.position += 1;
        T::try_get(value).map_err(|e| DbError::Decode(format!("column {position}: {e}")))
    }

    /// Take the next column as a JSON array of positional child tuples.
    ///
    /// A NULL aggregate (no child rows) yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Decode` if the column is not JSON, not an array, or a child
    /// cannot be deserialized as `T`.
    pub fn next_children<T: DeserializeOwned>(&mut self) -> Result<Vec<T>, DbError> {
        let position = self.position;
        let json: Option<serde_json::Value> = self.next()?;
        match json {
            None | Some(serde_json::Value::Null) => Ok(Vec::new()),
            Some(serde_json::Value::Array(children)) => children
                .into_iter()
                .map(|child| {
                    serde_json::from_value(child)
                        .map_err(|e| DbError::Decode(format!("column {position} child: {e}")))
                })
                .collect(),
            Some(other) => Err(DbError::Decode(format!(
                "column {position}: expected a JSON array, got {other}"
            ))),
        }
    }

    /// Take the next column as a text array; NULL yields an empty list.
    pub fn next_list(&mut self) -> Result<Vec<String>, DbError> {
        Ok(self.next::<Option<Vec<String>>>()?.unwrap_or_default())
    }

    /// Assert every column was consumed.
    pub fn finish(mut self) -> Result<(), DbError> {
        if self.values.next().is_some() {
            return Err(DbError::Decode(format!(
                "row has {} columns, mapper consumed {}",
                self.width, self.position
            )));
        }
        Ok(())
    }
}

/// Positional translation of a [`RawRow`] into a domain or view object.
pub trait FromRow: Sized {
    fn from_row(row: RawRow) -> Result<Self, DbError>;
}

/// Map every row with `T::from_row`, stopping at the first failure.
pub fn map_rows<T: FromRow>(rows: Vec<RawRow>) -> Result<Vec<T>, DbError> {
    rows.into_iter().map(T::from_row).collect()
}
