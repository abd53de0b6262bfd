//! Criteria composer.
//!
//! Turns optional filters into WHERE-clause fragments plus the parameters they
//! reference. A filter contributes only when its value is present; absent filters leave
//! no fragment and no parameter behind.

use crate::query::params::ParameterSet;
use crate::value::Value;

/// Ordered list of optional filters, each a `(name, value, fragment)` triple.
///
/// The fragment is a boolean SQL predicate that references its own value as
/// `%(name)s`. Fragment syntax is not checked here.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    entries: Vec<(String, Option<Value>, String)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter. `None` and `Some(Value::Null)` are both treated as absent.
    #[must_use]
    pub fn add<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        value: Option<V>,
        fragment: impl Into<String>,
    ) -> Self {
        let value = value.map(Into::into).filter(|v| !v.is_null());
        self.entries.push((name.into(), value, fragment.into()));
        self
    }

    /// Compose the present filters, in insertion order.
    pub fn compose(self) -> (Vec<String>, ParameterSet) {
        let mut fragments = Vec::new();
        let mut params = ParameterSet::new();
        for (name, value, fragment) in self.entries {
            if let Some(value) = value {
                fragments.push(fragment);
                params.insert(name, value);
            }
        }
        (fragments, params)
    }
}

/// `WHERE a AND b ...`, or an empty string when there are no fragments.
pub fn where_clause(fragments: &[String]) -> String {
    if fragments.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", fragments.join(" AND "))
    }
}

/// Append `extra` to an existing clause with AND, starting a WHERE clause if needed.
pub fn and_where(clause: &str, extra: &str) -> String {
    match (clause.is_empty(), extra.is_empty()) {
        (_, true) => clause.to_string(),
        (true, false) => format!("WHERE {extra}"),
        (false, false) => format!("{clause} AND {extra}"),
    }
}
