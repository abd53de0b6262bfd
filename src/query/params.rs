//! Named parameter sets.

use crate::value::Value;
use std::collections::HashMap;

/// Mapping from parameter name to bound value.
///
/// Built once per statement by the criteria composer and the calling query, then
/// handed to the executor read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<String, Value>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Merge `other` into `self`; keys of `other` win.
    pub fn extend(&mut self, other: ParameterSet) {
        self.values.extend(other.values);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_later_keys_win() {
        let mut base = ParameterSet::new().with("limit", 10).with("offset", 0);
        base.extend(ParameterSet::new().with("limit", 20));
        assert_eq!(base.get("limit"), Some(&Value::Int(20)));
        assert_eq!(base.get("offset"), Some(&Value::Int(0)));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_from_iter() {
        let set: ParameterSet = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert!(set.contains("a"));
        assert!(set.contains("b"));
    }
}
