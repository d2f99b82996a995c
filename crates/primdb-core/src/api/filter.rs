//! Equality clauses used to filter rows (`where`) and assign columns (`set`).
//!
//! A clause is an ordered list of `column = value` pairs. As a filter, the
//! pairs are ANDed and compared on canonical text, so `Integer(30)` matches a
//! stored `"30"` and `Boolean(true)` matches `"True"`.

use std::fmt;

use crate::types::{Record, Value};

/// An ordered set of `column = value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clause {
    pairs: Vec<(String, Value)>,
}

impl Clause {
    /// The empty clause. As a filter it matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-pair clause.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(column, value)
    }

    /// Add a pair. A repeated column replaces the earlier value.
    pub fn and(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((column, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.pairs.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(c, _)| c.as_str())
    }

    /// True if every pair equals the row's stored text. A column the row
    /// lacks never matches.
    pub fn matches(&self, record: &Record) -> bool {
        self.pairs.iter().all(|(column, value)| {
            record
                .get(column)
                .is_some_and(|stored| value.matches(stored))
        })
    }

    /// Stable text identifying this filter, used as a cache key.
    ///
    /// Pairs are sorted by column so `a=1 AND b=2` and `b=2 AND a=1` share an
    /// entry; values are compared canonically so `Integer(1)` and `Text("1")`
    /// do too, which is sound because matching is canonical as well.
    pub fn signature(&self) -> String {
        let mut parts: Vec<(&str, String)> = self
            .pairs
            .iter()
            .map(|(c, v)| (c.as_str(), v.canonical().into_owned()))
            .collect();
        parts.sort();
        serde_json::to_string(&parts).unwrap_or_default()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{column} = {value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Clause {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Clause::new(), |clause, (k, v)| clause.and(k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        [("ID", "4"), ("name", "Al"), ("age", "30"), ("admin", "True")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_empty_matches_everything() {
        assert!(Clause::new().matches(&record()));
        assert!(Clause::new().matches(&Record::new()));
    }

    #[test]
    fn test_typed_values_match_canonical_text() {
        assert!(Clause::eq("age", 30).matches(&record()));
        assert!(Clause::eq("age", "30").matches(&record()));
        assert!(Clause::eq("admin", true).matches(&record()));
        assert!(Clause::eq("ID", 4).matches(&record()));
        assert!(!Clause::eq("admin", "true").matches(&record()));
        assert!(!Clause::eq("age", 31).matches(&record()));
    }

    #[test]
    fn test_pairs_are_anded() {
        let both = Clause::eq("name", "Al").and("age", 30);
        assert!(both.matches(&record()));
        let mismatch = Clause::eq("name", "Al").and("age", 29);
        assert!(!mismatch.matches(&record()));
    }

    #[test]
    fn test_missing_column_never_matches() {
        assert!(!Clause::eq("email", "x").matches(&record()));
    }

    #[test]
    fn test_repeated_column_replaces() {
        let clause = Clause::eq("age", 1).and("age", 2);
        assert_eq!(clause.len(), 1);
        assert_eq!(clause.to_string(), "age = 2");
    }

    #[test]
    fn test_signature_is_order_and_type_insensitive() {
        let a = Clause::eq("a", 1).and("b", "x");
        let b = Clause::eq("b", "x").and("a", "1");
        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), Clause::eq("a", 2).signature());
        assert_ne!(Clause::new().signature(), a.signature());
    }

    #[test]
    fn test_display() {
        let clause = Clause::eq("name", "Al").and("admin", false);
        assert_eq!(clause.to_string(), "name = Al AND admin = False");
    }
}
