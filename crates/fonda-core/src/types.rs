//! Core data types for company data.
//!
//! This module defines:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`FactValue`] - A single named scalar fact (number or text)
//! - [`Facts`] - The loosely typed metadata mapping a provider returns for a company

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are trimmed and uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the symbol is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single scalar fact about a company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// A numeric fact (price, ratio, count).
    Number(f64),
    /// A textual fact (sector, industry, name).
    Text(String),
}

impl FactValue {
    /// Returns the value as a finite number.
    ///
    /// Text that parses as a number is accepted; non-finite values are not.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Returns the value as non-empty text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }
}

impl From<f64> for FactValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for FactValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FactValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Named scalar facts about a company.
///
/// Keys follow the provider's field names (`currentPrice`, `marketCap`,
/// `trailingPE`, `sector`, ...). No key is guaranteed to be present, and
/// lookups that fail simply return `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facts(BTreeMap<String, FactValue>);

impl Facts {
    /// Creates an empty fact set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts or replaces a fact.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FactValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Adds a fact, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FactValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FactValue> {
        self.0.get(key)
    }

    /// Returns true if a fact is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the finite number stored under `key`.
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FactValue::as_f64)
    }

    /// Returns the first finite number found under any of `keys`, in order.
    #[must_use]
    pub fn first_number(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.number(key))
    }

    /// Returns the first strictly positive number found under any of `keys`.
    #[must_use]
    pub fn first_positive(&self, keys: &[&str]) -> Option<f64> {
        keys.iter()
            .filter_map(|key| self.number(key))
            .find(|value| *value > 0.0)
    }

    /// Returns the non-empty text stored under `key`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FactValue::as_text)
    }

    /// Returns the first non-empty text found under any of `keys`, in order.
    #[must_use]
    pub fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.text(key))
    }

    /// Returns the number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no facts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the facts in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FactValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<FactValue>> FromIterator<(K, V)> for Facts {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(Symbol::new(" mc.pa ").as_str(), "MC.PA");
        assert_eq!(Symbol::from("aapl").to_string(), "AAPL");
        assert!(Symbol::new("  ").is_empty());
    }

    #[test]
    fn test_first_number_skips_missing_and_text() {
        let facts = Facts::new()
            .with("sector", "Technology")
            .with("forwardPE", 21.5);

        assert_eq!(facts.first_number(&["trailingPE", "forwardPE"]), Some(21.5));
        assert_eq!(facts.number("sector"), None);
        assert_eq!(facts.text("sector"), Some("Technology"));
    }

    #[test]
    fn test_non_finite_numbers_are_missing() {
        let facts = Facts::new().with("beta", f64::NAN).with("marketCap", "1e9");
        assert_eq!(facts.number("beta"), None);
        assert_eq!(facts.number("marketCap"), Some(1e9));
    }

    #[test]
    fn test_first_positive() {
        let facts = Facts::new()
            .with("sharesOutstanding", 0.0)
            .with("impliedSharesOutstanding", 150.0);
        assert_eq!(
            facts.first_positive(&["sharesOutstanding", "impliedSharesOutstanding"]),
            Some(150.0)
        );
    }

    #[test]
    fn test_facts_from_json() {
        let facts: Facts =
            serde_json::from_str(r#"{"currentPrice": 101.5, "sector": "Banks"}"#).unwrap();
        assert_eq!(facts.number("currentPrice"), Some(101.5));
        assert_eq!(facts.text("sector"), Some("Banks"));
    }
}
