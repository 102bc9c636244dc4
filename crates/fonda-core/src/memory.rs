//! In-memory snapshot provider.
//!
//! [`StaticProvider`] serves pre-loaded snapshots. It backs offline runs from
//! snapshot files and is the provider used throughout the test suites.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{
    error::{FondaError, Result},
    provider::{DataProvider, SnapshotProvider},
    snapshot::CompanySnapshot,
    types::Symbol,
};

/// A provider that returns snapshots registered up front.
#[derive(Clone, Debug, Default)]
pub struct StaticProvider {
    snapshots: HashMap<Symbol, CompanySnapshot>,
}

impl StaticProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a snapshot, replacing any previous one for the same symbol.
    pub fn insert(&mut self, snapshot: CompanySnapshot) {
        self.snapshots.insert(snapshot.symbol.clone(), snapshot);
    }

    /// Registers a snapshot, builder style.
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: CompanySnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    /// Returns the number of registered snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if no snapshots are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl FromIterator<CompanySnapshot> for StaticProvider {
    fn from_iter<I: IntoIterator<Item = CompanySnapshot>>(iter: I) -> Self {
        let mut provider = Self::new();
        for snapshot in iter {
            provider.insert(snapshot);
        }
        provider
    }
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "Static"
    }

    fn description(&self) -> &str {
        "Pre-loaded company snapshots held in memory"
    }
}

#[async_trait]
impl SnapshotProvider for StaticProvider {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        self.snapshots
            .get(symbol)
            .cloned()
            .ok_or_else(|| FondaError::SymbolNotFound(symbol.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Facts;

    fn provider() -> StaticProvider {
        StaticProvider::new()
            .with_snapshot(
                CompanySnapshot::new("AAA").with_info(Facts::new().with("currentPrice", 10.0)),
            )
            .with_snapshot(CompanySnapshot::new("EMPTY"))
    }

    #[tokio::test]
    async fn test_fetch_registered_snapshot() {
        let snapshot = provider().fetch_snapshot(&Symbol::new("aaa")).await.unwrap();
        assert_eq!(snapshot.current_price(), Some(10.0));
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let err = provider()
            .fetch_snapshot(&Symbol::new("ZZZ"))
            .await
            .unwrap_err();
        assert!(matches!(err, FondaError::SymbolNotFound(s) if s == "ZZZ"));
    }

    #[tokio::test]
    async fn test_is_valid() {
        let provider = provider();
        assert!(provider.is_valid(&Symbol::new("AAA")).await.unwrap());
        assert!(!provider.is_valid(&Symbol::new("EMPTY")).await.unwrap());
        assert!(!provider.is_valid(&Symbol::new("ZZZ")).await.unwrap());
    }
}
