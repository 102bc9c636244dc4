//! Provider traits for fetching company data.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`SnapshotProvider`] - Company facts and financial statements
//! - [`TickerResolver`] - Free-text company name to ticker symbol

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::{FondaError, Result},
    snapshot::CompanySnapshot,
    types::Symbol,
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider for company snapshots.
///
/// A snapshot bundles the scalar facts and the three financial statements of a
/// company. Individual fields that the source does not report are simply left
/// out of the snapshot; only transport or lookup failures are errors.
#[async_trait]
pub trait SnapshotProvider: DataProvider {
    /// Fetches the snapshot for a symbol.
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot>;

    /// Returns true if the symbol has a market cap or a current price.
    ///
    /// Unknown symbols are reported as invalid rather than as errors. This
    /// costs a full fetch; callers that go on to use the snapshot should fetch
    /// once and check [`CompanySnapshot::has_market_data`] instead.
    async fn is_valid(&self, symbol: &Symbol) -> Result<bool> {
        match self.fetch_snapshot(symbol).await {
            Ok(snapshot) => Ok(snapshot.has_market_data()),
            Err(FondaError::SymbolNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Resolves a user query (ticker or company name) to a ticker symbol.
///
/// Resolution never fails: a resolver that finds nothing returns the query
/// itself, uppercased, so the caller can still attempt a fetch.
#[async_trait]
pub trait TickerResolver: DataProvider {
    /// Resolves a query to a symbol.
    async fn resolve(&self, query: &str) -> Symbol;
}
