//! Provider registry for managing multiple providers with fallback behavior.

use std::sync::Arc;

use tracing::{debug, warn};

use fonda_core::{CompanySnapshot, FondaError, Result, SnapshotProvider, Symbol, TickerResolver};

/// Registry of snapshot providers and ticker resolvers.
///
/// Snapshot providers are tried in registration order until one succeeds.
/// Resolvers are consulted in order; the first one that maps the query to
/// something other than the query itself wins. Without resolvers, queries are
/// taken as tickers.
///
/// # Example
///
/// ```rust,ignore
/// use fonda::{PeriodType, ProviderRegistry, Symbol};
///
/// let registry = ProviderRegistry::new().with_yahoo(PeriodType::Annual);
///
/// let symbol = registry.resolve("air liquide").await;
/// let snapshot = registry.fetch_snapshot(&symbol).await?;
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    snapshot_providers: Vec<Arc<dyn SnapshotProvider>>,
    resolvers: Vec<Arc<dyn TickerResolver>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("snapshot_providers", &self.snapshot_provider_names())
            .field(
                "resolvers",
                &self.resolvers.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ProviderRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a snapshot provider.
    pub fn register_snapshot(&mut self, provider: Arc<dyn SnapshotProvider>) {
        debug!(provider = provider.name(), "Registering snapshot provider");
        self.snapshot_providers.push(provider);
    }

    /// Register a ticker resolver.
    pub fn register_resolver(&mut self, resolver: Arc<dyn TickerResolver>) {
        debug!(resolver = resolver.name(), "Registering ticker resolver");
        self.resolvers.push(resolver);
    }

    /// Add a snapshot provider, builder style.
    #[must_use]
    pub fn with_snapshot_provider(mut self, provider: Arc<dyn SnapshotProvider>) -> Self {
        self.register_snapshot(provider);
        self
    }

    /// Add a ticker resolver, builder style.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn TickerResolver>) -> Self {
        self.register_resolver(resolver);
        self
    }

    /// Add the Yahoo Finance provider and resolver.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(self, period: fonda_core::PeriodType) -> Self {
        let provider = Arc::new(fonda_yahoo::YahooProvider::new().with_period(period));
        self.with_snapshot_provider(provider)
            .with_resolver(Arc::new(fonda_yahoo::YahooTickerResolver::new()))
    }

    /// Names of the registered snapshot providers, in fallback order.
    #[must_use]
    pub fn snapshot_provider_names(&self) -> Vec<&str> {
        self.snapshot_providers.iter().map(|p| p.name()).collect()
    }

    /// Returns true if no snapshot provider is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot_providers.is_empty()
    }

    /// Resolve a query to a symbol. Never fails.
    pub async fn resolve(&self, query: &str) -> Symbol {
        let echo = Symbol::new(query.trim());
        for resolver in &self.resolvers {
            let symbol = resolver.resolve(query).await;
            if symbol != echo && !symbol.is_empty() {
                debug!(resolver = resolver.name(), query, symbol = %symbol, "Resolved query");
                return symbol;
            }
        }
        echo
    }

    /// Fetch a snapshot, trying providers in order until one succeeds.
    pub async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        if self.snapshot_providers.is_empty() {
            return Err(FondaError::ProviderNotConfigured(
                "No snapshot providers registered".to_string(),
            ));
        }

        let mut last_error = None;
        for provider in &self.snapshot_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching snapshot"
            );

            match provider.fetch_snapshot(symbol).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FondaError::Other("All providers failed with no error".to_string())))
    }
}
