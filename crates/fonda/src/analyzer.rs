//! End-to-end analysis of a company query.

use tracing::{debug, info, warn};

use fonda_core::{CompanySnapshot, FondaError, Result, Symbol};
use fonda_valuation::{AnalysisReport, ValuationConfig};

use crate::registry::ProviderRegistry;

/// Resolves, fetches and analyzes companies.
///
/// A run resolves the query, fetches the snapshot, rejects symbols without a
/// market cap or price, fetches the peers one after another and hands
/// everything to [`fonda_valuation::analyze`]. A main fetch that fails for
/// lack of data degrades to an empty snapshot (and then fails validation);
/// a provider refusing access aborts the run with that error. Failed peers
/// are dropped.
#[derive(Debug)]
pub struct FundamentalAnalyzer {
    registry: ProviderRegistry,
    config: ValuationConfig,
}

impl FundamentalAnalyzer {
    /// Creates an analyzer with the default valuation parameters.
    #[must_use]
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            config: ValuationConfig::default(),
        }
    }

    /// Replaces the valuation parameters.
    #[must_use]
    pub fn with_config(mut self, config: ValuationConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the valuation parameters.
    #[must_use]
    pub const fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Returns the provider registry.
    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Analyzes the company named by `query` against `peer_queries`.
    ///
    /// # Errors
    ///
    /// Returns [`FondaError::NoMarketData`] when the resolved symbol has
    /// neither a market cap nor a current price, and the provider's error
    /// when it refused access (authentication or rate limit).
    pub async fn analyze(&self, query: &str, peer_queries: &[String]) -> Result<AnalysisReport> {
        let symbol = self.registry.resolve(query).await;
        let snapshot = self.fetch_or_empty(&symbol).await?;
        // Same check as `SnapshotProvider::is_valid`, on the snapshot in hand.
        if !snapshot.has_market_data() {
            return Err(FondaError::NoMarketData(symbol.to_string()));
        }

        let peers = self.fetch_peers(&symbol, peer_queries).await;
        let report = fonda_valuation::analyze(&snapshot, &peers, &self.config);

        info!(
            symbol = %report.symbol,
            sector = %report.sector,
            score = report.global_score,
            peers = peers.len(),
            "Analysis complete"
        );
        Ok(report)
    }

    async fn fetch_or_empty(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        match self.registry.fetch_snapshot(symbol).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) if e.is_access_denied() => Err(e),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Fetch failed, treating data as missing");
                Ok(CompanySnapshot::new(symbol.clone()))
            }
        }
    }

    /// Fetches peers sequentially, skipping the analyzed symbol, duplicates,
    /// failures and peers without market data.
    async fn fetch_peers(&self, symbol: &Symbol, peer_queries: &[String]) -> Vec<CompanySnapshot> {
        let mut seen = vec![symbol.clone()];
        let mut peers = Vec::with_capacity(peer_queries.len());

        for query in peer_queries {
            let peer = self.registry.resolve(query).await;
            if peer.is_empty() || seen.contains(&peer) {
                continue;
            }
            seen.push(peer.clone());

            match self.registry.fetch_snapshot(&peer).await {
                Ok(snapshot) if snapshot.has_market_data() => peers.push(snapshot),
                Ok(_) => debug!(peer = %peer, "Dropping peer without market data"),
                Err(e) => warn!(peer = %peer, error = %e, "Dropping peer"),
            }
        }
        peers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fonda_core::{DataProvider, Facts, SnapshotProvider, StaticProvider};
    use fonda_valuation::{MultipleKind, PeerComparison, SectorBucket};
    use std::sync::Arc;

    fn company(symbol: &str, price: f64, pe: f64) -> CompanySnapshot {
        CompanySnapshot::new(symbol).with_info(
            Facts::new()
                .with("sector", "Technology")
                .with("industry", "Software\u{2014}Application")
                .with("currentPrice", price)
                .with("marketCap", price * 100.0)
                .with("trailingPE", pe),
        )
    }

    fn analyzer() -> FundamentalAnalyzer {
        let provider = StaticProvider::new()
            .with_snapshot(company("SOFT", 50.0, 25.0))
            .with_snapshot(company("PEER1", 30.0, 20.0))
            .with_snapshot(company("PEER2", 40.0, 30.0))
            .with_snapshot(CompanySnapshot::new("SHELL"));
        FundamentalAnalyzer::new(ProviderRegistry::new().with_snapshot_provider(Arc::new(provider)))
    }

    fn peers(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn test_analyze_with_peers() {
        let report = analyzer()
            .analyze(" soft ", &peers(&["peer1", "PEER2"]))
            .await
            .unwrap();

        assert_eq!(report.symbol.as_str(), "SOFT");
        assert_eq!(report.sector, SectorBucket::Tech);
        assert_eq!(report.peer_medians.get(MultipleKind::Pe), Some(25.0));
        assert_eq!(
            report.peer_comparison.get(&MultipleKind::Pe),
            Some(&PeerComparison::InLine)
        );
        assert!((0.0..=100.0).contains(&report.global_score));
    }

    #[tokio::test]
    async fn test_unknown_symbol_has_no_market_data() {
        let err = analyzer().analyze("ZZZZ", &[]).await.unwrap_err();
        assert!(matches!(err, FondaError::NoMarketData(ref s) if s == "ZZZZ"));

        let err = analyzer().analyze("shell", &[]).await.unwrap_err();
        assert!(matches!(err, FondaError::NoMarketData(_)));
    }

    #[tokio::test]
    async fn test_bad_peers_are_dropped() {
        let analyzer = analyzer();
        let kept = analyzer
            .fetch_peers(
                &Symbol::new("SOFT"),
                &peers(&["PEER1", "MISSING", "SHELL", "soft", "peer1", ""]),
            )
            .await;

        let symbols: Vec<&str> = kept.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["PEER1"]);
    }

    #[derive(Debug)]
    struct Locked;

    impl DataProvider for Locked {
        fn name(&self) -> &str {
            "Locked"
        }

        fn description(&self) -> &str {
            "Refuses every request"
        }
    }

    #[async_trait]
    impl SnapshotProvider for Locked {
        async fn fetch_snapshot(&self, _symbol: &Symbol) -> Result<CompanySnapshot> {
            Err(FondaError::AuthenticationFailed("HTTP 401".to_string()))
        }
    }

    #[tokio::test]
    async fn test_refused_access_is_reported() {
        let analyzer =
            FundamentalAnalyzer::new(ProviderRegistry::new().with_snapshot_provider(Arc::new(Locked)));
        assert!(matches!(
            analyzer.analyze("AAPL", &[]).await,
            Err(FondaError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_no_providers() {
        let analyzer = FundamentalAnalyzer::new(ProviderRegistry::new());
        assert!(matches!(
            analyzer.analyze("SOFT", &[]).await,
            Err(FondaError::NoMarketData(_))
        ));
    }
}
