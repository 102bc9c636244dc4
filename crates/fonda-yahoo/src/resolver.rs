//! Company name to ticker resolution.

use std::time::Duration;

use async_trait::async_trait;
use fonda_core::{DataProvider, Symbol, TickerResolver};
use serde::Deserialize;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Yahoo Finance search (autocomplete) API URL.
const SEARCH_API_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// Search requests give up quickly; the query itself is the fallback.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Common company names, already normalized, and their Yahoo tickers.
const KNOWN_TICKERS: &[(&str, &str)] = &[
    // France
    ("lvmh", "MC.PA"),
    ("louis vuitton", "MC.PA"),
    ("air liquide", "AI.PA"),
    ("loreal", "OR.PA"),
    ("l'oreal", "OR.PA"),
    ("l oreal", "OR.PA"),
    ("hermes", "RMS.PA"),
    ("hermes international", "RMS.PA"),
    ("total", "TTE.PA"),
    ("total energies", "TTE.PA"),
    ("totalenergies", "TTE.PA"),
    ("danone", "BN.PA"),
    ("bnp", "BNP.PA"),
    ("bnp paribas", "BNP.PA"),
    ("safran", "SAF.PA"),
    ("thales", "HO.PA"),
    ("dassault systemes", "DSY.PA"),
    ("dassault aviation", "AM.PA"),
    ("dassault", "AM.PA"),
    ("airbus", "AIR.PA"),
    ("sanofi", "SAN.PA"),
    ("schneider electric", "SU.PA"),
    ("schneider", "SU.PA"),
    ("air france", "AF.PA"),
    ("renault", "RNO.PA"),
    ("societe generale", "GLE.PA"),
    ("socgen", "GLE.PA"),
    ("veolia", "VIE.PA"),
    ("michelin", "ML.PA"),
    ("axa", "CS.PA"),
    ("credit agricole", "ACA.PA"),
    ("vivendi", "VIV.PA"),
    ("kering", "KER.PA"),
    ("bouygues", "EN.PA"),
    ("edf", "EDF.PA"),
    ("electricite de france", "EDF.PA"),
    ("teleperformance", "TEP.PA"),
    ("stellantis", "STLAM.MI"),
    ("carrefour", "CA.PA"),
    ("engie", "ENGI.PA"),
    ("unibail rodamco", "URW.PA"),
    ("unibail-rodamco", "URW.PA"),
    ("unibail", "URW.PA"),
    ("westfield", "URW.PA"),
    ("pernod ricard", "RI.PA"),
    ("capgemini", "CAP.PA"),
    ("vinci", "DG.PA"),
    ("saint gobain", "SGO.PA"),
    ("essilorluxottica", "EL.PA"),
    // United States
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("amazon", "AMZN"),
    ("tesla", "TSLA"),
    ("meta", "META"),
    ("facebook", "META"),
    ("google", "GOOG"),
    ("alphabet", "GOOG"),
    ("nvidia", "NVDA"),
    ("netflix", "NFLX"),
    ("amd", "AMD"),
    ("intel", "INTC"),
    // Other
    ("eni", "ENI.MI"),
    ("eni spa", "ENI.MI"),
    ("shell", "SHEL"),
    ("royal dutch shell", "SHEL"),
    ("shell plc", "SHEL"),
];

/// Lowercases, trims and strips accents (`"L'Oréal "` becomes `"l'oreal"`).
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Resolves company names to Yahoo Finance tickers.
///
/// Resolution order: the curated name map, then the first quote returned by
/// Yahoo search, then the query itself uppercased. Search can be disabled for
/// offline use.
#[derive(Debug)]
pub struct YahooTickerResolver {
    client: reqwest::Client,
    search: bool,
}

impl YahooTickerResolver {
    /// Creates a resolver that falls back to Yahoo search.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(SEARCH_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            search: true,
        }
    }

    /// Creates a resolver that only uses the curated map.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            search: false,
            ..Self::new()
        }
    }

    /// Looks a normalized name up in the curated map.
    #[must_use]
    pub fn lookup(normalized: &str) -> Option<&'static str> {
        KNOWN_TICKERS
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, ticker)| *ticker)
    }

    /// Returns the first search hit, or `None` on any failure.
    async fn search(&self, query: &str) -> Option<String> {
        let response = self
            .client
            .get(SEARCH_API_URL)
            .query(&[("q", query)])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        let body = match response {
            Ok(response) => response.json::<SearchResponse>().await,
            Err(e) => {
                debug!(query, error = %e, "Yahoo search failed");
                return None;
            }
        };

        match body {
            Ok(body) => body
                .quotes
                .into_iter()
                .find_map(|quote| quote.symbol.filter(|s| !s.is_empty())),
            Err(e) => {
                debug!(query, error = %e, "Unreadable Yahoo search response");
                None
            }
        }
    }
}

impl Default for YahooTickerResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooTickerResolver {
    fn name(&self) -> &str {
        "Yahoo Search"
    }

    fn description(&self) -> &str {
        "Curated company names with Yahoo Finance search fallback"
    }
}

#[async_trait]
impl TickerResolver for YahooTickerResolver {
    async fn resolve(&self, query: &str) -> Symbol {
        let normalized = normalize_query(query);

        if let Some(ticker) = Self::lookup(&normalized) {
            debug!(query, ticker, "Resolved from known names");
            return Symbol::new(ticker);
        }

        if self.search && !normalized.is_empty() {
            if let Some(ticker) = self.search(&normalized).await {
                debug!(query, ticker = %ticker, "Resolved from Yahoo search");
                return Symbol::new(ticker);
            }
        }

        Symbol::new(query.trim())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
}
