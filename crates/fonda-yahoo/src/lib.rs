#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fondawork/fonda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance [`SnapshotProvider`] and a
//! [`TickerResolver`](fonda_core::TickerResolver) for the traits in
//! `fonda-core`.
//!
//! # Features
//!
//! - One quote summary request per snapshot (facts and statement histories)
//! - Annual or quarterly statements
//! - Built-in rate limiting (1 request per second by default)
//! - Name to ticker resolution with a curated map and Yahoo search

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fonda_core::{
    CompanySnapshot, DataProvider, FondaError, PeriodType, Result, SnapshotProvider, Symbol,
};
use reqwest::StatusCode;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

mod resolver;
mod summary;

pub use resolver::{YahooTickerResolver, normalize_query};

use summary::QuoteSummaryResponse;

/// Yahoo Finance quote summary API base URL.
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// Sets the session cookie the crumb is bound to.
const COOKIE_URL: &str = "https://fc.yahoo.com";

/// Returns the crumb for the current cookie session.
const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance snapshot provider.
///
/// Implements [`DataProvider`] and [`SnapshotProvider`]. The quote summary
/// API needs a cookie session and its crumb; both are obtained on first use
/// and the crumb is refreshed once when a request is rejected with 401.
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
    period: PeriodType,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second and annual
    /// statements.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied. The client needs a cookie store for the crumb
    /// handshake to succeed.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
            period: PeriodType::Annual,
            crumb: Mutex::new(None),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to configure HTTP client, using defaults");
                reqwest::Client::new()
            });

        Self {
            rate_limit_ms: rate_limit.as_millis() as u64,
            ..Self::with_client(client)
        }
    }

    /// Selects annual or quarterly statements.
    #[must_use]
    pub fn with_period(mut self, period: PeriodType) -> Self {
        self.period = period;
        self
    }

    /// Returns the statement period this provider fetches.
    #[must_use]
    pub const fn period(&self) -> PeriodType {
        self.period
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now_millis().saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(now_millis(), Ordering::Relaxed);
    }

    /// Build the quote summary URL for a symbol.
    fn build_summary_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}/{}?modules={}",
            QUOTE_SUMMARY_URL,
            symbol.as_str(),
            summary::modules_param(self.period)
        )
    }

    /// Returns the session crumb, opening a cookie session on first use.
    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the cookie matters; the page itself is usually an error.
        if let Err(e) = self.client.get(COOKIE_URL).send().await {
            debug!(error = %e, "Cookie request failed");
        }

        let response = self
            .client
            .get(CRUMB_URL)
            .send()
            .await
            .map_err(|e| FondaError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(rate_limited());
        }
        if !status.is_success() {
            return Err(FondaError::AuthenticationFailed(format!(
                "HTTP {status} while fetching the Yahoo crumb"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FondaError::Network(e.to_string()))?;
        let crumb = parse_crumb(&body).ok_or_else(|| {
            FondaError::AuthenticationFailed("Yahoo returned no usable crumb".to_string())
        })?;

        debug!("Opened Yahoo session");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    /// Fetch quote summary data for a symbol.
    async fn fetch_quote_summary(&self, symbol: &Symbol) -> Result<QuoteSummaryResponse> {
        let url = self.build_summary_url(symbol);
        let mut refreshed = false;

        loop {
            let crumb = self.crumb().await?;
            self.apply_rate_limit().await;
            debug!("Fetching quote summary: {}", url);

            let response = self
                .client
                .get(&url)
                .query(&[("crumb", crumb.as_str())])
                .send()
                .await
                .map_err(|e| FondaError::Network(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !refreshed {
                debug!(symbol = %symbol, "Crumb rejected, refreshing session");
                self.crumb.lock().await.take();
                refreshed = true;
                continue;
            }
            check_status(status, symbol)?;

            return response
                .json::<QuoteSummaryResponse>()
                .await
                .map_err(|e| FondaError::Parse(e.to_string()));
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance quote summary: company facts and financial statements"
    }
}

#[async_trait]
impl SnapshotProvider for YahooProvider {
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<CompanySnapshot> {
        let response = self.fetch_quote_summary(symbol).await?;
        let snapshot = summary::parse_snapshot(symbol, response, self.period)?;

        debug!(
            symbol = %symbol,
            facts = snapshot.info.len(),
            periods = snapshot.income.periods().len(),
            "Fetched Yahoo snapshot"
        );
        Ok(snapshot)
    }
}

/// Maps a quote summary status to an error.
fn check_status(status: StatusCode, symbol: &Symbol) -> Result<()> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(rate_limited()),
        StatusCode::NOT_FOUND => Err(FondaError::SymbolNotFound(symbol.to_string())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FondaError::AuthenticationFailed(
            format!("HTTP {status} for {symbol}"),
        )),
        status if !status.is_success() => Err(FondaError::Network(format!(
            "HTTP {status} for {symbol}"
        ))),
        _ => Ok(()),
    }
}

fn rate_limited() -> FondaError {
    FondaError::RateLimited {
        provider: "Yahoo Finance".to_string(),
        retry_after: Some(Duration::from_secs(60)),
    }
}

/// A crumb is a short token; anything else is an error page.
fn parse_crumb(body: &str) -> Option<String> {
    let crumb = body.trim();
    let plausible = !crumb.is_empty()
        && crumb.len() <= 64
        && !crumb.chars().any(|c| c.is_whitespace() || c == '<' || c == '{');
    plausible.then(|| crumb.to_string())
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_summary_url() {
        let provider = YahooProvider::new();
        let url = provider.build_summary_url(&Symbol::new("mc.pa"));

        assert!(url.contains("/quoteSummary/MC.PA?modules="));
        assert!(url.contains("financialData"));
        assert!(url.contains("incomeStatementHistory,"));
    }

    #[test]
    fn test_quarterly_url() {
        let provider = YahooProvider::new().with_period(PeriodType::Quarterly);
        assert_eq!(provider.period(), PeriodType::Quarterly);
        assert!(
            provider
                .build_summary_url(&Symbol::new("AAPL"))
                .contains("balanceSheetHistoryQuarterly")
        );
    }

    #[test]
    fn test_status_mapping() {
        let symbol = Symbol::new("AAPL");

        assert!(check_status(StatusCode::OK, &symbol).is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, &symbol),
            Err(FondaError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, &symbol),
            Err(FondaError::AuthenticationFailed(_))
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, &symbol),
            Err(FondaError::SymbolNotFound(ref s)) if s == "AAPL"
        ));
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, &symbol),
            Err(FondaError::RateLimited { .. })
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, &symbol),
            Err(FondaError::Network(_))
        ));
    }

    #[test]
    fn test_parse_crumb() {
        assert_eq!(parse_crumb("aB3.x/Yz9Q\n").as_deref(), Some("aB3.x/Yz9Q"));
        assert_eq!(parse_crumb("  "), None);
        assert_eq!(parse_crumb("<html><body>Too Many Requests</body></html>"), None);
        assert_eq!(
            parse_crumb(r#"{"finance":{"error":{"code":"Unauthorized"}}}"#),
            None
        );
    }

    #[tokio::test]
    async fn test_crumb_is_reused() {
        let provider = YahooProvider::new();
        *provider.crumb.lock().await = Some("cached".to_string());
        assert_eq!(provider.crumb().await.unwrap(), "cached");
    }

    #[test]
    fn test_provider_info() {
        let provider = YahooProvider::default();

        assert_eq!(provider.name(), "Yahoo Finance");
        assert_eq!(provider.period(), PeriodType::Annual);
        assert!(!provider.description().is_empty());
    }
}
