//! Error types for data operations.
//!
//! This module defines [`FondaError`] which covers the failures that can occur
//! when resolving tickers, fetching snapshots, parsing provider payloads, or
//! loading configuration. Missing individual fields are never errors; they
//! surface as `None` in the analysis results instead.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum FondaError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The provider refused the request (missing or expired session).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol resolved but has neither a market cap nor a current price.
    #[error("No market data available for {0}")]
    NoMarketData(String),

    /// Error parsing data from a provider or a snapshot file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FondaError {
    /// Returns true when the provider refused access, as opposed to having
    /// no data for the request.
    #[must_use]
    pub const fn is_access_denied(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::RateLimited { .. })
    }
}

/// Result type alias using [`FondaError`].
pub type Result<T> = std::result::Result<T, FondaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied() {
        assert!(FondaError::AuthenticationFailed("HTTP 401".to_string()).is_access_denied());
        assert!(
            FondaError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: None,
            }
            .is_access_denied()
        );
        assert!(!FondaError::Network("timeout".to_string()).is_access_denied());
        assert!(!FondaError::SymbolNotFound("ZZZZ".to_string()).is_access_denied());
    }
}
