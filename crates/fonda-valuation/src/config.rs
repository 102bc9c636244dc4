//! Valuation parameters.
//!
//! Every constant the engine uses (discount-rate inputs, DCF growth path,
//! blend weights, sanity bounds, margin of safety) lives in [`ValuationConfig`].
//! Defaults reproduce the standard rule set; a JSON file may override any
//! subset of fields.

use fonda_core::{FondaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters for one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValuationConfig {
    /// Risk-free rate used in the cost of equity.
    pub risk_free_rate: f64,
    /// Equity risk premium used in the cost of equity.
    pub equity_risk_premium: f64,
    /// Beta assumed when the snapshot has none.
    pub default_beta: f64,
    /// Pre-tax cost of debt assumed when the snapshot has no interest rate.
    pub default_cost_of_debt: f64,
    /// Tax rate applied to the cost of debt and to operating income (NOPAT).
    pub tax_rate: f64,
    /// Discount rate to use instead of the WACC estimate.
    pub wacc_override: Option<f64>,
    /// Explicit annual FCF growth rates for the two-stage DCF.
    ///
    /// An empty list selects the one-stage perpetuity model.
    pub forecast_growth: Vec<f64>,
    /// Perpetual growth rate after the forecast horizon.
    pub terminal_growth: f64,
    /// Number of most recent period-over-period changes averaged by growth indicators.
    pub growth_periods: usize,
    /// Weight of the multiples-derived price in the blend.
    pub multiples_weight: f64,
    /// Weight of the DCF-derived price in the blend.
    pub dcf_weight: f64,
    /// Blended fair value is capped at this multiple of the current price.
    pub upper_bound: f64,
    /// Blended fair value is floored at this multiple of the current price.
    pub lower_bound: f64,
    /// Discount applied to the fair value to obtain the entry price.
    pub margin_of_safety: f64,
    /// Relative deviation from the peer median that counts as above or below peers.
    pub peer_band: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.03,
            equity_risk_premium: 0.055,
            default_beta: 1.0,
            default_cost_of_debt: 0.04,
            tax_rate: 0.25,
            wacc_override: None,
            forecast_growth: vec![0.06; 5],
            terminal_growth: 0.02,
            growth_periods: 5,
            multiples_weight: 0.6,
            dcf_weight: 0.4,
            upper_bound: 2.0,
            lower_bound: 0.3,
            margin_of_safety: 0.2,
            peer_band: 0.2,
        }
    }
}

impl ValuationConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FondaError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| FondaError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the parameters are usable.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.risk_free_rate,
            self.equity_risk_premium,
            self.default_beta,
            self.default_cost_of_debt,
            self.tax_rate,
            self.terminal_growth,
            self.multiples_weight,
            self.dcf_weight,
            self.upper_bound,
            self.lower_bound,
            self.margin_of_safety,
            self.peer_band,
        ];
        if finite.iter().any(|v| !v.is_finite())
            || self.forecast_growth.iter().any(|g| !g.is_finite())
            || self.wacc_override.is_some_and(|w| !w.is_finite())
        {
            return Err(FondaError::Config("parameters must be finite".to_string()));
        }
        if self.multiples_weight < 0.0 || self.dcf_weight < 0.0 {
            return Err(FondaError::Config("blend weights must be non-negative".to_string()));
        }
        if self.lower_bound > self.upper_bound {
            return Err(FondaError::Config(format!(
                "lower bound {} exceeds upper bound {}",
                self.lower_bound, self.upper_bound
            )));
        }
        if !(0.0..1.0).contains(&self.margin_of_safety) {
            return Err(FondaError::Config(format!(
                "margin of safety must be in [0, 1), got {}",
                self.margin_of_safety
            )));
        }
        if self.growth_periods == 0 {
            return Err(FondaError::Config("growth periods must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Sets the risk-free rate.
    #[must_use]
    pub fn with_risk_free_rate(mut self, rate: f64) -> Self {
        self.risk_free_rate = rate;
        self
    }

    /// Sets the equity risk premium.
    #[must_use]
    pub fn with_equity_risk_premium(mut self, premium: f64) -> Self {
        self.equity_risk_premium = premium;
        self
    }

    /// Uses a fixed discount rate instead of the WACC estimate.
    #[must_use]
    pub fn with_wacc_override(mut self, wacc: f64) -> Self {
        self.wacc_override = Some(wacc);
        self
    }

    /// Sets the explicit forecast growth path.
    #[must_use]
    pub fn with_forecast_growth(mut self, growth: Vec<f64>) -> Self {
        self.forecast_growth = growth;
        self
    }

    /// Sets the terminal growth rate.
    #[must_use]
    pub fn with_terminal_growth(mut self, growth: f64) -> Self {
        self.terminal_growth = growth;
        self
    }

    /// Sets the blend weights of the multiples and DCF prices.
    #[must_use]
    pub fn with_blend_weights(mut self, multiples: f64, dcf: f64) -> Self {
        self.multiples_weight = multiples;
        self.dcf_weight = dcf;
        self
    }

    /// Sets the sanity bounds, as multiples of the current price.
    #[must_use]
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Sets the margin of safety.
    #[must_use]
    pub fn with_margin_of_safety(mut self, margin: f64) -> Self {
        self.margin_of_safety = margin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ValuationConfig::default();
        assert_eq!(config.forecast_growth, vec![0.06; 5]);
        assert_eq!(config.terminal_growth, 0.02);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ValuationConfig::from_json_str(r#"{"riskFreeRate": 0.04, "forecastGrowth": []}"#)
                .unwrap();
        assert_eq!(config.risk_free_rate, 0.04);
        assert!(config.forecast_growth.is_empty());
        assert_eq!(config.margin_of_safety, 0.2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(ValuationConfig::from_json_str(r#"{"marginOfSafety": 1.5}"#).is_err());
        assert!(ValuationConfig::from_json_str(r#"{"lowerBound": 3.0}"#).is_err());
        assert!(ValuationConfig::from_json_str("not json").is_err());
    }
}
