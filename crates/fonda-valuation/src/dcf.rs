//! Discounted cash flow.
//!
//! Rates are decimals (`0.08` is 8 %). The DCF functions return an enterprise
//! value; [`price_per_share`] converts it to a per-share price.
//!
//! A perpetuity only converges when the discount rate exceeds the growth rate.
//! Both models reject `wacc <= growth` with [`DcfError::NonConvergent`]
//! instead of producing a negative or infinite value.

use fonda_core::CompanySnapshot;
use thiserror::Error;

use crate::config::ValuationConfig;
use crate::multiples::{self, SHARES_KEYS};

/// Reasons a DCF cannot produce a value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DcfError {
    /// The perpetuity diverges because the discount rate does not exceed growth.
    #[error("DCF does not converge: WACC {wacc} must exceed growth {growth}")]
    NonConvergent {
        /// The discount rate.
        wacc: f64,
        /// The perpetual growth rate.
        growth: f64,
    },

    /// The two-stage model needs at least one forecast year.
    #[error("two-stage DCF needs at least one forecast growth rate")]
    EmptyForecast,

    /// Negative or zero free cash flow cannot be valued by growth.
    #[error("free cash flow {0} is not positive")]
    NonPositiveCashFlow(f64),

    /// An input is NaN or infinite.
    #[error("DCF input is not finite: {0}")]
    NonFinite(&'static str),
}

/// Estimates the weighted average cost of capital.
///
/// Cost of equity is `rf + beta * erp` (beta defaults when missing). Cost of
/// debt is the `interestRate` fact or the configured default, after tax.
/// Equity and debt are weighted by market cap and net debt (floored at zero).
/// Without a market cap, or with zero total capital, the cost of equity alone
/// is returned.
#[must_use]
pub fn estimate_wacc(snapshot: &CompanySnapshot, config: &ValuationConfig) -> f64 {
    let info = &snapshot.info;
    let beta = info.number("beta").unwrap_or(config.default_beta);
    let cost_of_equity = config.risk_free_rate + beta * config.equity_risk_premium;

    let Some(market_cap) = snapshot.market_cap() else {
        return cost_of_equity;
    };

    let cost_of_debt = info
        .number("interestRate")
        .filter(|rate| *rate != 0.0)
        .unwrap_or(config.default_cost_of_debt)
        * (1.0 - config.tax_rate);

    let debt = multiples::total_debt(snapshot).unwrap_or(0.0);
    let cash = info.first_number(&["cash", "totalCash"]).unwrap_or(0.0);
    let net_debt = (debt - cash).max(0.0);

    let total = market_cap + net_debt;
    if total == 0.0 {
        return cost_of_equity;
    }
    (market_cap / total) * cost_of_equity + (net_debt / total) * cost_of_debt
}

/// Returns the discount rate for a run: the configured override, else the estimate.
#[must_use]
pub fn discount_rate(snapshot: &CompanySnapshot, config: &ValuationConfig) -> f64 {
    config
        .wacc_override
        .unwrap_or_else(|| estimate_wacc(snapshot, config))
}

/// Perpetuity-growth enterprise value: `fcf * (1 + g) / (wacc - g)`.
pub fn one_stage(fcf: f64, growth: f64, wacc: f64) -> Result<f64, DcfError> {
    check_finite(fcf, "free cash flow")?;
    check_finite(growth, "growth")?;
    check_finite(wacc, "WACC")?;
    if wacc <= growth {
        return Err(DcfError::NonConvergent { wacc, growth });
    }
    Ok(fcf * (1.0 + growth) / (wacc - growth))
}

/// Explicit forecast years followed by a Gordon-growth terminal value.
///
/// Year `i` cash flow compounds the forecast rates up to `i` and is discounted
/// by `(1 + wacc)^i`. The terminal value at the horizon grows the last
/// forecast cash flow once more at `terminal_growth` and is discounted back
/// over the same horizon.
pub fn two_stage(
    fcf: f64,
    forecast_growth: &[f64],
    terminal_growth: f64,
    wacc: f64,
) -> Result<f64, DcfError> {
    if forecast_growth.is_empty() {
        return Err(DcfError::EmptyForecast);
    }
    check_finite(fcf, "free cash flow")?;
    check_finite(terminal_growth, "terminal growth")?;
    check_finite(wacc, "WACC")?;
    if forecast_growth.iter().any(|g| !g.is_finite()) {
        return Err(DcfError::NonFinite("forecast growth"));
    }
    if wacc <= terminal_growth {
        return Err(DcfError::NonConvergent {
            wacc,
            growth: terminal_growth,
        });
    }

    let mut cash_flow = fcf;
    let mut discount = 1.0;
    let mut present_value = 0.0;
    for growth in forecast_growth {
        cash_flow *= 1.0 + growth;
        discount *= 1.0 + wacc;
        present_value += cash_flow / discount;
    }

    let terminal_value = cash_flow * (1.0 + terminal_growth) / (wacc - terminal_growth);
    Ok(present_value + terminal_value / discount)
}

/// Converts an enterprise value to a per-share price.
///
/// Uses the share count, else approximates it as market cap over price.
/// Returns `None` when neither is available.
#[must_use]
pub fn price_per_share(enterprise_value: f64, snapshot: &CompanySnapshot) -> Option<f64> {
    let shares = snapshot.info.first_positive(SHARES_KEYS).or_else(|| {
        let market_cap = snapshot.market_cap()?;
        let price = snapshot.current_price()?;
        Some(market_cap / price)
    })?;
    if shares == 0.0 || !shares.is_finite() {
        return None;
    }
    let price = enterprise_value / shares;
    price.is_finite().then_some(price)
}

fn check_finite(value: f64, name: &'static str) -> Result<(), DcfError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DcfError::NonFinite(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fonda_core::Facts;

    #[test]
    fn test_one_stage_worked_example() {
        // 100 * 1.02 / (0.08 - 0.02)
        assert_relative_eq!(one_stage(100.0, 0.02, 0.08).unwrap(), 1700.0, epsilon = 1e-9);
    }

    #[test]
    fn test_one_stage_rejects_non_convergent() {
        assert_eq!(
            one_stage(100.0, 0.05, 0.05),
            Err(DcfError::NonConvergent {
                wacc: 0.05,
                growth: 0.05
            })
        );
        assert!(one_stage(100.0, 0.06, 0.05).is_err());
        assert!(one_stage(f64::NAN, 0.02, 0.08).is_err());
    }

    #[test]
    fn test_two_stage() {
        let value = two_stage(100.0, &[0.10], 0.02, 0.10).unwrap();
        // year 1: 110 / 1.1 = 100; terminal: 110 * 1.02 / 0.08 / 1.1 = 1275
        assert_relative_eq!(value, 1375.0, epsilon = 1e-9);
    }

    #[test]
    fn test_two_stage_rejections() {
        assert_eq!(two_stage(100.0, &[], 0.02, 0.08), Err(DcfError::EmptyForecast));
        assert!(matches!(
            two_stage(100.0, &[0.05], 0.08, 0.08),
            Err(DcfError::NonConvergent { .. })
        ));
    }

    #[test]
    fn test_two_stage_matches_one_stage_at_constant_growth() {
        let one = one_stage(100.0, 0.03, 0.09).unwrap();
        let two = two_stage(100.0, &[0.03; 5], 0.03, 0.09).unwrap();
        assert_relative_eq!(one, two, epsilon = 1e-6);
    }

    #[test]
    fn test_estimate_wacc() {
        let config = ValuationConfig::default();

        let no_cap = CompanySnapshot::new("X");
        assert_relative_eq!(estimate_wacc(&no_cap, &config), 0.085, epsilon = 1e-12);

        // Ke = 0.03 + 1.2 * 0.055 = 0.096; Kd = 0.04 * 0.75 = 0.03; weights 0.8 / 0.2
        let levered = CompanySnapshot::new("Y").with_info(
            Facts::new()
                .with("marketCap", 800.0)
                .with("totalDebt", 250.0)
                .with("totalCash", 50.0)
                .with("beta", 1.2),
        );
        assert_relative_eq!(estimate_wacc(&levered, &config), 0.0828, epsilon = 1e-12);

        let net_cash = CompanySnapshot::new("Z").with_info(
            Facts::new()
                .with("marketCap", 800.0)
                .with("totalDebt", 10.0)
                .with("totalCash", 500.0),
        );
        assert_relative_eq!(estimate_wacc(&net_cash, &config), 0.085, epsilon = 1e-12);
    }

    #[test]
    fn test_wacc_override() {
        let config = ValuationConfig::default().with_wacc_override(0.07);
        assert_eq!(discount_rate(&CompanySnapshot::new("X"), &config), 0.07);
    }

    #[test]
    fn test_price_per_share() {
        let with_shares = CompanySnapshot::new("X")
            .with_info(Facts::new().with("sharesOutstanding", 50.0));
        assert_eq!(price_per_share(1000.0, &with_shares), Some(20.0));

        let implied = CompanySnapshot::new("Y").with_info(
            Facts::new()
                .with("marketCap", 2000.0)
                .with("currentPrice", 20.0),
        );
        assert_eq!(price_per_share(1000.0, &implied), Some(10.0));

        assert_eq!(price_per_share(1000.0, &CompanySnapshot::new("Z")), None);
    }
}
