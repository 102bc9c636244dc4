//! Fundamental indicators.
//!
//! Each calculator is a total function of a [`CompanySnapshot`]: it returns a
//! value or `None`, never an error. Percent-valued indicators are expressed in
//! percent (`12.5` means 12.5 %), whether they come from statements or from
//! decimal provider facts.

use fonda_core::CompanySnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ValuationConfig;
use crate::normalize::{self, LineItem};

/// The indicators the engine knows how to compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Mean period-over-period revenue growth.
    RevenueGrowth,
    /// Mean period-over-period net income growth.
    NetIncomeGrowth,
    /// Operating margin.
    OperatingMargin,
    /// Net profit margin.
    NetMargin,
    /// Gross margin.
    GrossMargin,
    /// Return on equity.
    Roe,
    /// Return on assets.
    Roa,
    /// Return on invested capital.
    Roic,
    /// Free cash flow yield on market cap.
    Fcf,
    /// Debt to equity, in the provider's percent convention.
    DebtToEquity,
    /// Common equity tier 1 capital ratio (banks).
    Cet1Ratio,
}

impl IndicatorKind {
    /// All indicators, in report order.
    pub const ALL: [Self; 11] = [
        Self::RevenueGrowth,
        Self::NetIncomeGrowth,
        Self::OperatingMargin,
        Self::NetMargin,
        Self::GrossMargin,
        Self::Roe,
        Self::Roa,
        Self::Roic,
        Self::Fcf,
        Self::DebtToEquity,
        Self::Cet1Ratio,
    ];

    /// Returns the snake-case key used in reports.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::RevenueGrowth => "revenue_growth",
            Self::NetIncomeGrowth => "net_income_growth",
            Self::OperatingMargin => "operating_margin",
            Self::NetMargin => "net_margin",
            Self::GrossMargin => "gross_margin",
            Self::Roe => "roe",
            Self::Roa => "roa",
            Self::Roic => "roic",
            Self::Fcf => "fcf",
            Self::DebtToEquity => "debt_to_equity",
            Self::Cet1Ratio => "cet1_ratio",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RevenueGrowth => "Revenue Growth",
            Self::NetIncomeGrowth => "Net Income Growth",
            Self::OperatingMargin => "Operating Margin",
            Self::NetMargin => "Net Margin",
            Self::GrossMargin => "Gross Margin",
            Self::Roe => "ROE",
            Self::Roa => "ROA",
            Self::Roic => "ROIC",
            Self::Fcf => "FCF Yield",
            Self::DebtToEquity => "Debt/Equity",
            Self::Cet1Ratio => "CET1 Ratio",
        }
    }

    /// Returns true if smaller values are healthier.
    #[must_use]
    pub const fn lower_is_better(self) -> bool {
        matches!(self, Self::DebtToEquity)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The computed indicator set of one company.
///
/// After [`compute`](Self::compute) every kind is present; unavailable
/// indicators hold `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Indicators(BTreeMap<IndicatorKind, Option<f64>>);

impl Indicators {
    /// Computes every indicator for a snapshot.
    #[must_use]
    pub fn compute(snapshot: &CompanySnapshot, config: &ValuationConfig) -> Self {
        let values = IndicatorKind::ALL
            .iter()
            .map(|kind| {
                let value = match kind {
                    IndicatorKind::RevenueGrowth => {
                        revenue_growth(snapshot, config.growth_periods)
                    }
                    IndicatorKind::NetIncomeGrowth => {
                        net_income_growth(snapshot, config.growth_periods)
                    }
                    IndicatorKind::OperatingMargin => operating_margin(snapshot),
                    IndicatorKind::NetMargin => net_margin(snapshot),
                    IndicatorKind::GrossMargin => gross_margin(snapshot),
                    IndicatorKind::Roe => roe(snapshot),
                    IndicatorKind::Roa => roa(snapshot),
                    IndicatorKind::Roic => roic(snapshot, config.tax_rate),
                    IndicatorKind::Fcf => fcf_yield(snapshot),
                    IndicatorKind::DebtToEquity => debt_to_equity(snapshot),
                    IndicatorKind::Cet1Ratio => cet1_ratio(snapshot),
                };
                (*kind, value)
            })
            .collect();
        Self(values)
    }

    /// Returns the value of an indicator, if available.
    #[must_use]
    pub fn get(&self, kind: IndicatorKind) -> Option<f64> {
        self.0.get(&kind).copied().flatten()
    }

    /// Sets an indicator value.
    pub fn set(&mut self, kind: IndicatorKind, value: Option<f64>) {
        self.0.insert(kind, value.filter(|v| v.is_finite()));
    }

    /// Keeps only the given kinds.
    #[must_use]
    pub fn restrict(mut self, kinds: &[IndicatorKind]) -> Self {
        self.0.retain(|kind, _| kinds.contains(kind));
        self
    }

    /// Returns the number of available indicators.
    #[must_use]
    pub fn available(&self) -> usize {
        self.0.values().filter(|v| v.is_some()).count()
    }

    /// Iterates over all indicators in report order.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorKind, Option<f64>)> + '_ {
        self.0.iter().map(|(kind, value)| (*kind, *value))
    }
}

impl FromIterator<(IndicatorKind, Option<f64>)> for Indicators {
    fn from_iter<I: IntoIterator<Item = (IndicatorKind, Option<f64>)>>(iter: I) -> Self {
        let mut indicators = Self::default();
        for (kind, value) in iter {
            indicators.set(kind, value);
        }
        indicators
    }
}

/// Mean percentage change over the most recent `periods` changes, in percent.
///
/// Zero-valued periods are dropped first. Fewer than two usable periods
/// yield `None`.
#[must_use]
pub fn mean_growth(values: &[f64], periods: usize) -> Option<f64> {
    let values = normalize::drop_zeros(values);
    if values.len() < 2 {
        return None;
    }
    let changes: Vec<f64> = values
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    let recent = &changes[changes.len().saturating_sub(periods.max(1))..];
    let mean = recent.iter().sum::<f64>() / recent.len() as f64;
    finite(mean * 100.0)
}

/// Revenue growth in percent.
#[must_use]
pub fn revenue_growth(snapshot: &CompanySnapshot, periods: usize) -> Option<f64> {
    mean_growth(&normalize::series(snapshot, LineItem::Revenue), periods)
}

/// Net income growth in percent.
#[must_use]
pub fn net_income_growth(snapshot: &CompanySnapshot, periods: usize) -> Option<f64> {
    mean_growth(&normalize::series(snapshot, LineItem::NetIncome), periods)
}

fn percent_fact(snapshot: &CompanySnapshot, keys: &[&str]) -> Option<f64> {
    snapshot.info.first_number(keys).and_then(|v| finite(v * 100.0))
}

/// Operating margin in percent.
#[must_use]
pub fn operating_margin(snapshot: &CompanySnapshot) -> Option<f64> {
    percent_fact(snapshot, &["operatingMargins", "operatingMargin"])
}

/// Net margin in percent.
#[must_use]
pub fn net_margin(snapshot: &CompanySnapshot) -> Option<f64> {
    percent_fact(snapshot, &["profitMargins", "profitMargin"])
}

/// Gross margin in percent.
#[must_use]
pub fn gross_margin(snapshot: &CompanySnapshot) -> Option<f64> {
    percent_fact(snapshot, &["grossMargins"])
}

/// Return on equity in percent.
#[must_use]
pub fn roe(snapshot: &CompanySnapshot) -> Option<f64> {
    percent_fact(snapshot, &["returnOnEquity", "roe"])
}

/// Return on assets in percent.
#[must_use]
pub fn roa(snapshot: &CompanySnapshot) -> Option<f64> {
    percent_fact(snapshot, &["returnOnAssets", "roa"])
}

/// Latest operating income after tax.
#[must_use]
pub fn nopat(snapshot: &CompanySnapshot, tax_rate: f64) -> Option<f64> {
    normalize::latest(snapshot, LineItem::OperatingIncome).map(|ebit| ebit * (1.0 - tax_rate))
}

/// Total assets less current liabilities and cash, floored at zero.
///
/// Missing liabilities leave total assets as the invested capital; missing
/// cash counts as zero.
#[must_use]
pub fn invested_capital(snapshot: &CompanySnapshot) -> Option<f64> {
    let assets = normalize::latest(snapshot, LineItem::TotalAssets)?;
    let Some(liabilities) = normalize::latest(snapshot, LineItem::CurrentLiabilities) else {
        return Some(assets);
    };
    let cash = normalize::latest(snapshot, LineItem::Cash).unwrap_or(0.0);
    Some((assets - liabilities - cash).max(0.0))
}

/// Return on invested capital in percent.
///
/// Derived from statements when both NOPAT and a non-zero invested capital
/// are available, else read from the provider's return-on-capital facts.
#[must_use]
pub fn roic(snapshot: &CompanySnapshot, tax_rate: f64) -> Option<f64> {
    match (nopat(snapshot, tax_rate), invested_capital(snapshot)) {
        (Some(nopat), Some(capital)) if capital != 0.0 => finite(nopat / capital * 100.0),
        _ => percent_fact(
            snapshot,
            &["returnOnCapitalEmployed", "returnOnInvestedCapital"],
        ),
    }
}

/// Free cash flow as a percentage of market cap.
#[must_use]
pub fn fcf_yield(snapshot: &CompanySnapshot) -> Option<f64> {
    let fcf = normalize::free_cash_flow(snapshot)?;
    let market_cap = snapshot.market_cap()?;
    finite(fcf / market_cap * 100.0)
}

/// Debt to equity as reported by the provider (percent convention).
#[must_use]
pub fn debt_to_equity(snapshot: &CompanySnapshot) -> Option<f64> {
    snapshot.info.number("debtToEquity")
}

/// Common equity tier 1 ratio in percent, when the provider reports one.
#[must_use]
pub fn cet1_ratio(snapshot: &CompanySnapshot) -> Option<f64> {
    snapshot.info.number("cet1Ratio")
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
