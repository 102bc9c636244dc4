//! Enterprise value and valuation multiples.
//!
//! The full multiple set is computed for every company. Sector profiles then
//! decide which multiples are reported and used for peer-relative valuation
//! (see [`Multiples::select`]).

use fonda_core::CompanySnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::normalize::{self, LineItem};

/// Share-count fields, in lookup order.
pub(crate) const SHARES_KEYS: &[&str] = &["sharesOutstanding", "impliedSharesOutstanding"];

/// Cash fields, in lookup order.
const CASH_KEYS: &[&str] = &["cash", "totalCash"];

/// A valuation multiple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MultipleKind {
    /// Price to earnings.
    #[serde(rename = "PE")]
    Pe,
    /// Price to book.
    #[serde(rename = "PB")]
    Pb,
    /// Price to sales.
    #[serde(rename = "PS")]
    Ps,
    /// Enterprise value to EBITDA.
    #[serde(rename = "EV/EBITDA")]
    EvEbitda,
    /// Price to free cash flow.
    #[serde(rename = "P/FCF")]
    PFcf,
}

impl MultipleKind {
    /// All multiples, in report order.
    pub const ALL: [Self; 5] = [Self::Pe, Self::Pb, Self::Ps, Self::EvEbitda, Self::PFcf];

    /// Returns the conventional label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pe => "PE",
            Self::Pb => "PB",
            Self::Ps => "PS",
            Self::EvEbitda => "EV/EBITDA",
            Self::PFcf => "P/FCF",
        }
    }
}

impl fmt::Display for MultipleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of multiples; absent or undefined multiples hold `None`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Multiples(BTreeMap<MultipleKind, Option<f64>>);

impl Multiples {
    /// Computes every multiple for a snapshot.
    #[must_use]
    pub fn compute(snapshot: &CompanySnapshot) -> Self {
        let info = &snapshot.info;
        let ev = snapshot_enterprise_value(snapshot);
        let fcf = normalize::free_cash_flow(snapshot);
        let shares = info.first_positive(SHARES_KEYS);

        [
            (MultipleKind::Pe, info.first_number(&["trailingPE", "forwardPE"])),
            (MultipleKind::Pb, info.number("priceToBook")),
            (MultipleKind::Ps, info.number("priceToSalesTrailing12Months")),
            (MultipleKind::EvEbitda, ev_to_ebitda(ev, info.number("ebitda"))),
            (
                MultipleKind::PFcf,
                price_to_fcf(snapshot.current_price(), fcf, shares),
            ),
        ]
        .into_iter()
        .collect()
    }

    /// Returns a multiple, if defined.
    #[must_use]
    pub fn get(&self, kind: MultipleKind) -> Option<f64> {
        self.0.get(&kind).copied().flatten()
    }

    /// Sets a multiple.
    pub fn set(&mut self, kind: MultipleKind, value: Option<f64>) {
        self.0.insert(kind, value.filter(|v| v.is_finite()));
    }

    /// Restricts the set to `kinds`.
    #[must_use]
    pub fn select(&self, kinds: &[MultipleKind]) -> Self {
        kinds.iter().map(|kind| (*kind, self.get(*kind))).collect()
    }

    /// Returns true if no multiple is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Option::is_none)
    }

    /// Iterates over the multiples in report order.
    pub fn iter(&self) -> impl Iterator<Item = (MultipleKind, Option<f64>)> + '_ {
        self.0.iter().map(|(kind, value)| (*kind, *value))
    }
}

impl FromIterator<(MultipleKind, Option<f64>)> for Multiples {
    fn from_iter<I: IntoIterator<Item = (MultipleKind, Option<f64>)>>(iter: I) -> Self {
        let mut multiples = Self::default();
        for (kind, value) in iter {
            multiples.set(kind, value);
        }
        multiples
    }
}

/// Market cap plus debt minus cash.
///
/// Missing debt or cash count as zero; a missing market cap leaves the
/// enterprise value undefined.
#[must_use]
pub fn enterprise_value(market_cap: Option<f64>, total_debt: Option<f64>, cash: Option<f64>) -> Option<f64> {
    let market_cap = market_cap?;
    Some(market_cap + total_debt.unwrap_or(0.0) - cash.unwrap_or(0.0))
}

/// Enterprise value from the snapshot facts.
///
/// Cash falls back to the latest balance-sheet cash line when no cash fact is
/// present.
#[must_use]
pub fn snapshot_enterprise_value(snapshot: &CompanySnapshot) -> Option<f64> {
    enterprise_value(
        snapshot.market_cap(),
        total_debt(snapshot),
        cash(snapshot),
    )
}

/// Total debt fact.
#[must_use]
pub fn total_debt(snapshot: &CompanySnapshot) -> Option<f64> {
    snapshot.info.number("totalDebt")
}

/// Cash fact, else the latest balance-sheet cash.
#[must_use]
pub fn cash(snapshot: &CompanySnapshot) -> Option<f64> {
    snapshot
        .info
        .first_number(CASH_KEYS)
        .or_else(|| normalize::latest(snapshot, LineItem::Cash))
}

/// Enterprise value over EBITDA; undefined for a zero or missing EBITDA.
#[must_use]
pub fn ev_to_ebitda(ev: Option<f64>, ebitda: Option<f64>) -> Option<f64> {
    let ebitda = ebitda.filter(|e| *e != 0.0)?;
    Some(ev? / ebitda)
}

/// Price over free cash flow per share.
#[must_use]
pub fn price_to_fcf(price: Option<f64>, fcf: Option<f64>, shares: Option<f64>) -> Option<f64> {
    let shares = shares.filter(|s| *s != 0.0)?;
    let fcf_per_share = fcf? / shares;
    if fcf_per_share == 0.0 {
        return None;
    }
    Some(price? / fcf_per_share)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fonda_core::Facts;

    #[test]
    fn test_enterprise_value() {
        assert_eq!(enterprise_value(Some(1000.0), Some(200.0), Some(50.0)), Some(1150.0));
        assert_eq!(enterprise_value(Some(1000.0), None, None), Some(1000.0));
        assert_eq!(enterprise_value(None, Some(200.0), Some(50.0)), None);
    }

    #[test]
    fn test_ev_to_ebitda() {
        assert_eq!(ev_to_ebitda(Some(1150.0), Some(115.0)), Some(10.0));
        assert_eq!(ev_to_ebitda(Some(1150.0), Some(0.0)), None);
        assert_eq!(ev_to_ebitda(None, Some(10.0)), None);
    }

    #[test]
    fn test_price_to_fcf() {
        assert_eq!(price_to_fcf(Some(20.0), Some(100.0), Some(50.0)), Some(10.0));
        assert_eq!(price_to_fcf(Some(20.0), Some(0.0), Some(50.0)), None);
        assert_eq!(price_to_fcf(Some(20.0), Some(100.0), None), None);
        assert_eq!(price_to_fcf(None, Some(100.0), Some(50.0)), None);
    }

    #[test]
    fn test_compute_from_facts() {
        let snapshot = CompanySnapshot::new("X").with_info(
            Facts::new()
                .with("marketCap", 1000.0)
                .with("totalDebt", 200.0)
                .with("totalCash", 50.0)
                .with("ebitda", 115.0)
                .with("forwardPE", 12.0)
                .with("priceToBook", 1.5)
                .with("currentPrice", 10.0)
                .with("sharesOutstanding", 100.0)
                .with("freeCashflow", 80.0),
        );
        let multiples = Multiples::compute(&snapshot);

        assert_eq!(snapshot_enterprise_value(&snapshot), Some(1150.0));
        assert_eq!(multiples.get(MultipleKind::Pe), Some(12.0));
        assert_eq!(multiples.get(MultipleKind::Pb), Some(1.5));
        assert_eq!(multiples.get(MultipleKind::Ps), None);
        assert_relative_eq!(multiples.get(MultipleKind::EvEbitda).unwrap(), 10.0);
        assert_relative_eq!(multiples.get(MultipleKind::PFcf).unwrap(), 12.5);
    }

    #[test]
    fn test_select_restricts_set() {
        let multiples: Multiples = [
            (MultipleKind::Pe, Some(10.0)),
            (MultipleKind::Pb, Some(1.2)),
            (MultipleKind::Ps, Some(3.0)),
        ]
        .into_iter()
        .collect();

        let banks = multiples.select(&[MultipleKind::Pb, MultipleKind::Pe]);
        assert_eq!(banks.get(MultipleKind::Pb), Some(1.2));
        assert_eq!(banks.get(MultipleKind::Ps), None);
        assert_eq!(banks.iter().count(), 2);
        assert_eq!(
            serde_json::to_string(&banks).unwrap(),
            r#"{"PE":10.0,"PB":1.2}"#
        );
    }
}
