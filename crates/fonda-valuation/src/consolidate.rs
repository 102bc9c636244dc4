//! Fair value consolidation.
//!
//! Combines a multiples-derived price and a DCF-derived price into one blended
//! fair value, bounded relative to the current price, and derives the entry
//! price from the margin of safety.

use fonda_core::CompanySnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ValuationConfig;
use crate::multiples::{MultipleKind, Multiples};
use crate::rating::round2;
use crate::sector::{SectorBucket, SectorProfile};

/// Peer-relative fair price.
///
/// Banks are valued on book value and earnings: the mean of `peer PB * book
/// value per share` and `peer PE * trailing EPS`. Other sectors rescale the
/// current price by `peer median / company multiple` for each preferred
/// multiple and average the results. Candidates missing an input, or with a
/// non-positive one, are left out.
#[must_use]
pub fn multiples_fair_value(
    snapshot: &CompanySnapshot,
    company: &Multiples,
    peer_medians: &Multiples,
    profile: &SectorProfile,
) -> Option<f64> {
    let candidates: Vec<f64> = if profile.bucket == SectorBucket::Banks {
        let info = &snapshot.info;
        [
            (MultipleKind::Pb, info.number("bookValue")),
            (MultipleKind::Pe, info.number("trailingEps")),
        ]
        .into_iter()
        .filter_map(|(kind, base)| {
            let median = positive(peer_medians.get(kind))?;
            Some(median * positive(base)?)
        })
        .collect()
    } else {
        let price = snapshot.current_price();
        profile
            .preferred_multiples
            .iter()
            .filter_map(|kind| {
                let median = positive(peer_medians.get(*kind))?;
                let own = positive(company.get(*kind))?;
                Some(price? * median / own)
            })
            .collect()
    };

    mean(&candidates)
}

/// Blended fair value and entry price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairValue {
    /// Blended, bounded fair value per share.
    pub fair_value: f64,
    /// Fair value less the margin of safety.
    pub entry_price: f64,
}

/// Blends the two price estimates.
///
/// Each available price contributes its configured weight, renormalized over
/// the prices present. The blend is rounded to 2 decimals and, with a positive
/// current price, kept within `[lower_bound, upper_bound]` times that price,
/// with both bounds snapped inward to the cent. The entry price is derived
/// from the final fair value. Returns `None` when neither price is available.
#[must_use]
pub fn blend(
    multiples_price: Option<f64>,
    dcf_price: Option<f64>,
    current_price: Option<f64>,
    config: &ValuationConfig,
) -> Option<FairValue> {
    let (weighted, total) = [
        (multiples_price, config.multiples_weight),
        (dcf_price, config.dcf_weight),
    ]
    .into_iter()
    .filter_map(|(price, weight)| Some((positive(price)?, weight)))
    .fold((0.0, 0.0), |(weighted, total), (price, weight)| {
        (weighted + price * weight, total + weight)
    });
    if total <= 0.0 {
        return None;
    }

    let mut fair_value = round2(weighted / total);
    if let Some(current) = positive(current_price) {
        let (floor, cap) =
            cent_bounds(config.lower_bound * current, config.upper_bound * current);
        fair_value = fair_value.min(cap).max(floor);
    }

    Some(FairValue {
        fair_value,
        entry_price: round2(fair_value * (1.0 - config.margin_of_safety)),
    })
}

/// Bounds rounded inward to whole cents, or left as is when no cent fits
/// between them.
fn cent_bounds(lower: f64, upper: f64) -> (f64, f64) {
    let floor = (lower * 100.0).ceil() / 100.0;
    let cap = (upper * 100.0).floor() / 100.0;
    if floor <= cap { (floor, cap) } else { (lower, upper) }
}

/// Where the current price sits relative to the entry and fair prices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricePosition {
    /// Below the entry price.
    Undervalued,
    /// Between the entry price and the fair value.
    FairlyValued,
    /// Above the fair value.
    Overvalued,
}

impl PricePosition {
    /// Locates the current price.
    #[must_use]
    pub fn locate(current_price: f64, value: &FairValue) -> Self {
        if current_price < value.entry_price {
            Self::Undervalued
        } else if current_price <= value.fair_value {
            Self::FairlyValued
        } else {
            Self::Overvalued
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Undervalued => "Undervalued",
            Self::FairlyValued => "Fairly valued",
            Self::Overvalued => "Overvalued",
        }
    }
}

impl fmt::Display for PricePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fonda_core::Facts;

    fn multiples(values: &[(MultipleKind, f64)]) -> Multiples {
        values.iter().map(|(kind, v)| (*kind, Some(*v))).collect()
    }

    #[test]
    fn test_blend_weights() {
        let config = ValuationConfig::default();
        let value = blend(Some(100.0), Some(150.0), Some(110.0), &config).unwrap();
        assert_eq!(value.fair_value, 120.0);
        assert_eq!(value.entry_price, 96.0);
    }

    #[test]
    fn test_blend_single_signal_carries_full_weight() {
        let config = ValuationConfig::default();
        assert_eq!(
            blend(None, Some(80.0), Some(100.0), &config).unwrap().fair_value,
            80.0
        );
        assert_eq!(
            blend(Some(90.0), None, None, &config).unwrap().fair_value,
            90.0
        );
        assert_eq!(blend(None, None, Some(100.0), &config), None);
        assert_eq!(blend(Some(-5.0), None, Some(100.0), &config), None);
    }

    #[test]
    fn test_blend_bounds() {
        let config = ValuationConfig::default();
        let high = blend(Some(1000.0), Some(1000.0), Some(100.0), &config).unwrap();
        assert_eq!(high.fair_value, 200.0);
        assert_eq!(high.entry_price, 160.0);

        let low = blend(Some(10.0), Some(10.0), Some(100.0), &config).unwrap();
        assert_eq!(low.fair_value, 30.0);

        for (m, d) in [(1.0, 5000.0), (35.0, 29.0), (250.0, 199.0)] {
            let value = blend(Some(m), Some(d), Some(100.0), &config).unwrap();
            assert!((30.0..=200.0).contains(&value.fair_value));
        }
    }

    #[test]
    fn test_rounded_value_stays_within_bounds() {
        let config = ValuationConfig::default();

        let current = 33.333;
        let high = blend(Some(1000.0), None, Some(current), &config).unwrap();
        assert_eq!(high.fair_value, 66.66);
        assert!(high.fair_value <= config.upper_bound * current);
        assert_eq!(high.entry_price, 53.33);

        let current = 10.01;
        let low = blend(Some(1.0), None, Some(current), &config).unwrap();
        assert_eq!(low.fair_value, 3.01);
        assert!(low.fair_value >= config.lower_bound * current);

        // no whole cent between the bounds
        let tiny = blend(Some(1.0), None, Some(0.001), &config).unwrap();
        assert!(tiny.fair_value <= config.upper_bound * 0.001);
        assert!(tiny.fair_value >= config.lower_bound * 0.001);
    }

    #[test]
    fn test_bank_fair_value() {
        let snapshot = CompanySnapshot::new("BNP.PA").with_info(
            Facts::new()
                .with("bookValue", 80.0)
                .with("trailingEps", 9.0)
                .with("currentPrice", 60.0),
        );
        let peers = multiples(&[(MultipleKind::Pb, 0.75), (MultipleKind::Pe, 8.0)]);
        let value = multiples_fair_value(
            &snapshot,
            &Multiples::default(),
            &peers,
            SectorBucket::Banks.profile(),
        )
        .unwrap();
        // mean of 0.75 * 80 and 8 * 9
        assert_relative_eq!(value, 66.0, epsilon = 1e-9);
    }

    #[test]
    fn test_relative_fair_value_excludes_missing() {
        let snapshot =
            CompanySnapshot::new("X").with_info(Facts::new().with("currentPrice", 100.0));
        let company = multiples(&[(MultipleKind::Pe, 20.0), (MultipleKind::EvEbitda, 10.0)]);
        let peers = multiples(&[
            (MultipleKind::Pe, 15.0),
            (MultipleKind::EvEbitda, 12.0),
            (MultipleKind::PFcf, 18.0),
        ]);
        let value = multiples_fair_value(
            &snapshot,
            &company,
            &peers,
            SectorBucket::General.profile(),
        )
        .unwrap();
        // PE: 100 * 15 / 20 = 75, EV/EBITDA: 100 * 12 / 10 = 120, P/FCF missing
        assert_relative_eq!(value, 97.5, epsilon = 1e-9);

        assert_eq!(
            multiples_fair_value(
                &snapshot,
                &company,
                &Multiples::default(),
                SectorBucket::General.profile()
            ),
            None
        );
    }

    #[test]
    fn test_price_position() {
        let value = FairValue {
            fair_value: 100.0,
            entry_price: 80.0,
        };
        assert_eq!(PricePosition::locate(70.0, &value), PricePosition::Undervalued);
        assert_eq!(PricePosition::locate(80.0, &value), PricePosition::FairlyValued);
        assert_eq!(PricePosition::locate(100.0, &value), PricePosition::FairlyValued);
        assert_eq!(PricePosition::locate(101.0, &value), PricePosition::Overvalued);
    }
}
