//! Sector classification and sector profiles.
//!
//! Fundamentals are not comparable across sectors: bank leverage is not
//! corporate debt, and a REIT's cash flow does not read like a software
//! company's. Each [`SectorBucket`] therefore owns a static [`SectorProfile`]
//! that decides which indicators are scored, with which thresholds and
//! weights, and which valuation multiples apply.

use fonda_core::CompanySnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::indicators::IndicatorKind;
use crate::multiples::MultipleKind;
use crate::rating::Threshold;

use IndicatorKind::{
    Cet1Ratio, DebtToEquity, Fcf, GrossMargin, NetIncomeGrowth, NetMargin, OperatingMargin, Roa,
    Roe, Roic, RevenueGrowth,
};
use MultipleKind::{EvEbitda, PFcf, Pb, Pe, Ps};

/// Canonical sector buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectorBucket {
    /// Banks and diversified financial services.
    Banks,
    /// Insurers and reinsurers.
    Insurance,
    /// Luxury goods, apparel and cosmetics.
    Luxury,
    /// Software, semiconductors and internet.
    Tech,
    /// Oil, gas, mining and coal.
    Energy,
    /// Electric, water and gas utilities.
    Utilities,
    /// Pharma, biotech and medical devices.
    Healthcare,
    /// Property companies and REITs.
    RealEstate,
    /// Consumer staples, discretionary and retail.
    Consumer,
    /// Industrials and manufacturing.
    Industrial,
    /// Anything else.
    General,
}

/// Keyword lists, tested in order. The first bucket with a matching keyword wins.
const KEYWORDS: &[(SectorBucket, &[&str])] = &[
    (SectorBucket::Banks, &["bank", "banks", "financial services", "banking"]),
    (SectorBucket::Insurance, &["insurance", "insurer", "reinsurance"]),
    (SectorBucket::Luxury, &["apparel", "luxury", "cosmetics", "fashion", "leisure"]),
    (SectorBucket::Tech, &["technology", "software", "semiconductor", "internet", "tech"]),
    (SectorBucket::Energy, &["energy", "oil", "gas", "petroleum", "mining", "coal"]),
    (
        SectorBucket::Utilities,
        &["utilities", "electric", "power", "water", "gas distribution"],
    ),
    (SectorBucket::Healthcare, &["healthcare", "pharmaceutical", "biotech", "medical"]),
    (SectorBucket::RealEstate, &["real estate", "realestate", "property", "reits"]),
    (
        SectorBucket::Consumer,
        &["consumer staples", "consumer discretionary", "retail"],
    ),
    (SectorBucket::Industrial, &["industrial", "manufacturing", "capital goods"]),
];

/// Secondary substring checks applied when no keyword list matched.
const HEURISTICS: &[(SectorBucket, &[&str])] = &[
    (SectorBucket::Banks, &["financial", "bank", "bnp", "hsbc"]),
    (SectorBucket::Insurance, &["insur"]),
    (SectorBucket::Luxury, &["lvmh", "hermes", "lux"]),
    (SectorBucket::Tech, &["tech", "software", "semiconductor"]),
    (SectorBucket::Energy, &["oil", "gas", "energy", "petrol"]),
    (SectorBucket::Utilities, &["utility", "power"]),
];

impl SectorBucket {
    /// Classifies a company from its sector, industry and name.
    #[must_use]
    pub fn classify(sector: Option<&str>, industry: Option<&str>, name: Option<&str>) -> Self {
        let probe = [sector, industry, name]
            .into_iter()
            .map(|part| part.map(str::trim).unwrap_or_default().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        first_match(KEYWORDS, &probe)
            .or_else(|| first_match(HEURISTICS, &probe))
            .unwrap_or(Self::General)
    }

    /// Classifies a snapshot from its `sector`, `industry` and name facts.
    #[must_use]
    pub fn of(snapshot: &CompanySnapshot) -> Self {
        let info = &snapshot.info;
        Self::classify(
            info.text("sector"),
            info.text("industry"),
            info.first_text(&["shortName", "longName", "long_name"]),
        )
    }

    /// Returns the static profile of this bucket.
    #[must_use]
    pub fn profile(self) -> &'static SectorProfile {
        match self {
            Self::Banks => &BANKS,
            Self::Insurance => &INSURANCE,
            Self::Luxury => &LUXURY,
            Self::Tech => &TECH,
            Self::Energy => &ENERGY,
            Self::Utilities => &UTILITIES,
            Self::Healthcare => &HEALTHCARE,
            Self::RealEstate => &REAL_ESTATE,
            Self::Consumer => &CONSUMER,
            Self::Industrial => &INDUSTRIAL,
            Self::General => &GENERAL,
        }
    }

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Banks => "BANKS",
            Self::Insurance => "INSURANCE",
            Self::Luxury => "LUXURY",
            Self::Tech => "TECH",
            Self::Energy => "ENERGY",
            Self::Utilities => "UTILITIES",
            Self::Healthcare => "HEALTHCARE",
            Self::RealEstate => "REAL_ESTATE",
            Self::Consumer => "CONSUMER",
            Self::Industrial => "INDUSTRIAL",
            Self::General => "GENERAL",
        }
    }
}

fn first_match(table: &[(SectorBucket, &[&str])], probe: &str) -> Option<SectorBucket> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| probe.contains(kw)))
        .map(|(bucket, _)| *bucket)
}

impl fmt::Display for SectorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rating and valuation policy for one sector bucket.
#[derive(Debug, PartialEq)]
pub struct SectorProfile {
    /// The bucket this profile belongs to.
    pub bucket: SectorBucket,
    /// Indicators that are meaningful for the sector.
    pub enabled: &'static [IndicatorKind],
    /// Scored indicators and their weights.
    pub weights: &'static [(IndicatorKind, f64)],
    /// Sector-specific thresholds; other indicators use [`default_threshold`].
    pub thresholds: &'static [(IndicatorKind, Threshold)],
    /// Multiples used for valuation, most relevant first.
    pub preferred_multiples: &'static [MultipleKind],
    /// Short analyst note.
    pub note: &'static str,
}

impl SectorProfile {
    /// Returns true if the indicator is meaningful for the sector.
    #[must_use]
    pub fn is_enabled(&self, kind: IndicatorKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Returns the scoring weight of an indicator, if it is scored.
    #[must_use]
    pub fn weight(&self, kind: IndicatorKind) -> Option<f64> {
        self.weights
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, weight)| *weight)
    }

    /// Returns the threshold used to rate an indicator.
    #[must_use]
    pub fn threshold(&self, kind: IndicatorKind) -> Threshold {
        self.thresholds
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or_else(|| default_threshold(kind), |(_, threshold)| *threshold)
    }
}

/// General-purpose threshold of an indicator.
///
/// Debt/equity is in the provider's percent convention (150 means 1.5x) and
/// rated lower-is-better: at most 50 is good, above 100 is weak. Sector
/// profiles that tolerate more leverage move both bounds up.
#[must_use]
pub const fn default_threshold(kind: IndicatorKind) -> Threshold {
    match kind {
        RevenueGrowth | NetIncomeGrowth | Fcf => Threshold::higher(0.0, 5.0),
        OperatingMargin | NetMargin => Threshold::higher(5.0, 15.0),
        GrossMargin => Threshold::higher(20.0, 40.0),
        Roe => Threshold::higher(8.0, 15.0),
        Roa => Threshold::higher(2.0, 5.0),
        Roic => Threshold::higher(8.0, 12.0),
        DebtToEquity => Threshold::lower(50.0, 100.0),
        Cet1Ratio => Threshold::higher(8.0, 12.0),
    }
}

const ALL_CORPORATE: &[IndicatorKind] = &[
    RevenueGrowth,
    NetIncomeGrowth,
    OperatingMargin,
    NetMargin,
    GrossMargin,
    Roe,
    Roa,
    Roic,
    Fcf,
    DebtToEquity,
];

const NO_TOP_LINE: &[IndicatorKind] = &[
    NetIncomeGrowth,
    OperatingMargin,
    NetMargin,
    Roe,
    Roa,
    Roic,
    Fcf,
    DebtToEquity,
];

const GENERAL_RULES: SectorProfile = SectorProfile {
    bucket: SectorBucket::General,
    enabled: &[
        RevenueGrowth,
        NetIncomeGrowth,
        OperatingMargin,
        NetMargin,
        Roe,
        Roa,
        Roic,
        Fcf,
        DebtToEquity,
    ],
    weights: &[
        (RevenueGrowth, 0.20),
        (NetIncomeGrowth, 0.15),
        (OperatingMargin, 0.15),
        (Roic, 0.15),
        (Roe, 0.10),
        (Fcf, 0.15),
        (DebtToEquity, 0.10),
    ],
    thresholds: &[],
    preferred_multiples: &[Pe, EvEbitda, PFcf],
    note: "General fallback profile.",
};

static GENERAL: SectorProfile = GENERAL_RULES;

static INDUSTRIAL: SectorProfile = SectorProfile {
    bucket: SectorBucket::Industrial,
    note: "Industrials: general rule set.",
    ..GENERAL_RULES
};

static BANKS: SectorProfile = SectorProfile {
    bucket: SectorBucket::Banks,
    enabled: &[NetIncomeGrowth, NetMargin, Roe, Roa, Cet1Ratio],
    weights: &[
        (Roe, 0.40),
        (NetIncomeGrowth, 0.20),
        (Roa, 0.15),
        (NetMargin, 0.10),
        (Cet1Ratio, 0.15),
    ],
    thresholds: &[
        (Roe, Threshold::higher(8.0, 12.0)),
        (Roa, Threshold::higher(0.5, 1.5)),
    ],
    preferred_multiples: &[Pb, Pe],
    note: "Banks: prefer P/B and capital adequacy metrics. Avoid ROIC and industrial multiples.",
};

static INSURANCE: SectorProfile = SectorProfile {
    bucket: SectorBucket::Insurance,
    enabled: &[NetIncomeGrowth, NetMargin, Roe, Roa],
    weights: &[
        (Roe, 0.35),
        (NetIncomeGrowth, 0.25),
        (NetMargin, 0.20),
        (Roa, 0.20),
    ],
    thresholds: &[(Roe, Threshold::higher(8.0, 12.0))],
    preferred_multiples: &[Pb, Pe],
    note: "Insurance: focus on underwriting profitability and surplus adequacy.",
};

static LUXURY: SectorProfile = SectorProfile {
    bucket: SectorBucket::Luxury,
    enabled: ALL_CORPORATE,
    weights: &[
        (OperatingMargin, 0.30),
        (RevenueGrowth, 0.25),
        (Roic, 0.20),
        (Fcf, 0.15),
        (DebtToEquity, 0.10),
    ],
    thresholds: &[
        (OperatingMargin, Threshold::higher(10.0, 20.0)),
        (RevenueGrowth, Threshold::higher(2.0, 8.0)),
    ],
    preferred_multiples: &[Pe, EvEbitda, Ps],
    note: "Luxury and premium brands: brand margins and ROIC are critical.",
};

static TECH: SectorProfile = SectorProfile {
    bucket: SectorBucket::Tech,
    enabled: ALL_CORPORATE,
    weights: &[
        (RevenueGrowth, 0.30),
        (OperatingMargin, 0.20),
        (Fcf, 0.20),
        (Roic, 0.15),
        (GrossMargin, 0.15),
    ],
    thresholds: &[
        (RevenueGrowth, Threshold::higher(10.0, 25.0)),
        (Roic, Threshold::higher(5.0, 10.0)),
    ],
    preferred_multiples: &[PFcf, EvEbitda, Pe],
    note: "Tech: growth and free cash flow come first.",
};

static ENERGY: SectorProfile = SectorProfile {
    bucket: SectorBucket::Energy,
    enabled: NO_TOP_LINE,
    weights: &[
        (Fcf, 0.30),
        (Roic, 0.20),
        (DebtToEquity, 0.20),
        (OperatingMargin, 0.15),
        (RevenueGrowth, 0.15),
    ],
    thresholds: &[
        (Roic, Threshold::higher(5.0, 10.0)),
        (DebtToEquity, Threshold::lower(100.0, 300.0)),
    ],
    preferred_multiples: &[EvEbitda, PFcf],
    note: "Energy: cyclical business, prefer cash flow and asset-backed valuation.",
};

static UTILITIES: SectorProfile = SectorProfile {
    bucket: SectorBucket::Utilities,
    enabled: NO_TOP_LINE,
    weights: &[
        (Fcf, 0.25),
        (DebtToEquity, 0.25),
        (Roic, 0.20),
        (NetIncomeGrowth, 0.15),
        (Roe, 0.15),
    ],
    thresholds: &[(DebtToEquity, Threshold::lower(100.0, 150.0))],
    preferred_multiples: &[EvEbitda, PFcf],
    note: "Utilities: stability and leverage are key.",
};

static HEALTHCARE: SectorProfile = SectorProfile {
    bucket: SectorBucket::Healthcare,
    enabled: ALL_CORPORATE,
    weights: &[
        (RevenueGrowth, 0.25),
        (Roic, 0.20),
        (OperatingMargin, 0.20),
        (Fcf, 0.20),
        (DebtToEquity, 0.15),
    ],
    thresholds: &[(RevenueGrowth, Threshold::higher(5.0, 15.0))],
    preferred_multiples: &[Pe, EvEbitda],
    note: "Healthcare: defensive or growth depending on the sub-sector.",
};

static REAL_ESTATE: SectorProfile = SectorProfile {
    bucket: SectorBucket::RealEstate,
    enabled: &[NetIncomeGrowth, NetMargin, Roe, Roa, Fcf, DebtToEquity],
    weights: &[
        (Fcf, 0.30),
        (DebtToEquity, 0.30),
        (Roe, 0.20),
        (NetIncomeGrowth, 0.20),
    ],
    thresholds: &[(DebtToEquity, Threshold::lower(50.0, 150.0))],
    preferred_multiples: &[Pb, EvEbitda],
    note: "Real estate: financing structure and funds from operations matter.",
};

static CONSUMER: SectorProfile = SectorProfile {
    bucket: SectorBucket::Consumer,
    enabled: ALL_CORPORATE,
    weights: &[
        (OperatingMargin, 0.25),
        (RevenueGrowth, 0.25),
        (Roic, 0.20),
        (Fcf, 0.20),
        (DebtToEquity, 0.10),
    ],
    thresholds: &[],
    preferred_multiples: &[Pe, EvEbitda, Ps],
    note: "Consumer: margin and brand strength matter.",
};

#[cfg(test)]
mod tests {
    use super::*;
    use fonda_core::Facts;

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            SectorBucket::classify(Some("Banks"), None, None),
            SectorBucket::Banks
        );
        assert_eq!(
            SectorBucket::classify(None, Some("Software—Application"), None),
            SectorBucket::Tech
        );
        assert_eq!(SectorBucket::classify(None, None, None), SectorBucket::General);
        assert_eq!(
            SectorBucket::classify(Some(""), Some("Widgets"), Some("Acme")),
            SectorBucket::General
        );
    }

    #[test]
    fn test_keyword_order_wins() {
        // "Financial Services" matches the bank list before anything else.
        assert_eq!(
            SectorBucket::classify(Some("Financial Services"), Some("Insurance—Life"), None),
            SectorBucket::Banks
        );
        assert_eq!(
            SectorBucket::classify(Some("Consumer Cyclical"), Some("Luxury Goods"), None),
            SectorBucket::Luxury
        );
        assert_eq!(
            SectorBucket::classify(Some("Industrials"), Some("Specialty Machinery"), None),
            SectorBucket::Industrial
        );
    }

    #[test]
    fn test_heuristic_pass() {
        assert_eq!(
            SectorBucket::classify(None, None, Some("BNP Paribas")),
            SectorBucket::Banks
        );
        assert_eq!(
            SectorBucket::classify(None, None, Some("Allianz Insur")),
            SectorBucket::Insurance
        );
        assert_eq!(
            SectorBucket::classify(None, None, Some("LVMH")),
            SectorBucket::Luxury
        );
        assert_eq!(
            SectorBucket::classify(None, None, Some("TotalEnergies Petrol")),
            SectorBucket::Energy
        );
    }

    #[test]
    fn test_snapshot_classification() {
        let snapshot = CompanySnapshot::new("MC.PA").with_info(
            Facts::new()
                .with("sector", "Consumer Cyclical")
                .with("industry", "Luxury Goods")
                .with("shortName", "LVMH"),
        );
        assert_eq!(SectorBucket::of(&snapshot), SectorBucket::Luxury);
    }

    #[test]
    fn test_profiles() {
        let banks = SectorBucket::Banks.profile();
        assert_eq!(banks.preferred_multiples, &[Pb, Pe]);
        assert!(!banks.is_enabled(Roic));
        assert_eq!(banks.weight(Roe), Some(0.40));
        assert_eq!(banks.threshold(Roa), Threshold::higher(0.5, 1.5));
        assert_eq!(banks.threshold(Cet1Ratio), Threshold::higher(8.0, 12.0));

        let tech = SectorBucket::Tech.profile();
        assert_eq!(tech.preferred_multiples, &[PFcf, EvEbitda, Pe]);

        let leverage = default_threshold(DebtToEquity);
        assert_eq!(leverage.rate(Some(40.0)), crate::rating::Rating::Good);
        assert_eq!(leverage.rate(Some(99.0)), crate::rating::Rating::Average);
        assert_eq!(leverage.rate(Some(150.0)), crate::rating::Rating::Weak);

        let industrial = SectorBucket::Industrial.profile();
        assert_eq!(industrial.weights, SectorBucket::General.profile().weights);
        assert_eq!(industrial.bucket, SectorBucket::Industrial);
    }

    #[test]
    fn test_every_profile_has_positive_weights() {
        let buckets = [
            SectorBucket::Banks,
            SectorBucket::Insurance,
            SectorBucket::Luxury,
            SectorBucket::Tech,
            SectorBucket::Energy,
            SectorBucket::Utilities,
            SectorBucket::Healthcare,
            SectorBucket::RealEstate,
            SectorBucket::Consumer,
            SectorBucket::Industrial,
            SectorBucket::General,
        ];
        for bucket in buckets {
            let profile = bucket.profile();
            assert_eq!(profile.bucket, bucket);
            assert!(profile.weights.iter().all(|(_, w)| *w > 0.0));
            assert!(!profile.preferred_multiples.is_empty());
        }
    }
}
