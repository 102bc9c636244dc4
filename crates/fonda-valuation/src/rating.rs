//! Ratings, global score and verdict.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::indicators::{IndicatorKind, Indicators};
use crate::sector::SectorProfile;

/// Categorical rating of one indicator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    /// At or beyond the upper threshold.
    Good,
    /// Between the two thresholds.
    Average,
    /// Short of the lower threshold.
    Weak,
    /// The indicator could not be computed.
    DataUnavailable,
}

impl Rating {
    /// Contribution of this rating to the global score, before weighting.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Good => 1.0,
            Self::Average => 0.5,
            Self::Weak | Self::DataUnavailable => 0.0,
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Average => "Average",
            Self::Weak => "Weak",
            Self::DataUnavailable => "Data Unavailable",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which side of the thresholds is healthy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Larger values are better.
    HigherIsBetter,
    /// Smaller values are better.
    LowerIsBetter,
}

/// A `(low, mid)` threshold pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    /// Lower boundary.
    pub low: f64,
    /// Upper boundary.
    pub mid: f64,
    /// Which side is healthy.
    pub direction: Direction,
}

impl Threshold {
    /// Thresholds for an indicator where larger values are better.
    #[must_use]
    pub const fn higher(low: f64, mid: f64) -> Self {
        Self {
            low,
            mid,
            direction: Direction::HigherIsBetter,
        }
    }

    /// Thresholds for an indicator where smaller values are better.
    #[must_use]
    pub const fn lower(low: f64, mid: f64) -> Self {
        Self {
            low,
            mid,
            direction: Direction::LowerIsBetter,
        }
    }

    /// Rates a value against these thresholds.
    #[must_use]
    pub fn rate(&self, value: Option<f64>) -> Rating {
        match self.direction {
            Direction::HigherIsBetter => rate(value, self.low, self.mid),
            Direction::LowerIsBetter => rate_inverted(value, self.low, self.mid),
        }
    }
}

/// Rates a value where larger is better.
///
/// `v < low` is weak, `low <= v < mid` is average, `v >= mid` is good.
#[must_use]
pub fn rate(value: Option<f64>, low: f64, mid: f64) -> Rating {
    match value {
        Some(v) if v.is_finite() => {
            if v >= mid {
                Rating::Good
            } else if v >= low {
                Rating::Average
            } else {
                Rating::Weak
            }
        }
        _ => Rating::DataUnavailable,
    }
}

/// Rates a value where smaller is better.
///
/// `v <= low` is good, `low < v <= mid` is average, `v > mid` is weak.
#[must_use]
pub fn rate_inverted(value: Option<f64>, low: f64, mid: f64) -> Rating {
    match value {
        Some(v) if v.is_finite() => {
            if v <= low {
                Rating::Good
            } else if v <= mid {
                Rating::Average
            } else {
                Rating::Weak
            }
        }
        _ => Rating::DataUnavailable,
    }
}

/// One rated indicator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedIndicator {
    /// The indicator value, if available.
    pub value: Option<f64>,
    /// The rating.
    pub rating: Rating,
    /// The scoring weight.
    pub weight: f64,
}

/// Rates the indicators the profile scores.
///
/// A weighted indicator the profile does not enable is not rated.
#[must_use]
pub fn rate_indicators(
    indicators: &Indicators,
    profile: &SectorProfile,
) -> BTreeMap<IndicatorKind, RatedIndicator> {
    profile
        .weights
        .iter()
        .filter(|(kind, _)| profile.is_enabled(*kind))
        .map(|(kind, weight)| {
            let value = indicators.get(*kind);
            let rating = profile.threshold(*kind).rate(value);
            (
                *kind,
                RatedIndicator {
                    value,
                    rating,
                    weight: *weight,
                },
            )
        })
        .collect()
}

/// Weighted share of good ratings, scaled to 0-100 and rounded to 2 decimals.
///
/// Negative weights are ignored. A zero total weight scores 0.
#[must_use]
pub fn global_score(ratings: impl IntoIterator<Item = (Rating, f64)>) -> f64 {
    let (weighted, total) = ratings
        .into_iter()
        .filter(|(_, weight)| weight.is_finite() && *weight > 0.0)
        .fold((0.0, 0.0), |(weighted, total), (rating, weight)| {
            (weighted + rating.score() * weight, total + weight)
        });
    if total == 0.0 {
        return 0.0;
    }
    round2(weighted / total * 100.0)
}

/// Qualitative reading of the global score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// Score of 80 or more.
    Strong,
    /// Score of 60 or more.
    Decent,
    /// Score of 40 or more.
    Mixed,
    /// Score below 40.
    Weak,
}

impl Verdict {
    /// Maps a score to its band.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Strong
        } else if score >= 60.0 {
            Self::Decent
        } else if score >= 40.0 {
            Self::Mixed
        } else {
            Self::Weak
        }
    }

    /// Returns the verdict sentence.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Strong => "Strong fundamentals: attractive for long-term investors.",
            Self::Decent => "Decent fundamentals: consider further due diligence.",
            Self::Mixed => "Mixed fundamentals: watch for risks.",
            Self::Weak => "Weak fundamentals: risky for long-term investment.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Position of a company value relative to the peer median.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerComparison {
    /// At least the band above the median.
    AbovePeer,
    /// At least the band below the median.
    BelowPeer,
    /// Within the band.
    InLine,
}

impl PeerComparison {
    /// Compares a value to a peer median with a symmetric relative band.
    ///
    /// Returns `None` when either side is missing or the median is zero.
    #[must_use]
    pub fn compare(value: Option<f64>, peer_median: Option<f64>, band: f64) -> Option<Self> {
        let value = value?;
        let median = peer_median.filter(|m| *m != 0.0)?;
        let relative = (value - median) / median;
        if !relative.is_finite() {
            return None;
        }
        Some(if relative <= -band {
            Self::BelowPeer
        } else if relative >= band {
            Self::AbovePeer
        } else {
            Self::InLine
        })
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AbovePeer => "Above Peer",
            Self::BelowPeer => "Below Peer",
            Self::InLine => "In line with peers",
        }
    }
}

impl fmt::Display for PeerComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_boundaries() {
        assert_eq!(rate(Some(4.99), 5.0, 15.0), Rating::Weak);
        assert_eq!(rate(Some(5.0), 5.0, 15.0), Rating::Average);
        assert_eq!(rate(Some(14.99), 5.0, 15.0), Rating::Average);
        assert_eq!(rate(Some(15.0), 5.0, 15.0), Rating::Good);
        assert_eq!(rate(None, 5.0, 15.0), Rating::DataUnavailable);
        assert_eq!(rate(Some(f64::NAN), 5.0, 15.0), Rating::DataUnavailable);
    }

    #[test]
    fn test_rate_inverted() {
        let threshold = Threshold::lower(50.0, 100.0);
        assert_eq!(threshold.rate(Some(30.0)), Rating::Good);
        assert_eq!(threshold.rate(Some(50.0)), Rating::Good);
        assert_eq!(threshold.rate(Some(80.0)), Rating::Average);
        assert_eq!(threshold.rate(Some(150.0)), Rating::Weak);
        assert_eq!(threshold.rate(None), Rating::DataUnavailable);
    }

    #[test]
    fn test_disabled_indicators_are_not_rated() {
        use crate::sector::SectorBucket;

        let indicators: Indicators = [
            (IndicatorKind::RevenueGrowth, Some(12.0)),
            (IndicatorKind::Fcf, Some(6.0)),
        ]
        .into_iter()
        .collect();
        let energy = SectorBucket::Energy.profile();
        assert!(energy.weight(IndicatorKind::RevenueGrowth).is_some());

        let ratings = rate_indicators(&indicators, energy);
        assert!(!ratings.contains_key(&IndicatorKind::RevenueGrowth));
        assert_eq!(ratings[&IndicatorKind::Fcf].rating, Rating::Good);
    }

    #[test]
    fn test_global_score() {
        let score = global_score([
            (Rating::Good, 0.5),
            (Rating::Average, 0.3),
            (Rating::Weak, 0.2),
        ]);
        assert_eq!(score, 65.0);
        assert_eq!(global_score([(Rating::DataUnavailable, 1.0)]), 0.0);
        assert_eq!(global_score(Vec::new()), 0.0);
        assert_eq!(global_score([(Rating::Good, 0.0)]), 0.0);
    }

    #[test]
    fn test_global_score_is_bounded() {
        let all_good = global_score([(Rating::Good, 0.2), (Rating::Good, 3.0)]);
        assert_eq!(all_good, 100.0);
        let mixed = global_score([(Rating::Good, 1.0), (Rating::Average, 1.0), (Rating::Weak, 1.0)]);
        assert!((0.0..=100.0).contains(&mixed));
        assert_eq!(mixed, 50.0);
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_score(80.0), Verdict::Strong);
        assert_eq!(Verdict::from_score(79.99), Verdict::Decent);
        assert_eq!(Verdict::from_score(60.0), Verdict::Decent);
        assert_eq!(Verdict::from_score(40.0), Verdict::Mixed);
        assert_eq!(Verdict::from_score(39.99), Verdict::Weak);
    }

    #[test]
    fn test_peer_comparison() {
        assert_eq!(
            PeerComparison::compare(Some(12.0), Some(10.0), 0.2),
            Some(PeerComparison::AbovePeer)
        );
        assert_eq!(
            PeerComparison::compare(Some(8.0), Some(10.0), 0.2),
            Some(PeerComparison::BelowPeer)
        );
        assert_eq!(
            PeerComparison::compare(Some(10.5), Some(10.0), 0.2),
            Some(PeerComparison::InLine)
        );
        assert_eq!(PeerComparison::compare(Some(10.0), Some(0.0), 0.2), None);
        assert_eq!(PeerComparison::compare(None, Some(10.0), 0.2), None);
    }
}
