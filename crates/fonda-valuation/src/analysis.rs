//! The analysis pipeline.
//!
//! [`analyze`] is a pure function from a snapshot (and optional peer snapshots)
//! to an [`AnalysisReport`]. It never fails: whatever cannot be computed is
//! reported as missing.

use fonda_core::{CompanySnapshot, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ValuationConfig;
use crate::consolidate::{self, PricePosition};
use crate::dcf::{self, DcfError};
use crate::indicators::{IndicatorKind, Indicators};
use crate::multiples::{self, MultipleKind, Multiples};
use crate::normalize;
use crate::peers;
use crate::rating::{self, PeerComparison, RatedIndicator, Verdict};
use crate::sector::SectorBucket;

/// Valuation figures of one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    /// The multiples relevant to the sector.
    pub multiples: Multiples,
    /// Market cap plus debt minus cash.
    pub enterprise_value: Option<f64>,
    /// Discount rate used by the DCF.
    pub wacc: f64,
    /// Latest free cash flow fed to the DCF.
    pub free_cash_flow: Option<f64>,
    /// Enterprise value from the DCF.
    pub dcf_enterprise_value: Option<f64>,
    /// DCF enterprise value per share.
    pub intrinsic_price_per_share: Option<f64>,
    /// Peer-relative fair price.
    pub multiples_fair_value: Option<f64>,
    /// Blended, bounded fair value.
    pub fair_value: Option<f64>,
    /// Fair value less the margin of safety.
    pub entry_price: Option<f64>,
    /// Current share price.
    pub current_price: Option<f64>,
    /// Current price relative to entry and fair value.
    pub price_position: Option<PricePosition>,
}

/// The complete result of analyzing one company.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The analyzed symbol.
    pub symbol: Symbol,
    /// Company name, when the provider reports one.
    pub name: Option<String>,
    /// Sector bucket the company was classified into.
    pub sector: SectorBucket,
    /// Guidance attached to the sector profile.
    pub sector_note: String,
    /// The indicators enabled for the sector, available or not.
    pub indicators: Indicators,
    /// Ratings of the indicators the sector scores.
    pub ratings: BTreeMap<IndicatorKind, RatedIndicator>,
    /// Weighted score in `[0, 100]`.
    pub global_score: f64,
    /// Reading of the score.
    pub verdict: Verdict,
    /// Valuation figures.
    pub valuation: ValuationResult,
    /// Peer medians of the sector's multiples; empty without peers.
    pub peer_medians: Multiples,
    /// Company multiples against peer medians.
    pub peer_comparison: BTreeMap<MultipleKind, PeerComparison>,
}

/// Analyzes a company against optional peers.
#[must_use]
pub fn analyze(
    snapshot: &CompanySnapshot,
    peers: &[CompanySnapshot],
    config: &ValuationConfig,
) -> AnalysisReport {
    let sector = SectorBucket::of(snapshot);
    let profile = sector.profile();
    debug!(symbol = %snapshot.symbol, sector = %sector, peers = peers.len(), "Analyzing company");

    let indicators = Indicators::compute(snapshot, config).restrict(profile.enabled);
    let ratings = rating::rate_indicators(&indicators, profile);
    let global_score = rating::global_score(
        ratings
            .values()
            .map(|rated| (rated.rating, rated.weight)),
    );
    let verdict = Verdict::from_score(global_score);

    let all_multiples = Multiples::compute(snapshot);
    let wacc = dcf::discount_rate(snapshot, config);
    let free_cash_flow = normalize::free_cash_flow(snapshot);
    let dcf_enterprise_value = free_cash_flow.and_then(|fcf| {
        match run_dcf(fcf, wacc, config) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(symbol = %snapshot.symbol, error = %e, "DCF unavailable");
                None
            }
        }
    });
    let intrinsic_price_per_share =
        dcf_enterprise_value.and_then(|ev| dcf::price_per_share(ev, snapshot));

    let medians = peers::peer_medians(peers);
    let multiples_fair_value =
        consolidate::multiples_fair_value(snapshot, &all_multiples, &medians, profile);

    let current_price = snapshot.current_price();
    let fair = consolidate::blend(
        multiples_fair_value,
        intrinsic_price_per_share,
        current_price,
        config,
    );
    let price_position = current_price
        .zip(fair)
        .map(|(price, fair)| PricePosition::locate(price, &fair));

    let peer_comparison = if peers.is_empty() {
        BTreeMap::new()
    } else {
        profile
            .preferred_multiples
            .iter()
            .filter_map(|kind| {
                let comparison = PeerComparison::compare(
                    all_multiples.get(*kind),
                    medians.get(*kind),
                    config.peer_band,
                )?;
                Some((*kind, comparison))
            })
            .collect()
    };
    let peer_medians = if peers.is_empty() {
        Multiples::default()
    } else {
        medians.select(profile.preferred_multiples)
    };

    debug!(
        symbol = %snapshot.symbol,
        score = global_score,
        fair_value = ?fair.map(|f| f.fair_value),
        "Analysis complete"
    );

    AnalysisReport {
        symbol: snapshot.symbol.clone(),
        name: snapshot
            .info
            .first_text(&["longName", "shortName"])
            .map(str::to_string),
        sector,
        sector_note: profile.note.to_string(),
        indicators,
        ratings,
        global_score,
        verdict,
        valuation: ValuationResult {
            multiples: all_multiples.select(profile.preferred_multiples),
            enterprise_value: multiples::snapshot_enterprise_value(snapshot),
            wacc,
            free_cash_flow,
            dcf_enterprise_value,
            intrinsic_price_per_share,
            multiples_fair_value,
            fair_value: fair.map(|f| f.fair_value),
            entry_price: fair.map(|f| f.entry_price),
            current_price,
            price_position,
        },
        peer_medians,
        peer_comparison,
    }
}

/// Two-stage DCF on the configured growth path, or one-stage when the path is
/// empty. Non-positive cash flow is not valued.
fn run_dcf(fcf: f64, wacc: f64, config: &ValuationConfig) -> Result<f64, DcfError> {
    if fcf <= 0.0 {
        return Err(DcfError::NonPositiveCashFlow(fcf));
    }
    if config.forecast_growth.is_empty() {
        dcf::one_stage(fcf, config.terminal_growth, wacc)
    } else {
        dcf::two_stage(fcf, &config.forecast_growth, config.terminal_growth, wacc)
    }
}
