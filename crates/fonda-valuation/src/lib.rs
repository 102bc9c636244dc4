#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fondawork/fonda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The analysis pipeline.
pub mod analysis;
/// Valuation parameters.
pub mod config;
/// Fair value consolidation.
pub mod consolidate;
/// Discounted cash flow.
pub mod dcf;
/// Fundamental indicators.
pub mod indicators;
/// Enterprise value and valuation multiples.
pub mod multiples;
/// Line-item normalization.
pub mod normalize;
/// Peer aggregation.
pub mod peers;
/// Ratings, global score and verdict.
pub mod rating;
/// Sector classification and sector profiles.
pub mod sector;

pub use analysis::{AnalysisReport, ValuationResult, analyze};
pub use config::ValuationConfig;
pub use consolidate::{FairValue, PricePosition};
pub use dcf::DcfError;
pub use indicators::{IndicatorKind, Indicators};
pub use multiples::{MultipleKind, Multiples};
pub use rating::{PeerComparison, RatedIndicator, Rating, Threshold, Verdict};
pub use sector::{SectorBucket, SectorProfile};
