#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fondawork/fonda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Fundamental analysis facade.
//!
//! This crate re-exports the core types and the valuation engine, and provides
//! a [`ProviderRegistry`] for managing snapshot providers and ticker resolvers
//! with automatic fallback, plus the [`FundamentalAnalyzer`] that drives a
//! full run.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance snapshot provider and ticker resolver

// Core types and traits
pub use fonda_core::*;

// Valuation engine
pub use fonda_valuation as valuation;
pub use fonda_valuation::{
    AnalysisReport, FairValue, IndicatorKind, Indicators, MultipleKind, Multiples,
    PeerComparison, PricePosition, Rating, SectorBucket, SectorProfile, ValuationConfig,
    ValuationResult, Verdict,
};

// Providers
#[cfg(feature = "yahoo")]
pub use fonda_yahoo::{YahooProvider, YahooTickerResolver};

mod analyzer;
mod registry;
pub use analyzer::FundamentalAnalyzer;
pub use registry::ProviderRegistry;
