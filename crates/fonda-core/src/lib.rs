#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/fondawork/fonda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for fundamental data providers.
//!
//! This crate provides the foundational abstractions shared by the analysis engine
//! and the data sources:
//!
//! - [`CompanySnapshot`](snapshot::CompanySnapshot) - Facts and statements for one company
//! - [`StatementTable`](statement::StatementTable) - Period-indexed financial statement
//! - [`SnapshotProvider`](provider::SnapshotProvider) - Fetches company snapshots
//! - [`TickerResolver`](provider::TickerResolver) - Resolves free text to a ticker symbol
//! - [`StaticProvider`](memory::StaticProvider) - In-memory provider for offline use

/// Error types for data operations.
pub mod error;
/// In-memory snapshot provider.
pub mod memory;
/// Statement period definitions.
pub mod period;
/// Provider traits for fetching company data.
pub mod provider;
/// Company snapshot and its JSON file format.
pub mod snapshot;
/// Financial statement tables.
pub mod statement;
/// Core data types (Symbol, Facts).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FondaError, Result};
pub use memory::StaticProvider;
pub use period::PeriodType;
pub use provider::{DataProvider, SnapshotProvider, TickerResolver};
pub use snapshot::CompanySnapshot;
pub use statement::{StatementTable, StatementTableBuilder};
pub use types::{FactValue, Facts, Symbol};
