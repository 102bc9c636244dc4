//! Statement period definitions.
//!
//! This module defines [`PeriodType`], the reporting cadence a provider should
//! use when fetching financial statements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FondaError;

/// Period type for fundamental financial data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarterly,
}

impl PeriodType {
    /// Returns the lowercase name of this period type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = FondaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "yearly" | "a" => Ok(Self::Annual),
            "quarterly" | "quarter" | "q" => Ok(Self::Quarterly),
            other => Err(FondaError::InvalidParameter(format!(
                "Unknown period type: {other}. Supported: annual, quarterly"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_period_type() {
        assert_eq!("annual".parse::<PeriodType>().unwrap(), PeriodType::Annual);
        assert_eq!(" Quarter ".parse::<PeriodType>().unwrap(), PeriodType::Quarterly);
        assert!("weekly".parse::<PeriodType>().is_err());
    }

    #[test]
    fn test_default_is_annual() {
        assert_eq!(PeriodType::default(), PeriodType::Annual);
        assert_eq!(PeriodType::Quarterly.to_string(), "quarterly");
    }
}
