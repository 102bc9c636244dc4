//! Line-item normalization.
//!
//! Providers label the same concept in many ways (`"Total Revenue"`,
//! `"totalRevenue"`, `"Revenues"`). Each [`LineItem`] carries an ordered alias
//! list; the first label present in a table wins. Some concepts also accept a
//! positional fallback column when no alias matches. Nothing here fails: an
//! unknown concept yields an empty series.

use fonda_core::{CompanySnapshot, StatementTable};

/// Positional column used when no alias matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fallback {
    /// No fallback; the concept is missing.
    None,
    /// The first numeric column of the table.
    FirstNumeric,
    /// The last numeric column of the table.
    LastNumeric,
}

/// A financial concept that can be read from a statement table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineItem {
    /// Total revenue (income statement).
    Revenue,
    /// Net income (income statement).
    NetIncome,
    /// Operating income or EBIT (income statement).
    OperatingIncome,
    /// Total assets (balance sheet).
    TotalAssets,
    /// Current liabilities (balance sheet).
    CurrentLiabilities,
    /// Cash and equivalents (balance sheet).
    Cash,
    /// Reported free cash flow (cash-flow statement).
    FreeCashFlow,
    /// Cash from operations (cash-flow statement).
    OperatingCashFlow,
    /// Capital expenditure (cash-flow statement).
    CapitalExpenditure,
}

impl LineItem {
    /// Returns the candidate labels, highest priority first.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Revenue => &["Total Revenue", "Revenue", "totalRevenue", "Net Sales", "Revenues"],
            Self::NetIncome => &[
                "Net Income",
                "Net Income Common Stocks",
                "netIncome",
                "Net Income Applicable To Common Shares",
            ],
            Self::OperatingIncome => &[
                "Operating Income",
                "OperatingIncome",
                "operatingIncome",
                "EBIT",
                "Ebit",
                "ebit",
            ],
            Self::TotalAssets => &["Total Assets", "totalAssets", "Assets"],
            Self::CurrentLiabilities => &[
                "Total Current Liabilities",
                "totalCurrentLiabilities",
                "Total Liab",
                "totalLiab",
            ],
            Self::Cash => &["Cash And Cash Equivalents", "Cash", "cash", "cashAndCashEquivalents"],
            Self::FreeCashFlow => &["Free Cash Flow", "FreeCashFlow", "freeCashflow", "freeCashFlow"],
            Self::OperatingCashFlow => &[
                "Total Cash From Operating Activities",
                "Operating Cash Flow",
                "totalCashFromOperatingActivities",
                "cashFlowFromOperations",
            ],
            Self::CapitalExpenditure => &[
                "Capital Expenditures",
                "Capital Expenditure",
                "capitalExpenditures",
                "Capex",
            ],
        }
    }

    /// Returns the positional fallback for this concept.
    #[must_use]
    pub const fn fallback(self) -> Fallback {
        match self {
            Self::Revenue => Fallback::FirstNumeric,
            Self::NetIncome => Fallback::LastNumeric,
            _ => Fallback::None,
        }
    }

    /// Returns the statement this concept is read from.
    #[must_use]
    pub fn table(self, snapshot: &CompanySnapshot) -> &StatementTable {
        match self {
            Self::Revenue | Self::NetIncome | Self::OperatingIncome => &snapshot.income,
            Self::TotalAssets | Self::CurrentLiabilities | Self::Cash => &snapshot.balance,
            Self::FreeCashFlow | Self::OperatingCashFlow | Self::CapitalExpenditure => {
                &snapshot.cashflow
            }
        }
    }
}

/// Returns the series for the first alias present in `table`, oldest first.
///
/// Falls back to a positional column if the concept allows one, else returns
/// an empty series.
#[must_use]
pub fn extract_series(table: &StatementTable, item: LineItem) -> Vec<f64> {
    let aliased = item
        .aliases()
        .iter()
        .find_map(|label| table.series(label));
    if let Some(series) = aliased {
        return series;
    }
    let positional = match item.fallback() {
        Fallback::None => None,
        Fallback::FirstNumeric => table.first_numeric(),
        Fallback::LastNumeric => table.last_numeric(),
    };
    positional.unwrap_or_default()
}

/// Returns the series of a concept from the statement it belongs to.
#[must_use]
pub fn series(snapshot: &CompanySnapshot, item: LineItem) -> Vec<f64> {
    extract_series(item.table(snapshot), item)
}

/// Returns the most recent value of a concept.
#[must_use]
pub fn latest(snapshot: &CompanySnapshot, item: LineItem) -> Option<f64> {
    series(snapshot, item).last().copied()
}

/// Returns the most recent free cash flow.
///
/// Uses the reported free cash flow line, else operating cash flow minus
/// capital expenditure (sign-agnostic, missing capex counts as zero), else the
/// `freeCashflow` fact.
#[must_use]
pub fn free_cash_flow(snapshot: &CompanySnapshot) -> Option<f64> {
    if let Some(fcf) = latest(snapshot, LineItem::FreeCashFlow) {
        return Some(fcf);
    }
    if let Some(cfo) = latest(snapshot, LineItem::OperatingCashFlow) {
        let capex = latest(snapshot, LineItem::CapitalExpenditure).unwrap_or(0.0);
        return Some(cfo - capex.abs());
    }
    snapshot.info.number("freeCashflow")
}

/// Drops zero-valued periods, which cannot serve as a growth base.
#[must_use]
pub fn drop_zeros(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| *v != 0.0).collect()
}
