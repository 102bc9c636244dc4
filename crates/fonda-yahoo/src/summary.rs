//! Quote summary payload parsing.
//!
//! Yahoo wraps most numbers as `{"raw": 1.5, "fmt": "1.50"}`. Scalar modules
//! are flattened into [`Facts`]; statement history modules become one
//! [`StatementTable`] each, keyed by the `endDate` of every reported period.

use chrono::{DateTime, NaiveDate};
use fonda_core::{
    CompanySnapshot, FactValue, Facts, FondaError, PeriodType, Result, StatementTable, Symbol,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Scalar modules, highest priority first. A field keeps the value of the
/// first module that reports it.
pub(crate) const FACT_MODULES: &[&str] = &[
    "price",
    "financialData",
    "defaultKeyStatistics",
    "summaryDetail",
    "assetProfile",
];

/// Bookkeeping fields present in every module.
const SKIPPED_FIELDS: &[&str] = &["maxAge", "endDate"];

/// One of the three financial statements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Statement {
    Income,
    Balance,
    Cashflow,
}

impl Statement {
    pub(crate) const ALL: [Self; 3] = [Self::Income, Self::Balance, Self::Cashflow];

    /// The quote summary module holding this statement's history.
    pub(crate) const fn module(self, period: PeriodType) -> &'static str {
        match (self, period) {
            (Self::Income, PeriodType::Annual) => "incomeStatementHistory",
            (Self::Income, PeriodType::Quarterly) => "incomeStatementHistoryQuarterly",
            (Self::Balance, PeriodType::Annual) => "balanceSheetHistory",
            (Self::Balance, PeriodType::Quarterly) => "balanceSheetHistoryQuarterly",
            (Self::Cashflow, PeriodType::Annual) => "cashflowStatementHistory",
            (Self::Cashflow, PeriodType::Quarterly) => "cashflowStatementHistoryQuarterly",
        }
    }

    /// The array field inside the module.
    const fn rows_key(self) -> &'static str {
        match self {
            Self::Income => "incomeStatementHistory",
            Self::Balance => "balanceSheetStatements",
            Self::Cashflow => "cashflowStatements",
        }
    }
}

/// Comma-separated module list for a request.
pub(crate) fn modules_param(period: PeriodType) -> String {
    FACT_MODULES
        .iter()
        .copied()
        .chain(Statement::ALL.iter().map(|statement| statement.module(period)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote summary API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteSummaryResponse {
    pub(crate) quote_summary: QuoteSummaryResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteSummaryResult {
    #[serde(default)]
    pub(crate) result: Option<Vec<Map<String, Value>>>,
    #[serde(default)]
    pub(crate) error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) description: String,
}

/// Turns a quote summary response into a snapshot.
pub(crate) fn parse_snapshot(
    symbol: &Symbol,
    response: QuoteSummaryResponse,
    period: PeriodType,
) -> Result<CompanySnapshot> {
    let summary = response.quote_summary;
    if let Some(error) = summary.error {
        if error.code == "Not Found" {
            return Err(FondaError::SymbolNotFound(symbol.to_string()));
        }
        return Err(FondaError::Other(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let modules = summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FondaError::SymbolNotFound(symbol.to_string()))?;

    Ok(CompanySnapshot::new(symbol.clone())
        .with_info(parse_facts(&modules))
        .with_income(parse_statement(&modules, Statement::Income, period)?)
        .with_balance(parse_statement(&modules, Statement::Balance, period)?)
        .with_cashflow(parse_statement(&modules, Statement::Cashflow, period)?))
}

/// Flattens the scalar modules into facts.
pub(crate) fn parse_facts(modules: &Map<String, Value>) -> Facts {
    let mut facts = Facts::new();
    for name in FACT_MODULES {
        let Some(fields) = modules.get(*name).and_then(Value::as_object) else {
            continue;
        };
        for (key, value) in fields {
            if SKIPPED_FIELDS.contains(&key.as_str()) || facts.contains(key) {
                continue;
            }
            if let Some(fact) = fact_value(value) {
                facts.insert(key.as_str(), fact);
            }
        }
    }
    facts
}

/// Builds one statement table from its history module.
pub(crate) fn parse_statement(
    modules: &Map<String, Value>,
    statement: Statement,
    period: PeriodType,
) -> Result<StatementTable> {
    let rows = modules
        .get(statement.module(period))
        .and_then(|module| module.get(statement.rows_key()))
        .and_then(Value::as_array);
    let Some(rows) = rows else {
        return Ok(StatementTable::empty());
    };

    let mut builder = StatementTable::builder();
    for row in rows {
        let Some(fields) = row.as_object() else {
            continue;
        };
        let Some(date) = fields.get("endDate").and_then(end_date) else {
            continue;
        };
        for (label, value) in fields {
            if SKIPPED_FIELDS.contains(&label.as_str()) {
                continue;
            }
            if let Some(number) = raw_number(value) {
                builder.insert(date, label.as_str(), number);
            }
        }
    }
    builder.build()
}

fn fact_value(value: &Value) -> Option<FactValue> {
    match value {
        Value::String(text) if !text.is_empty() => Some(FactValue::Text(text.clone())),
        _ => raw_number(value).map(FactValue::Number),
    }
}

fn raw_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(wrapped) => wrapped.get("raw").and_then(Value::as_f64),
        _ => None,
    }
}

fn end_date(value: &Value) -> Option<NaiveDate> {
    let formatted = value
        .get("fmt")
        .and_then(Value::as_str)
        .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok());
    if formatted.is_some() {
        return formatted;
    }
    let seconds = value.get("raw").unwrap_or(value).as_i64()?;
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}
