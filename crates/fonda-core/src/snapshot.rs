//! Company snapshot and its JSON file format.
//!
//! A [`CompanySnapshot`] is the input to one analysis run. Snapshots can be
//! fetched from a provider or loaded from a JSON file of the form:
//!
//! ```json
//! {
//!   "symbol": "MC.PA",
//!   "info": { "currentPrice": 640.5, "sector": "Consumer Cyclical" },
//!   "income": { "2023-12-31": { "Total Revenue": 86153000000 } },
//!   "balance": { "2023-12-31": { "Total Assets": 143455000000 } },
//!   "cashflow": { "2023-12-31": { "Free Cash Flow": 8101000000 } }
//! }
//! ```
//!
//! Every section is optional. Period keys may carry a time suffix
//! (`"2023-12-31 00:00:00"`); only the date part is used. Values that are not
//! numbers (null, booleans, nested objects) are ignored.

use chrono::NaiveDate;
use serde_json::Value;
use std::path::Path;

use crate::{
    error::{FondaError, Result},
    statement::{StatementTable, StatementTableBuilder},
    types::{FactValue, Facts, Symbol},
};

/// Price fields, in lookup order.
const PRICE_KEYS: &[&str] = &["currentPrice", "regularMarketPrice"];

/// Everything known about one company at analysis time.
#[derive(Clone, Debug, Default)]
pub struct CompanySnapshot {
    /// The ticker symbol.
    pub symbol: Symbol,
    /// Scalar facts (price, market cap, ratios, sector, ...).
    pub info: Facts,
    /// Income statement.
    pub income: StatementTable,
    /// Balance sheet.
    pub balance: StatementTable,
    /// Cash-flow statement.
    pub cashflow: StatementTable,
}

impl CompanySnapshot {
    /// Creates an empty snapshot for a symbol.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Sets the scalar facts.
    #[must_use]
    pub fn with_info(mut self, info: Facts) -> Self {
        self.info = info;
        self
    }

    /// Sets the income statement.
    #[must_use]
    pub fn with_income(mut self, income: StatementTable) -> Self {
        self.income = income;
        self
    }

    /// Sets the balance sheet.
    #[must_use]
    pub fn with_balance(mut self, balance: StatementTable) -> Self {
        self.balance = balance;
        self
    }

    /// Sets the cash-flow statement.
    #[must_use]
    pub fn with_cashflow(mut self, cashflow: StatementTable) -> Self {
        self.cashflow = cashflow;
        self
    }

    /// Returns the current share price, if positive.
    #[must_use]
    pub fn current_price(&self) -> Option<f64> {
        self.info.first_positive(PRICE_KEYS)
    }

    /// Returns the market capitalisation, if positive.
    #[must_use]
    pub fn market_cap(&self) -> Option<f64> {
        self.info.first_positive(&["marketCap"])
    }

    /// Returns true if the snapshot has a market cap or a current price.
    #[must_use]
    pub fn has_market_data(&self) -> bool {
        self.market_cap().is_some() || self.current_price().is_some()
    }

    /// Parses a snapshot from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| FondaError::Parse(e.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Loads a snapshot from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FondaError::Parse(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Builds a snapshot from a parsed JSON document.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| FondaError::Parse("snapshot must be a JSON object".to_string()))?;

        let symbol = root
            .get("symbol")
            .and_then(Value::as_str)
            .map(Symbol::new)
            .ok_or_else(|| FondaError::Parse("snapshot is missing \"symbol\"".to_string()))?;

        let info = root.get("info").map(parse_facts).unwrap_or_default();

        Ok(Self {
            symbol,
            info,
            income: parse_statement(root.get("income"))?,
            balance: parse_statement(root.get("balance"))?,
            cashflow: parse_statement(root.get("cashflow"))?,
        })
    }
}

fn parse_facts(value: &Value) -> Facts {
    let Some(map) = value.as_object() else {
        return Facts::new();
    };
    map.iter()
        .filter_map(|(key, value)| {
            let fact = match value {
                Value::Number(n) => FactValue::Number(n.as_f64()?),
                Value::String(s) => FactValue::Text(s.clone()),
                _ => return None,
            };
            Some((key.clone(), fact))
        })
        .collect()
}

fn parse_statement(value: Option<&Value>) -> Result<StatementTable> {
    let Some(periods) = value.and_then(Value::as_object) else {
        return Ok(StatementTable::empty());
    };

    let mut builder = StatementTableBuilder::default();
    for (period, items) in periods {
        let date = parse_period(period)?;
        let Some(items) = items.as_object() else {
            continue;
        };
        for (label, value) in items {
            if let Some(number) = value.as_f64() {
                builder.insert(date, label.as_str(), number);
            }
        }
    }
    builder.build()
}

fn parse_period(text: &str) -> Result<NaiveDate> {
    let date_part = text.trim().get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| FondaError::Parse(format!("invalid period '{text}': {e}")))
}
