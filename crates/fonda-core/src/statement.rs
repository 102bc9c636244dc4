//! Financial statement tables.
//!
//! A [`StatementTable`] holds one financial statement (income, balance sheet or
//! cash flow) as a polars [`DataFrame`]: one `Float64` column per line item and
//! one row per reporting period. Periods are always stored in chronological
//! order, oldest first, regardless of the order the provider returned them in.
//!
//! Line-item labels are whatever the provider used (`"Total Revenue"`,
//! `"totalRevenue"`, ...). Resolving those spellings to a financial concept is
//! the job of the normalizer in the valuation engine, not of this type.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{FondaError, Result};

/// A period-indexed financial statement.
#[derive(Clone, Debug)]
pub struct StatementTable {
    periods: Vec<NaiveDate>,
    frame: DataFrame,
}

impl Default for StatementTable {
    fn default() -> Self {
        Self::empty()
    }
}

impl StatementTable {
    /// Creates a table with no periods and no line items.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            periods: Vec::new(),
            frame: DataFrame::empty(),
        }
    }

    /// Starts building a table.
    #[must_use]
    pub fn builder() -> StatementTableBuilder {
        StatementTableBuilder::default()
    }

    /// Returns true if the table has no usable data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.frame.width() == 0
    }

    /// Returns the reporting periods, oldest first.
    #[must_use]
    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    /// Returns the line-item labels in the order they were first seen.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.as_str().to_string())
            .collect()
    }

    /// Returns true if a line item with exactly this label exists.
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.frame.column(label).is_ok()
    }

    /// Returns the underlying data frame.
    #[must_use]
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Returns the non-missing values of a line item, oldest first.
    ///
    /// Returns `None` if the label does not exist. Periods where the line item
    /// was not reported are skipped.
    #[must_use]
    pub fn series(&self, label: &str) -> Option<Vec<f64>> {
        let column = self.frame.column(label).ok()?;
        Self::column_values(column)
    }

    /// Returns the most recent reported value of a line item.
    #[must_use]
    pub fn latest(&self, label: &str) -> Option<f64> {
        self.series(label).and_then(|values| values.last().copied())
    }

    /// Returns the values of the first numeric column, oldest first.
    #[must_use]
    pub fn first_numeric(&self) -> Option<Vec<f64>> {
        self.frame
            .get_columns()
            .iter()
            .find(|column| matches!(column.dtype(), DataType::Float64))
            .and_then(Self::column_values)
    }

    /// Returns the values of the last numeric column, oldest first.
    #[must_use]
    pub fn last_numeric(&self) -> Option<Vec<f64>> {
        self.frame
            .get_columns()
            .iter()
            .rev()
            .find(|column| matches!(column.dtype(), DataType::Float64))
            .and_then(Self::column_values)
    }

    fn column_values(column: &Column) -> Option<Vec<f64>> {
        let values = column.f64().ok()?;
        Some(
            values
                .into_iter()
                .flatten()
                .filter(|value| value.is_finite())
                .collect(),
        )
    }
}

/// Incremental builder for [`StatementTable`].
///
/// Values may be inserted in any order; the built table sorts periods
/// chronologically and keeps line-item columns in first-seen order.
/// Non-finite values are treated as not reported.
#[derive(Debug, Default)]
pub struct StatementTableBuilder {
    labels: Vec<String>,
    rows: BTreeMap<NaiveDate, HashMap<String, f64>>,
}

impl StatementTableBuilder {
    /// Records a line-item value for a period.
    pub fn insert(&mut self, period: NaiveDate, label: impl Into<String>, value: f64) -> &mut Self {
        let label = label.into();
        if !value.is_finite() || label.trim().is_empty() {
            return self;
        }
        if !self.labels.contains(&label) {
            self.labels.push(label.clone());
        }
        self.rows.entry(period).or_default().insert(label, value);
        self
    }

    /// Records a line-item value for a period, builder style.
    #[must_use]
    pub fn with_value(mut self, period: NaiveDate, label: impl Into<String>, value: f64) -> Self {
        self.insert(period, label, value);
        self
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds the table.
    pub fn build(self) -> Result<StatementTable> {
        if self.labels.is_empty() {
            return Ok(StatementTable::empty());
        }

        let periods: Vec<NaiveDate> = self.rows.keys().copied().collect();
        let columns: Vec<Column> = self
            .labels
            .iter()
            .map(|label| {
                let values: Vec<Option<f64>> = self
                    .rows
                    .values()
                    .map(|row| row.get(label).copied())
                    .collect();
                Column::new(label.as_str().into(), values)
            })
            .collect();

        let frame = DataFrame::new(columns).map_err(|e| FondaError::Parse(e.to_string()))?;

        Ok(StatementTable { periods, frame })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap()
    }

    #[test]
    fn test_periods_are_sorted_oldest_first() {
        let table = StatementTable::builder()
            .with_value(date(2023), "Total Revenue", 300.0)
            .with_value(date(2021), "Total Revenue", 100.0)
            .with_value(date(2022), "Total Revenue", 200.0)
            .build()
            .unwrap();

        assert_eq!(table.periods(), &[date(2021), date(2022), date(2023)]);
        assert_eq!(table.series("Total Revenue").unwrap(), vec![100.0, 200.0, 300.0]);
        assert_eq!(table.latest("Total Revenue"), Some(300.0));
    }

    #[test]
    fn test_missing_cells_are_skipped() {
        let table = StatementTable::builder()
            .with_value(date(2021), "Total Revenue", 100.0)
            .with_value(date(2022), "Net Income", 10.0)
            .with_value(date(2023), "Total Revenue", 120.0)
            .with_value(date(2023), "Net Income", f64::NAN)
            .build()
            .unwrap();

        assert_eq!(table.series("Total Revenue").unwrap(), vec![100.0, 120.0]);
        assert_eq!(table.series("Net Income").unwrap(), vec![10.0]);
        assert!(table.series("Revenue").is_none());
    }

    #[test]
    fn test_numeric_fallback_columns() {
        let table = StatementTable::builder()
            .with_value(date(2022), "Sales", 50.0)
            .with_value(date(2022), "Earnings", 5.0)
            .with_value(date(2023), "Sales", 60.0)
            .with_value(date(2023), "Earnings", 6.0)
            .build()
            .unwrap();

        assert_eq!(table.labels(), vec!["Sales", "Earnings"]);
        assert_eq!(table.first_numeric().unwrap(), vec![50.0, 60.0]);
        assert_eq!(table.last_numeric().unwrap(), vec![5.0, 6.0]);
    }

    #[test]
    fn test_empty_table() {
        let table = StatementTable::builder().build().unwrap();
        assert!(table.is_empty());
        assert!(table.first_numeric().is_none());
        assert!(StatementTable::default().is_empty());
    }
}
