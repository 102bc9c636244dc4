//! Plain-text rendering of an analysis report.

use std::fmt;

use fonda::AnalysisReport;

const LABEL_WIDTH: usize = 24;

/// Displays a report as a terminal-friendly text block.
pub(crate) struct TextReport<'a>(pub(crate) &'a AnalysisReport);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;

        match &report.name {
            Some(name) => writeln!(f, "{name} ({})", report.symbol)?,
            None => writeln!(f, "{}", report.symbol)?,
        }
        writeln!(f, "Sector: {}", report.sector.as_str())?;
        if !report.sector_note.is_empty() {
            writeln!(f, "  {}", report.sector_note)?;
        }

        writeln!(f, "\nIndicators")?;
        for (kind, value) in report.indicators.iter() {
            let rating = report
                .ratings
                .get(&kind)
                .map_or("", |rated| rated.rating.label());
            writeln!(
                f,
                "  {:<LABEL_WIDTH$}{:>12}  {rating}",
                kind.label(),
                percent(value)
            )?;
        }
        writeln!(f, "\nGlobal score: {:.1} / 100", report.global_score)?;
        writeln!(f, "Verdict: {}", report.verdict.text())?;

        let valuation = &report.valuation;
        writeln!(f, "\nValuation")?;
        row(f, "Current price", amount(valuation.current_price))?;
        row(f, "Enterprise value", amount(valuation.enterprise_value))?;
        row(f, "WACC", percent(Some(valuation.wacc * 100.0)))?;
        for (kind, value) in valuation.multiples.iter() {
            row(f, kind.label(), amount(value))?;
        }
        row(f, "Free cash flow", amount(valuation.free_cash_flow))?;
        row(f, "DCF value per share", amount(valuation.intrinsic_price_per_share))?;
        row(f, "Multiples fair value", amount(valuation.multiples_fair_value))?;
        row(f, "Fair value", amount(valuation.fair_value))?;
        row(f, "Entry price", amount(valuation.entry_price))?;
        row(
            f,
            "Position",
            valuation
                .price_position
                .map_or_else(|| "n/a".to_string(), |p| p.label().to_string()),
        )?;

        if !report.peer_medians.is_empty() {
            writeln!(f, "\nPeers (median)")?;
            for (kind, median) in report.peer_medians.iter() {
                let comparison = report
                    .peer_comparison
                    .get(&kind)
                    .map_or("", |c| c.label());
                writeln!(
                    f,
                    "  {:<LABEL_WIDTH$}{:>12}  {comparison}",
                    kind.label(),
                    amount(median)
                )?;
            }
        }
        Ok(())
    }
}

fn row(f: &mut fmt::Formatter<'_>, label: &str, value: String) -> fmt::Result {
    writeln!(f, "  {label:<LABEL_WIDTH$}{value:>12}")
}

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2} %"))
}
