//! Plain-text renderings of analysis and evaluation results.
//!
//! Every function returns a `String`; printing is up to the caller.

use crate::eda::{CorrelationMatrix, DatasetOverview, NumericSummary};
use crate::evaluation::{MetricsReport, ResidualDiagnostics};
use crate::missing::{MissingRecommendation, MissingReport};
use std::fmt::Write;

/// Width of section banners.
const BANNER_WIDTH: usize = 50;

/// Width of the longest bar in text charts.
const BAR_WIDTH: usize = 40;

/// Default percentage below which columns are left out of the missing chart.
pub const DEFAULT_CHART_FLOOR_PCT: f64 = 5.0;

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(BANNER_WIDTH);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{rule}");
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.min(BAR_WIDTH))
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

/// Missing-value table, a bar chart of columns above `chart_floor_pct`, and
/// the recommendation.
pub fn render_missing_report(
    report: &MissingReport,
    recommendation: &MissingRecommendation,
    chart_floor_pct: f64,
) -> String {
    let mut out = String::new();
    banner(&mut out, "MISSING VALUE ANALYSIS");

    if report.is_empty() {
        let _ = writeln!(out, "No missing values in {} rows.", report.total_rows);
        return out;
    }

    let _ = writeln!(
        out,
        "{} of {} columns have missing values ({:.1}%)",
        report.entries.len(),
        report.total_columns,
        report.columns_with_missing_pct()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<24} {:>10} {:>10}  {}", "column", "missing", "percent", "kind");
    for entry in &report.entries {
        let _ = writeln!(
            out,
            "{:<24} {:>10} {:>9.2}%  {}",
            entry.column,
            entry.missing_count,
            entry.missing_percentage,
            entry.kind.as_str()
        );
    }

    let charted: Vec<_> = report
        .entries
        .iter()
        .filter(|e| e.missing_percentage > chart_floor_pct)
        .collect();
    if !charted.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Columns above {chart_floor_pct:.0}% missing:");
        for entry in charted {
            let _ = writeln!(
                out,
                "{:<24} {:<width$} {:.1}%",
                entry.column,
                bar(entry.missing_percentage, 100.0),
                entry.missing_percentage,
                width = BAR_WIDTH
            );
        }
    }

    if !report.missing_by_kind.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Missing cells by kind:");
        for (kind, count) in &report.missing_by_kind {
            let _ = writeln!(out, "  {:<10} {}", kind.as_str(), count);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Recommendations:");
    if !recommendation.drop.is_empty() {
        let _ = writeln!(
            out,
            "  Consider dropping ({:.0}%+ missing):",
            recommendation.threshold_pct
        );
        for (column, pct) in &recommendation.drop {
            let _ = writeln!(out, "    - {column}: {pct:.1}%");
        }
    }
    if !recommendation.numeric_fill.is_empty() {
        let _ = writeln!(
            out,
            "  Fill numeric with median or mean: {}",
            recommendation.numeric_fill.join(", ")
        );
    }
    if !recommendation.categorical_fill.is_empty() {
        let _ = writeln!(
            out,
            "  Fill categorical with 'unknown' or the mode: {}",
            recommendation.categorical_fill.join(", ")
        );
    }
    out
}

pub fn render_overview(overview: &DatasetOverview) -> String {
    let mut out = String::new();
    banner(&mut out, "DATASET OVERVIEW");
    let _ = writeln!(out, "Shape: {} rows x {} columns", overview.rows, overview.columns);
    let _ = writeln!(out);
    let _ = writeln!(out, "Column types:");
    for (dtype, count) in &overview.dtype_counts {
        let _ = writeln!(out, "  {dtype:<12} {count}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "First rows:");
    let _ = writeln!(out, "{}", overview.head);
    out
}

pub fn render_numeric_summary(summaries: &[NumericSummary]) -> String {
    let mut out = String::new();
    banner(&mut out, "NUMERIC DISTRIBUTIONS");
    let _ = writeln!(
        out,
        "{:<20} {:>7} {:>7} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "column", "count", "missing", "mean", "std", "min", "median", "max"
    );
    for s in summaries {
        let _ = writeln!(
            out,
            "{:<20} {:>7} {:>7} {:>12} {:>12} {:>12} {:>12} {:>12}",
            s.column,
            s.count,
            s.missing,
            fmt_opt(s.mean),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.median),
            fmt_opt(s.max)
        );
    }
    out
}

pub fn render_correlation(matrix: &CorrelationMatrix) -> String {
    let mut out = String::new();
    banner(
        &mut out,
        &format!("CORRELATION MATRIX ({})", matrix.method.name()),
    );
    let _ = write!(out, "{:<16}", "");
    for name in &matrix.columns {
        let _ = write!(out, " {:>10.10}", name);
    }
    let _ = writeln!(out);
    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        let _ = write!(out, "{:<16.16}", name);
        for v in row {
            let _ = write!(out, " {v:>10.3}");
        }
        let _ = writeln!(out);
    }
    out
}

/// Metrics block with four decimals.
pub fn render_metrics(report: &MetricsReport, model_name: &str) -> String {
    let mut out = String::new();
    banner(&mut out, &format!("Evaluation: {model_name}"));
    for (name, value) in report.metrics() {
        let _ = writeln!(out, "{name:<6}: {value:.4}");
    }
    let _ = writeln!(out, "{}", "=".repeat(BANNER_WIDTH));
    out
}

/// Residual statistics and a horizontal histogram.
pub fn render_residuals(diagnostics: &ResidualDiagnostics, model_name: &str) -> String {
    let mut out = String::new();
    banner(&mut out, &format!("Residuals: {model_name}"));
    let _ = writeln!(
        out,
        "n={}  mean={:.4}  std={:.4}  min={:.4}  max={:.4}",
        diagnostics.residuals.len(),
        diagnostics.mean,
        diagnostics.std,
        diagnostics.min,
        diagnostics.max
    );

    let peak = diagnostics
        .histogram
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0) as f64;
    for bin in &diagnostics.histogram {
        let _ = writeln!(
            out,
            "[{:>10.4}, {:>10.4}) {:>5} {}",
            bin.lower,
            bin.upper,
            bin.count,
            bar(bin.count as f64, peak)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{evaluate, residual_diagnostics};
    use crate::missing::{analyze_missing, recommend};
    use polars::prelude::*;

    #[test]
    fn test_metrics_block() {
        let report = evaluate(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]).unwrap();
        let text = render_metrics(&report, "LinearRegression");

        assert!(text.starts_with(&"=".repeat(50)));
        assert!(text.contains("Evaluation: LinearRegression"));
        assert!(text.contains("MSE   : 0.3750"));
        assert!(text.contains("RMSE  : 0.6124"));
        assert!(text.contains("MAE   : 0.5000"));
        assert!(text.contains("R²    : 0.9486"));
    }

    #[test]
    fn test_nan_r2_is_rendered() {
        let report = evaluate(&[1.0, 1.0], &[1.0, 2.0]).unwrap();
        assert!(render_metrics(&report, "m").contains("NaN"));
    }

    #[test]
    fn test_missing_report_sections() {
        let df = df![
            "PoolQC" => [None, None, None, Some("Ex")],
            "LotFrontage" => [Some(1.0), None, Some(2.0), Some(3.0)],
            "Id" => [1i64, 2, 3, 4],
        ]
        .unwrap();
        let report = analyze_missing(&df);
        let rec = recommend(&report, 30.0);
        let text = render_missing_report(&report, &rec, DEFAULT_CHART_FLOOR_PCT);

        assert!(text.contains("2 of 3 columns"));
        assert!(text.contains("- PoolQC: 75.0%"));
        assert!(text.contains("Fill numeric with median or mean: LotFrontage"));
    }

    #[test]
    fn test_no_missing() {
        let df = df!["a" => [1i64, 2]].unwrap();
        let report = analyze_missing(&df);
        let text = render_missing_report(&report, &recommend(&report, 30.0), 5.0);
        assert!(text.contains("No missing values"));
    }

    #[test]
    fn test_residual_histogram_lines() {
        let report = evaluate(&[1.0, 2.0, 3.0, 4.0], &[1.5, 2.0, 2.5, 4.0]).unwrap();
        let text = render_residuals(&residual_diagnostics(&report, 3), "ols");
        assert_eq!(text.lines().filter(|l| l.starts_with('[')).count(), 3);
    }
}
