//! Missing-value analysis and numeric filling.
//!
//! [`analyze_missing`] and [`recommend`] are pure; rendering the result is
//! left to [`crate::reporting`]. [`fill_numeric_values`] returns a filled
//! copy of the table.

use crate::error::{PrepError, Result};
use crate::utils::{
    ColumnKind, column_kind, columns_of_kind, fill_numeric_nulls, numeric_mode, numeric_values,
    series_of,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::info;

/// Missing-value statistics for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingEntry {
    pub column: String,
    pub missing_count: usize,
    /// Percentage of rows missing (0 - 100).
    pub missing_percentage: f64,
    pub kind: ColumnKind,
}

/// Per-column missing statistics for a table snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    /// Columns with at least one missing value, by descending percentage.
    pub entries: Vec<MissingEntry>,
    pub total_rows: usize,
    pub total_columns: usize,
    /// Total missing cells per column kind.
    pub missing_by_kind: BTreeMap<ColumnKind, usize>,
}

impl MissingReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Percentage of columns that have at least one missing value.
    pub fn columns_with_missing_pct(&self) -> f64 {
        if self.total_columns == 0 {
            0.0
        } else {
            self.entries.len() as f64 * 100.0 / self.total_columns as f64
        }
    }

    pub fn get(&self, column: &str) -> Option<&MissingEntry> {
        self.entries.iter().find(|e| e.column == column)
    }
}

/// Suggested handling derived from a [`MissingReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingRecommendation {
    pub threshold_pct: f64,
    /// Columns above the threshold, with their missing percentage.
    pub drop: Vec<(String, f64)>,
    /// Remaining numeric columns: fill with median or mean.
    pub numeric_fill: Vec<String>,
    /// Remaining text columns: use an "unknown" category or the mode.
    pub categorical_fill: Vec<String>,
}

/// Compute per-column missing statistics.
pub fn analyze_missing(df: &DataFrame) -> MissingReport {
    let total_rows = df.height();
    let mut missing_by_kind = BTreeMap::new();

    let mut entries: Vec<MissingEntry> = df
        .get_columns()
        .iter()
        .filter_map(|col| {
            let missing_count = col.null_count();
            let kind = column_kind(col.dtype());
            *missing_by_kind.entry(kind).or_insert(0) += missing_count;
            if missing_count == 0 {
                return None;
            }
            Some(MissingEntry {
                column: col.name().to_string(),
                missing_count,
                missing_percentage: missing_count as f64 * 100.0 / total_rows as f64,
                kind,
            })
        })
        .collect();

    // stable: ties keep table order
    entries.sort_by(|a, b| b.missing_percentage.total_cmp(&a.missing_percentage));

    MissingReport {
        entries,
        total_rows,
        total_columns: df.width(),
        missing_by_kind,
    }
}

/// Split the report into drop suggestions and fill suggestions.
pub fn recommend(report: &MissingReport, threshold_pct: f64) -> MissingRecommendation {
    let mut drop = Vec::new();
    let mut numeric_fill = Vec::new();
    let mut categorical_fill = Vec::new();

    for entry in &report.entries {
        if entry.missing_percentage > threshold_pct {
            drop.push((entry.column.clone(), entry.missing_percentage));
        } else if entry.kind == ColumnKind::Numeric {
            numeric_fill.push(entry.column.clone());
        } else {
            categorical_fill.push(entry.column.clone());
        }
    }

    MissingRecommendation {
        threshold_pct,
        drop,
        numeric_fill,
        categorical_fill,
    }
}

/// Strategy for [`fill_numeric_values`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum FillStrategy {
    Mean,
    #[default]
    Median,
    /// Most frequent value; ties resolve to the smallest value.
    Mode,
    Constant(f64),
}

impl FillStrategy {
    pub const NAMES: &'static str = "mean, median, mode, constant";

    pub fn name(&self) -> &'static str {
        match self {
            FillStrategy::Mean => "mean",
            FillStrategy::Median => "median",
            FillStrategy::Mode => "mode",
            FillStrategy::Constant(_) => "constant",
        }
    }

    /// Parse a strategy name, using `constant` as the value for `constant`.
    pub fn parse_with_constant(name: &str, constant: f64) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mean" | "media" => Ok(FillStrategy::Mean),
            "median" | "mediana" => Ok(FillStrategy::Median),
            "mode" | "moda" => Ok(FillStrategy::Mode),
            "constant" | "constante" => Ok(FillStrategy::Constant(constant)),
            _ => Err(PrepError::InvalidStrategy {
                name: name.to_string(),
                expected: Self::NAMES.to_string(),
            }),
        }
    }

    fn fill_value(&self, values: &[Option<f64>]) -> Option<f64> {
        match self {
            FillStrategy::Constant(v) => Some(*v),
            FillStrategy::Mode => numeric_mode(values),
            FillStrategy::Mean => values.iter().copied().collect::<Float64Chunked>().mean(),
            FillStrategy::Median => values.iter().copied().collect::<Float64Chunked>().median(),
        }
    }
}

impl FromStr for FillStrategy {
    type Err = PrepError;

    /// `constant` parses to `Constant(0.0)`.
    fn from_str(s: &str) -> Result<Self> {
        Self::parse_with_constant(s, 0.0)
    }
}

/// Fill missing entries of numeric columns.
///
/// `columns` defaults to every numeric column. Columns without missing values
/// are left untouched; filled columns become `Float64`. A column with no
/// observed values keeps its nulls unless the strategy is `Constant`.
pub fn fill_numeric_values(
    df: &DataFrame,
    columns: Option<&[&str]>,
    strategy: FillStrategy,
) -> Result<DataFrame> {
    let targets: Vec<String> = match columns {
        Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
        None => columns_of_kind(df, ColumnKind::Numeric),
    };

    let mut out = df.clone();
    for name in &targets {
        let series = series_of(df, name)?;
        if column_kind(series.dtype()) != ColumnKind::Numeric {
            return Err(PrepError::InvalidConfig(format!(
                "column '{}' is {}, not numeric",
                name,
                series.dtype()
            )));
        }
        if series.null_count() == 0 {
            continue;
        }

        let values = numeric_values(series)?;
        let Some(fill_value) = strategy.fill_value(&values) else {
            info!("Column '{}' has no observed values; left as-is", name);
            continue;
        };

        let filled = fill_numeric_nulls(series, fill_value)?;
        out.replace(name, filled)?;
        info!(
            "Filled {} missing value(s) in '{}' with {} = {:.2}",
            series.null_count(),
            name,
            strategy.name(),
            fill_value
        );
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df![
            "LotFrontage" => [Some(65.0), None, Some(68.0), None, Some(60.0)],
            "GarageYrBlt" => [Some(2003i64), Some(1976), None, Some(1998), Some(2000)],
            "FireplaceQu" => [None, Some("TA"), None, None, Some("Gd")],
            "OverallQual" => [7i64, 6, 7, 7, 8],
        ]
        .unwrap()
    }

    #[test]
    fn test_report_orders_by_descending_percentage() {
        let report = analyze_missing(&sample());

        let columns: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
        assert_eq!(columns, vec!["FireplaceQu", "LotFrontage", "GarageYrBlt"]);
        assert_eq!(report.entries[0].missing_count, 3);
        assert_eq!(report.entries[0].missing_percentage, 60.0);
        assert_eq!(report.total_rows, 5);
        assert_eq!(report.total_columns, 4);
        assert!(report.get("OverallQual").is_none());
        assert_eq!(report.columns_with_missing_pct(), 75.0);
    }

    #[test]
    fn test_missing_by_kind() {
        let report = analyze_missing(&sample());
        assert_eq!(report.missing_by_kind[&ColumnKind::Numeric], 3);
        assert_eq!(report.missing_by_kind[&ColumnKind::Text], 3);
    }

    #[test]
    fn test_recommendation_split() {
        let report = analyze_missing(&sample());
        let rec = recommend(&report, 30.0);

        assert_eq!(rec.drop, vec![("FireplaceQu".to_string(), 60.0), ("LotFrontage".to_string(), 40.0)]);
        assert_eq!(rec.numeric_fill, vec!["GarageYrBlt"]);
        assert!(rec.categorical_fill.is_empty());
    }

    #[test]
    fn test_fill_median_default_columns() {
        let filled = fill_numeric_values(&sample(), None, FillStrategy::Median).unwrap();

        let lot = filled.column("LotFrontage").unwrap();
        assert_eq!(lot.null_count(), 0);
        // median of [65, 68, 60] = 65
        assert_eq!(lot.get(1).unwrap().try_extract::<f64>().unwrap(), 65.0);

        // untouched column keeps its dtype
        assert_eq!(filled.column("OverallQual").unwrap().dtype(), &DataType::Int64);
        // text column is not a target of numeric filling
        assert_eq!(filled.column("FireplaceQu").unwrap().null_count(), 3);
    }

    #[test]
    fn test_fill_mean_and_constant() {
        let df = sample();
        let mean = fill_numeric_values(&df, Some(&["LotFrontage"]), FillStrategy::Mean).unwrap();
        let v = mean.column("LotFrontage").unwrap().get(3).unwrap().try_extract::<f64>().unwrap();
        assert!((v - 64.333_333).abs() < 1e-4);
        // other numeric column not listed, still has its null
        assert_eq!(mean.column("GarageYrBlt").unwrap().null_count(), 1);

        let constant =
            fill_numeric_values(&df, None, FillStrategy::Constant(-1.0)).unwrap();
        let v = constant.column("GarageYrBlt").unwrap().get(2).unwrap().try_extract::<f64>().unwrap();
        assert_eq!(v, -1.0);
    }

    #[test]
    fn test_fill_mode() {
        let df = df!["rooms" => [Some(3.0), Some(4.0), Some(3.0), None]].unwrap();
        let filled = fill_numeric_values(&df, None, FillStrategy::Mode).unwrap();
        assert_eq!(filled.column("rooms").unwrap().get(3).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_bogus_strategy_is_rejected_and_input_untouched() {
        let df = sample();
        let before = df.clone();

        let err = "bogus"
            .parse::<FillStrategy>()
            .and_then(|strategy| fill_numeric_values(&df, None, strategy))
            .unwrap_err();

        assert!(matches!(err, PrepError::InvalidStrategy { ref name, .. } if name == "bogus"));
        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!("median".parse::<FillStrategy>().unwrap(), FillStrategy::Median);
        assert_eq!("MEDIA".parse::<FillStrategy>().unwrap(), FillStrategy::Mean);
        assert_eq!("moda".parse::<FillStrategy>().unwrap(), FillStrategy::Mode);
        assert_eq!(
            FillStrategy::parse_with_constant("constant", 5.0).unwrap(),
            FillStrategy::Constant(5.0)
        );
    }

    #[test]
    fn test_unknown_column() {
        let err = fill_numeric_values(&sample(), Some(&["Nope"]), FillStrategy::Mean).unwrap_err();
        assert!(matches!(err, PrepError::UnknownColumn(_)));
    }
}
