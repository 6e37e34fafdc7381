//! Shared utilities for the preparation toolkit.
//!
//! This module contains the dtype helpers and series conversions used across
//! the classifier, the missing-data policy and the transform pipeline.

use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preparation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Integer or floating point numbers
    Numeric,
    /// Boolean type
    Boolean,
    /// Date or datetime types
    Datetime,
    /// String/categorical text
    Text,
    /// Other/unknown types
    Other,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Datetime => "datetime",
            ColumnKind::Text => "text",
            ColumnKind::Other => "other",
        }
    }
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType holds categorical text.
#[inline]
pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// Get the kind of a DataType.
pub fn column_kind(dtype: &DataType) -> ColumnKind {
    if is_numeric_dtype(dtype) {
        ColumnKind::Numeric
    } else if is_text_dtype(dtype) {
        ColumnKind::Text
    } else if matches!(dtype, DataType::Boolean) {
        ColumnKind::Boolean
    } else if matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    ) {
        ColumnKind::Datetime
    } else {
        ColumnKind::Other
    }
}

/// Names of every column of the given kind, in table order.
pub fn columns_of_kind(df: &DataFrame, kind: ColumnKind) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| column_kind(col.dtype()) == kind)
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Column Access
// =============================================================================

/// Look up a column as a materialized series, mapping absence to `UnknownColumn`.
pub fn series_of<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PrepError::UnknownColumn(name.to_string()))
}

/// Fail with `UnknownColumn` for the first name not present in the table.
pub fn ensure_columns<S: AsRef<str>>(df: &DataFrame, names: &[S]) -> Result<()> {
    for name in names {
        series_of(df, name.as_ref())?;
    }
    Ok(())
}

/// Read a series as `f64` values, keeping nulls.
pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Read a series as text values, keeping nulls.
pub fn text_values(series: &Series) -> Result<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-null numeric value.
///
/// Ties resolve to the smallest of the equally frequent values.
pub fn numeric_mode(values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        return None;
    }
    present.sort_by(|a, b| a.total_cmp(b));

    let mut best = present[0];
    let mut best_count = 0usize;
    let mut run_start = 0usize;
    for i in 1..=present.len() {
        if i == present.len() || present[i].total_cmp(&present[run_start]).is_ne() {
            let count = i - run_start;
            if count > best_count {
                best = present[run_start];
                best_count = count;
            }
            run_start = i;
        }
    }
    Some(best)
}

/// Most frequent non-null text value.
///
/// Ties resolve to the lexicographically smallest value.
pub fn text_mode(values: &[Option<String>]) -> Option<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in values.iter().flatten() {
        *counts.entry(val.as_str()).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (val, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }
    best.map(|(val, _)| val.to_string())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> Result<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// JSON has no NaN: serde_json writes it as `null`. Read `null` back as NaN.
pub(crate) fn null_as_nan<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// [`null_as_nan`] for every cell of a matrix.
pub(crate) fn null_as_nan_matrix<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<Vec<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let rows = Vec::<Vec<Option<f64>>>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
        .collect())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_kind() {
        assert_eq!(column_kind(&DataType::Int64), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::Float64), ColumnKind::Numeric);
        assert_eq!(column_kind(&DataType::String), ColumnKind::Text);
        assert_eq!(column_kind(&DataType::Boolean), ColumnKind::Boolean);
        assert_eq!(column_kind(&DataType::Date), ColumnKind::Datetime);
    }

    #[test]
    fn test_columns_of_kind_keeps_table_order() {
        let df = df![
            "b" => [1i64, 2],
            "name" => ["x", "y"],
            "a" => [1.5, 2.5],
        ]
        .unwrap();

        assert_eq!(columns_of_kind(&df, ColumnKind::Numeric), vec!["b", "a"]);
        assert_eq!(columns_of_kind(&df, ColumnKind::Text), vec!["name"]);
    }

    #[test]
    fn test_series_of_unknown_column() {
        let df = df!["a" => [1i64]].unwrap();
        let err = series_of(&df, "missing").unwrap_err();
        assert!(matches!(err, PrepError::UnknownColumn(name) if name == "missing"));
    }

    #[test]
    fn test_numeric_mode_tie_takes_smallest() {
        let values = [Some(3.0), Some(1.0), Some(3.0), Some(1.0), None];
        assert_eq!(numeric_mode(&values), Some(1.0));

        let values = [Some(2.0), Some(5.0), Some(5.0)];
        assert_eq!(numeric_mode(&values), Some(5.0));

        assert_eq!(numeric_mode(&[None, None]), None);
    }

    #[test]
    fn test_text_mode() {
        let values: Vec<Option<String>> = ["b", "a", "b", "c"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(text_mode(&values), Some("b".to_string()));

        let tie = vec![Some("z".to_string()), Some("y".to_string())];
        assert_eq!(text_mode(&tie), Some("y".to_string()));
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1i64), None, Some(3)]);
        let filled = fill_numeric_nulls(&series, 0.5).unwrap();

        assert_eq!(filled.dtype(), &DataType::Float64);
        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.5);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }
}
