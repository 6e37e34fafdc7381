//! Column classification and high-missing column removal.
//!
//! Splits a table's columns into numeric and categorical feature sets by
//! dtype, keeps the target out of both, and optionally drops columns that
//! are mostly empty.

use crate::config::DEFAULT_MISSING_THRESHOLD;
use crate::error::Result;
use crate::utils::{ColumnKind, column_kind, columns_of_kind};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Role a column plays in the feature pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Target,
    /// Neither numeric nor text (booleans, dates, ...).
    Excluded,
}

/// A cleaned copy of a table plus its feature lists.
#[derive(Debug, Clone)]
pub struct ClassifiedTable {
    pub table: DataFrame,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    /// Columns removed for exceeding the missing threshold.
    pub dropped: Vec<String>,
}

/// Options for [`preprocess_data`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifyOptions {
    pub drop_high_missing: bool,
    pub missing_threshold: f64,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            drop_high_missing: true,
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
        }
    }
}

/// Fraction of missing values per column, in table order.
pub fn missing_fractions(df: &DataFrame) -> Vec<(String, f64)> {
    let height = df.height();
    df.get_columns()
        .iter()
        .map(|col| {
            let fraction = if height == 0 {
                0.0
            } else {
                col.null_count() as f64 / height as f64
            };
            (col.name().to_string(), fraction)
        })
        .collect()
}

/// Classify columns and drop high-missing ones.
///
/// The input table is never mutated; the returned table is a copy with the
/// dropped columns removed. A column is dropped only when its missing
/// fraction is strictly greater than the threshold.
pub fn preprocess_data(
    df: &DataFrame,
    target: Option<&str>,
    options: ClassifyOptions,
) -> Result<ClassifiedTable> {
    let mut numeric = columns_of_kind(df, ColumnKind::Numeric);
    let mut categorical = columns_of_kind(df, ColumnKind::Text);

    if let Some(target) = target {
        if let Some(pos) = numeric.iter().position(|c| c == target) {
            numeric.remove(pos);
        } else if let Some(pos) = categorical.iter().position(|c| c == target) {
            categorical.remove(pos);
        }
    }

    let mut table = df.clone();
    let mut dropped = Vec::new();

    if options.drop_high_missing {
        dropped = missing_fractions(df)
            .into_iter()
            .filter(|(_, fraction)| *fraction > options.missing_threshold)
            .map(|(name, _)| name)
            .collect();

        if !dropped.is_empty() {
            info!(
                "Dropping {} column(s) with more than {:.0}% missing: {:?}",
                dropped.len(),
                options.missing_threshold * 100.0,
                dropped
            );
            table = table.drop_many(dropped.iter().map(String::as_str));
        }

        numeric.retain(|c| !dropped.contains(c));
        categorical.retain(|c| !dropped.contains(c));
    }

    debug!(
        "Classified {} numeric and {} categorical feature(s)",
        numeric.len(),
        categorical.len()
    );

    Ok(ClassifiedTable {
        table,
        numeric,
        categorical,
        dropped,
    })
}

/// Role of every column in table order.
pub fn column_roles(df: &DataFrame, target: Option<&str>) -> Vec<(String, ColumnRole)> {
    df.get_columns()
        .iter()
        .map(|col| {
            let name = col.name().to_string();
            let role = if Some(name.as_str()) == target {
                ColumnRole::Target
            } else {
                match column_kind(col.dtype()) {
                    ColumnKind::Numeric => ColumnRole::Numeric,
                    ColumnKind::Text => ColumnRole::Categorical,
                    _ => ColumnRole::Excluded,
                }
            };
            (name, role)
        })
        .collect()
}
