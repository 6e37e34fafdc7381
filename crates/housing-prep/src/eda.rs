//! Exploratory summaries: table overview, numeric distributions and
//! correlations between numeric columns.

use crate::error::{PrepError, Result};
use crate::utils::{ColumnKind, column_kind, columns_of_kind, numeric_values, series_of};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Rows shown in an overview sample.
pub const HEAD_ROWS: usize = 5;

/// Shape, dtype counts and the first rows of a table.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub dtype_counts: BTreeMap<String, usize>,
    pub kind_counts: BTreeMap<ColumnKind, usize>,
    #[serde(skip)]
    pub head: DataFrame,
}

pub fn dataset_overview(df: &DataFrame) -> DatasetOverview {
    let mut dtype_counts = BTreeMap::new();
    let mut kind_counts = BTreeMap::new();
    for col in df.get_columns() {
        *dtype_counts.entry(col.dtype().to_string()).or_insert(0) += 1;
        *kind_counts.entry(column_kind(col.dtype())).or_insert(0) += 1;
    }

    DatasetOverview {
        rows: df.height(),
        columns: df.width(),
        dtype_counts,
        kind_counts,
        head: df.head(Some(HEAD_ROWS)),
    }
}

/// Distribution statistics of one numeric column, over non-null values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

/// Summaries for `columns`, or for every numeric column.
pub fn numeric_summary(df: &DataFrame, columns: Option<&[&str]>) -> Result<Vec<NumericSummary>> {
    let targets: Vec<String> = match columns {
        Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
        None => columns_of_kind(df, ColumnKind::Numeric),
    };

    targets
        .iter()
        .map(|name| {
            let values = numeric_values(series_of(df, name)?)?;
            let ca: Float64Chunked = values.iter().copied().collect();
            Ok(NumericSummary {
                column: name.clone(),
                count: ca.len() - ca.null_count(),
                missing: ca.null_count(),
                mean: ca.mean(),
                std: ca.std(1),
                min: ca.min(),
                median: ca.median(),
                max: ca.max(),
            })
        })
        .collect()
}

// =============================================================================
// Correlation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    /// Pearson on average ranks
    Spearman,
    /// Kendall's tau-b
    Kendall,
}

impl CorrelationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        }
    }

    fn coefficient(&self, x: Vec<f64>, y: Vec<f64>) -> Result<f64> {
        match self {
            CorrelationMethod::Pearson => Ok(pearson(
                &Float64Chunked::from_vec("x".into(), x),
                &Float64Chunked::from_vec("y".into(), y),
            )),
            CorrelationMethod::Spearman => {
                let rx = average_ranks(Series::new("x".into(), x));
                let ry = average_ranks(Series::new("y".into(), y));
                Ok(pearson(rx.f64()?, ry.f64()?))
            }
            CorrelationMethod::Kendall => Ok(kendall_tau_b(&x, &y)),
        }
    }
}

impl FromStr for CorrelationMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            "kendall" => Ok(CorrelationMethod::Kendall),
            _ => Err(PrepError::InvalidStrategy {
                name: s.to_string(),
                expected: "pearson, spearman, kendall".to_string(),
            }),
        }
    }
}

/// Square correlation matrix over numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub method: CorrelationMethod,
    pub columns: Vec<String>,
    /// Row-major; NaN where a pair has fewer than two complete rows or no variance.
    #[serde(deserialize_with = "crate::utils::null_as_nan_matrix")]
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// As a table with a leading `column` name column.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![Column::new("column".into(), self.columns.clone())];
        for (j, name) in self.columns.iter().enumerate() {
            let col: Vec<f64> = self.values.iter().map(|row| row[j]).collect();
            columns.push(Column::new(name.as_str().into(), col));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Pairwise correlation of every numeric column, using rows where both
/// values are present.
pub fn correlation_matrix(df: &DataFrame, method: CorrelationMethod) -> Result<CorrelationMatrix> {
    let columns = columns_of_kind(df, ColumnKind::Numeric);
    let data = columns
        .iter()
        .map(|name| numeric_values(series_of(df, name)?))
        .collect::<Result<Vec<_>>>()?;

    let k = columns.len();
    let mut values = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let (x, y): (Vec<f64>, Vec<f64>) = data[i]
                .iter()
                .zip(&data[j])
                .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                .unzip();
            let r = if x.len() < 2 {
                f64::NAN
            } else {
                method.coefficient(x, y)?
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        method,
        columns,
        values,
    })
}

fn pearson(x: &Float64Chunked, y: &Float64Chunked) -> f64 {
    cov::pearson_corr(x, y).unwrap_or(f64::NAN)
}

/// Ranks starting at 1; ties share the average of their positions.
fn average_ranks(values: Series) -> Series {
    values.rank(
        RankOptions {
            method: RankMethod::Average,
            descending: false,
        },
        None,
    )
}

// polars has no Kendall kernel; count pairs directly.
fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    let (mut concordant, mut discordant) = (0u64, 0u64);
    let (mut ties_x, mut ties_y) = (0u64, 0u64);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 && dy == 0.0 {
                continue;
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }
    tau_b(concordant, discordant, ties_x, ties_y)
}

/// Pair counts are combined in f64; their product exceeds u64 past ~10^5 rows.
fn tau_b(concordant: u64, discordant: u64, ties_x: u64, ties_y: u64) -> f64 {
    let (c, d) = (concordant as f64, discordant as f64);
    let denom = ((c + d + ties_x as f64) * (c + d + ties_y as f64)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    (c - d) / denom
}
