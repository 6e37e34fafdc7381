//! Numeric branch: imputation followed by optional standard scaling.

use super::NumericImputation;
use crate::error::{PrepError, Result};
use crate::utils::{ColumnKind, column_kind, numeric_mode, numeric_values, series_of};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Parameters learned for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericParams {
    pub column: String,
    pub fill_value: f64,
    /// Subtracted after imputation; 0.0 when scaling is off.
    pub center: f64,
    /// Divisor after centering; 1.0 when scaling is off or variance is zero.
    pub scale: f64,
}

impl NumericParams {
    pub(crate) fn fit(
        df: &DataFrame,
        column: &str,
        imputation: NumericImputation,
        scale_numeric: bool,
    ) -> Result<Self> {
        let series = series_of(df, column)?;
        if column_kind(series.dtype()) != ColumnKind::Numeric {
            return Err(PrepError::InvalidConfig(format!(
                "numeric feature '{}' has dtype {}",
                column,
                series.dtype()
            )));
        }
        let values = numeric_values(series)?;

        let learned = match imputation {
            NumericImputation::Constant(v) => Some(v),
            NumericImputation::Mean => values.iter().copied().collect::<Float64Chunked>().mean(),
            NumericImputation::Median => {
                values.iter().copied().collect::<Float64Chunked>().median()
            }
            NumericImputation::MostFrequent => numeric_mode(&values),
        };
        let fill_value = learned.unwrap_or_else(|| {
            warn!("Column '{}' has no observed values; imputing 0.0", column);
            0.0
        });

        let (center, scale) = if scale_numeric {
            let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(fill_value)).collect();
            population_moments(&imputed)
        } else {
            (0.0, 1.0)
        };

        debug!(
            "Numeric '{}': fill={:.4}, center={:.4}, scale={:.4}",
            column, fill_value, center, scale
        );

        Ok(Self {
            column: column.to_string(),
            fill_value,
            center,
            scale,
        })
    }

    pub(crate) fn apply(&self, df: &DataFrame) -> Result<Column> {
        let values = numeric_values(series_of(df, &self.column)?)?;
        let out: Vec<f64> = values
            .into_iter()
            .map(|v| (v.unwrap_or(self.fill_value) - self.center) / self.scale)
            .collect();
        Ok(Column::new(self.column.as_str().into(), out))
    }
}

/// Mean and population standard deviation; a zero deviation becomes 1.0.
fn population_moments(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 1.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 { (mean, std) } else { (mean, 1.0) }
}
