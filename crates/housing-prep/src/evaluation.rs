//! Regression metrics and residual diagnostics.

use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Default number of histogram bins for residual diagnostics.
pub const DEFAULT_RESIDUAL_BINS: usize = 30;

/// Regression metrics for one set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    /// NaN when the true values have zero variance.
    #[serde(deserialize_with = "crate::utils::null_as_nan")]
    pub r2: f64,
    #[serde(skip)]
    pub y_true: Vec<f64>,
    #[serde(skip)]
    pub y_pred: Vec<f64>,
}

impl MetricsReport {
    /// Metrics in reporting order.
    pub fn metrics(&self) -> [(&'static str, f64); 4] {
        [
            ("MSE", self.mse),
            ("RMSE", self.rmse),
            ("MAE", self.mae),
            ("R²", self.r2),
        ]
    }

    pub fn len(&self) -> usize {
        self.y_true.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_true.is_empty()
    }
}

/// Compute MSE, RMSE, MAE and R² for paired true and predicted values.
pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Result<MetricsReport> {
    if y_true.len() != y_pred.len() {
        return Err(PrepError::size_mismatch(
            "y_true",
            y_true.len(),
            "y_pred",
            y_pred.len(),
        ));
    }
    if y_true.is_empty() {
        return Err(PrepError::size_mismatch("y_true", 0, "required minimum", 1));
    }

    let n = y_true.len() as f64;
    let (ss_res, abs_sum) = y_true
        .iter()
        .zip(y_pred)
        .fold((0.0, 0.0), |(sq, abs), (t, p)| {
            let e = t - p;
            (sq + e * e, abs + e.abs())
        });
    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    let mse = ss_res / n;
    let r2 = if ss_tot == 0.0 {
        f64::NAN
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(MetricsReport {
        mse,
        rmse: mse.sqrt(),
        mae: abs_sum / n,
        r2,
        y_true: y_true.to_vec(),
        y_pred: y_pred.to_vec(),
    })
}

/// Read a numeric series as dense `f64` values, rejecting nulls.
pub fn series_to_f64(series: &Series) -> Result<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    casted
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| {
                PrepError::InvalidConfig(format!("series '{}' contains nulls", series.name()))
            })
        })
        .collect()
}

// =============================================================================
// Residuals
// =============================================================================

/// One histogram bin, `[lower, upper)`; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// The data behind a residual plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualDiagnostics {
    /// `true - predicted`, in input order.
    pub residuals: Vec<f64>,
    /// `(predicted, residual)` pairs.
    #[serde(skip)]
    pub points: Vec<(f64, f64)>,
    pub histogram: Vec<HistogramBin>,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Residuals, scatter points and a histogram with `bins` equal-width bins.
pub fn residual_diagnostics(report: &MetricsReport, bins: usize) -> ResidualDiagnostics {
    let residuals: Vec<f64> = report
        .y_true
        .iter()
        .zip(&report.y_pred)
        .map(|(t, p)| t - p)
        .collect();
    let points = report
        .y_pred
        .iter()
        .copied()
        .zip(residuals.iter().copied())
        .collect();

    let n = residuals.len().max(1) as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let std = (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();
    let min = residuals.iter().copied().fold(f64::INFINITY, f64::min);
    let max = residuals.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    ResidualDiagnostics {
        histogram: histogram(&residuals, bins, min, max),
        residuals,
        points,
        mean,
        std,
        min,
        max,
    }
}

fn histogram(values: &[f64], bins: usize, min: f64, max: f64) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    // a degenerate range still gets a unit-width span
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, min + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// =============================================================================
// Model Comparison
// =============================================================================

/// One row per model with its metrics.
pub fn compare_models(results: &[(&str, &MetricsReport)]) -> Result<DataFrame> {
    let names: Vec<&str> = results.iter().map(|(name, _)| *name).collect();
    let column = |f: fn(&MetricsReport) -> f64| -> Vec<f64> {
        results.iter().map(|(_, r)| f(r)).collect()
    };

    Ok(df![
        "model" => names,
        "MSE" => column(|r| r.mse),
        "RMSE" => column(|r| r.rmse),
        "MAE" => column(|r| r.mae),
        "R2" => column(|r| r.r2),
    ]?)
}
