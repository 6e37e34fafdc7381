//! Regression models and the trained feature-pipeline wrapper.
//!
//! [`Regressor`] is the fit/predict seam; [`LinearRegression`] is ordinary
//! least squares with an intercept. [`TrainedModel`] pairs a
//! [`FittedPipeline`] with a fitted regressor so raw tables can be scored
//! directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use housing_learning::{LinearRegression, TrainedModel};
//! use housing_prep::{FeaturePipeline, TransformSpec};
//!
//! let pipeline = FeaturePipeline::new(numeric, categorical, TransformSpec::default());
//! let model = TrainedModel::fit(&pipeline, LinearRegression::new(), &x_train, &y_train)?;
//! let predictions = model.predict(&x_test)?;
//! ```

use crate::error::{LearningError, Result};
use housing_prep::{FeaturePipeline, FittedPipeline, MetricsReport, evaluate, series_to_f64};
use nalgebra::{DMatrix, DVector};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A model that maps a dense feature matrix to one prediction per row.
pub trait Regressor {
    fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<()>;
    fn predict(&self, x: &DMatrix<f64>) -> Result<Vec<f64>>;
    fn name(&self) -> &str;
}

// =============================================================================
// Linear Regression
// =============================================================================

/// Ordinary least squares with an intercept.
///
/// Features and target are centered before an SVD solve, so collinear
/// columns (a full one-hot block, for instance) get the minimum-norm
/// coefficients and the intercept absorbs the means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Vec<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    /// Fitted coefficients, one per feature column.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.coefficients.as_deref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<()> {
        let (n, p) = x.shape();
        if n == 0 {
            return Err(LearningError::InvalidData("no training rows".into()));
        }
        if n != y.len() {
            return Err(housing_prep::PrepError::size_mismatch("features", n, "target", y.len()).into());
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(LearningError::SingularSystem(
                "training data contains non-finite values".into(),
            ));
        }

        let x_mean: Vec<f64> = x.column_iter().map(|c| c.mean()).collect();
        let y_mean = y.iter().sum::<f64>() / n as f64;

        let centered = DMatrix::from_fn(n, p, |i, j| x[(i, j)] - x_mean[j]);
        let target = DVector::from_iterator(n, y.iter().map(|v| v - y_mean));

        let coefficients = if p == 0 {
            Vec::new()
        } else {
            let svd = centered.svd(true, true);
            let max_sv = svd.singular_values.max();
            let eps = max_sv * n.max(p) as f64 * f64::EPSILON;
            let beta = svd
                .solve(&target, eps)
                .map_err(|e| LearningError::SingularSystem(e.to_string()))?;
            beta.iter().copied().collect()
        };

        self.intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_mean)
                .map(|(b, m)| b * m)
                .sum::<f64>();
        debug!(
            "OLS fitted on {}x{}: intercept={:.4}",
            n, p, self.intercept
        );
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict(&self, x: &DMatrix<f64>) -> Result<Vec<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| LearningError::NotFitted(self.name().to_string()))?;
        if x.ncols() != coefficients.len() {
            return Err(LearningError::InvalidData(format!(
                "expected {} features, got {}",
                coefficients.len(),
                x.ncols()
            )));
        }

        Ok(x.row_iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(coefficients)
                        .map(|(v, b)| v * b)
                        .sum::<f64>()
            })
            .collect())
    }

    fn name(&self) -> &str {
        "LinearRegression"
    }
}

static_assertions::assert_impl_all!(LinearRegression: Send, Sync);

// =============================================================================
// Conversions
// =============================================================================

/// Copy an all-numeric, null-free table into a row-major-indexed matrix.
pub fn frame_to_matrix(df: &DataFrame) -> Result<DMatrix<f64>> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| series_to_f64(col.as_materialized_series()))
        .collect::<housing_prep::PrepResult<Vec<_>>>()?;
    Ok(DMatrix::from_fn(df.height(), columns.len(), |i, j| {
        columns[j][i]
    }))
}

// =============================================================================
// Trained Model
// =============================================================================

/// A fitted feature pipeline followed by a fitted regressor.
#[derive(Debug, Clone)]
pub struct TrainedModel<R: Regressor> {
    pipeline: FittedPipeline,
    regressor: R,
}

impl<R: Regressor> TrainedModel<R> {
    /// Fit `pipeline` on `table`, then `regressor` on the transformed table.
    pub fn fit(
        pipeline: &FeaturePipeline,
        mut regressor: R,
        table: &DataFrame,
        target: &Series,
    ) -> Result<Self> {
        let y = series_to_f64(target).map_err(|_| {
            LearningError::InvalidData(format!("target '{}' contains nulls", target.name()))
        })?;

        let fitted = pipeline.fit(table)?;
        let x = frame_to_matrix(&fitted.transform(table)?)?;
        regressor.fit(&x, &y)?;

        info!(
            "Trained {} on {} rows x {} features",
            regressor.name(),
            x.nrows(),
            x.ncols()
        );
        Ok(Self {
            pipeline: fitted,
            regressor,
        })
    }

    pub fn predict(&self, table: &DataFrame) -> Result<Vec<f64>> {
        let x = frame_to_matrix(&self.pipeline.transform(table)?)?;
        self.regressor.predict(&x)
    }

    /// Predict `table` and score the predictions against `target`.
    pub fn evaluate(&self, table: &DataFrame, target: &Series) -> Result<MetricsReport> {
        let y = series_to_f64(target)?;
        let predictions = self.predict(table)?;
        Ok(evaluate(&y, &predictions)?)
    }

    pub fn pipeline(&self) -> &FittedPipeline {
        &self.pipeline
    }

    pub fn regressor(&self) -> &R {
        &self.regressor
    }

    pub fn name(&self) -> &str {
        self.regressor.name()
    }
}
