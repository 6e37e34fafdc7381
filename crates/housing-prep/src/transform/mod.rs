//! Feature transform pipeline.
//!
//! A [`FeaturePipeline`] names the numeric and categorical feature columns
//! and how to treat them. Fitting it on a training table yields a
//! [`FittedPipeline`], an immutable snapshot of every learned parameter that
//! can then transform any table with the same columns.
//!
//! ```rust,ignore
//! use housing_prep::transform::{FeaturePipeline, TransformSpec};
//!
//! let pipeline = FeaturePipeline::new(numeric, categorical, TransformSpec::default());
//! let fitted = pipeline.fit(&train)?;
//! let x_train = fitted.transform(&train)?;
//! let x_test = fitted.transform(&test)?;
//! ```
//!
//! The output table is all `Float64`: the numeric columns first, in the
//! order given, then one `{column}_{category}` block per categorical column.
//! Columns in neither list are dropped.

mod categorical;
mod numeric;

pub use categorical::CategoricalParams;
pub use numeric::NumericParams;

use crate::error::Result;
use crate::utils::ensure_columns;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Transform Specification
// =============================================================================

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum NumericImputation {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    #[default]
    Median,
    /// Use the most frequent value; ties resolve to the smallest
    MostFrequent,
    /// Use a fixed value
    Constant(f64),
}

/// Strategy for imputing missing categorical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalImputation {
    /// Use a sentinel category
    Constant(String),
    /// Use the most frequent value; ties resolve to the lexicographically smallest
    MostFrequent,
}

impl CategoricalImputation {
    pub const DEFAULT_FILL: &'static str = "missing";
}

impl Default for CategoricalImputation {
    fn default() -> Self {
        CategoricalImputation::Constant(Self::DEFAULT_FILL.to_string())
    }
}

/// What to do with a category not seen during fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnknownCategoryPolicy {
    /// Emit an all-zero block for the row
    #[default]
    Ignore,
    /// Fail with `UnknownCategory`
    Error,
}

/// How features are imputed, scaled and encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    pub numeric: NumericImputation,
    pub categorical: CategoricalImputation,
    /// Standard-scale numeric features after imputation.
    pub scale_numeric: bool,
    pub unknown_categories: UnknownCategoryPolicy,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            numeric: NumericImputation::default(),
            categorical: CategoricalImputation::default(),
            scale_numeric: true,
            unknown_categories: UnknownCategoryPolicy::default(),
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// An unfitted feature pipeline.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    numeric: Vec<String>,
    categorical: Vec<String>,
    spec: TransformSpec,
}

impl FeaturePipeline {
    pub fn new(numeric: Vec<String>, categorical: Vec<String>, spec: TransformSpec) -> Self {
        Self {
            numeric,
            categorical,
            spec,
        }
    }

    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    /// Learn fill values, scaling moments and vocabularies from `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedPipeline> {
        ensure_columns(df, &self.numeric)?;
        ensure_columns(df, &self.categorical)?;

        let numeric = self
            .numeric
            .iter()
            .map(|col| NumericParams::fit(df, col, self.spec.numeric, self.spec.scale_numeric))
            .collect::<Result<Vec<_>>>()?;

        let categorical = self
            .categorical
            .iter()
            .map(|col| CategoricalParams::fit(df, col, &self.spec.categorical))
            .collect::<Result<Vec<_>>>()?;

        let fitted = FittedPipeline {
            numeric,
            categorical,
            spec: self.spec.clone(),
        };
        info!(
            "Fitted pipeline on {} rows: {} numeric + {} categorical -> {} features",
            df.height(),
            fitted.numeric.len(),
            fitted.categorical.len(),
            fitted.n_features()
        );
        Ok(fitted)
    }

    /// Fit on `df` and transform it in one step.
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedPipeline, DataFrame)> {
        let fitted = self.fit(df)?;
        let out = fitted.transform(df)?;
        Ok((fitted, out))
    }
}

/// Learned parameters of a [`FeaturePipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    numeric: Vec<NumericParams>,
    categorical: Vec<CategoricalParams>,
    spec: TransformSpec,
}

impl FittedPipeline {
    pub fn numeric_params(&self) -> &[NumericParams] {
        &self.numeric
    }

    pub fn categorical_params(&self) -> &[CategoricalParams] {
        &self.categorical
    }

    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.vocabulary.len())
                .sum::<usize>()
    }

    /// Names of the output columns, in output order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|p| p.column.clone()).collect();
        for params in &self.categorical {
            names.extend(params.feature_names());
        }
        names
    }

    /// Apply the learned parameters to `df`.
    ///
    /// Never changes the fitted state, so the same table always produces the
    /// same output.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.n_features());
        for params in &self.numeric {
            columns.push(params.apply(df)?);
        }
        for params in &self.categorical {
            columns.extend(params.apply(df, self.spec.unknown_categories)?);
        }

        if columns.is_empty() {
            return Ok(DataFrame::empty());
        }
        Ok(DataFrame::new(columns)?)
    }
}

static_assertions::assert_impl_all!(FittedPipeline: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;
    use pretty_assertions::assert_eq;

    fn train() -> DataFrame {
        df![
            "LotArea" => [Some(8000.0), None, Some(10000.0), Some(12000.0)],
            "Street" => [Some("Pave"), Some("Grvl"), None, Some("Pave")],
            "Id" => [1i64, 2, 3, 4],
        ]
        .unwrap()
    }

    fn pipeline(spec: TransformSpec) -> FeaturePipeline {
        FeaturePipeline::new(vec!["LotArea".into()], vec!["Street".into()], spec)
    }

    #[test]
    fn test_output_layout() {
        let (fitted, out) = pipeline(TransformSpec::default()).fit_transform(&train()).unwrap();

        assert_eq!(
            fitted.feature_names(),
            vec!["LotArea", "Street_Grvl", "Street_Pave", "Street_missing"]
        );
        let names: Vec<String> = out.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, fitted.feature_names());
        assert_eq!(out.height(), 4);
        for col in out.get_columns() {
            assert_eq!(col.dtype(), &DataType::Float64);
            assert_eq!(col.null_count(), 0);
        }
    }

    #[test]
    fn test_numeric_is_imputed_then_scaled() {
        let (_, out) = pipeline(TransformSpec::default()).fit_transform(&train()).unwrap();
        let lot: Vec<f64> = out.column("LotArea").unwrap().f64().unwrap().into_no_null_iter().collect();

        // median 10000 fills the gap; scaled column has zero mean
        assert_eq!(lot[1], lot[2]);
        assert!(lot.iter().sum::<f64>().abs() < 1e-9);
    }

    #[test]
    fn test_no_scaling() {
        let spec = TransformSpec {
            numeric: NumericImputation::Constant(-1.0),
            scale_numeric: false,
            ..Default::default()
        };
        let (_, out) = pipeline(spec).fit_transform(&train()).unwrap();
        let lot: Vec<f64> = out.column("LotArea").unwrap().f64().unwrap().into_no_null_iter().collect();
        assert_eq!(lot, vec![8000.0, -1.0, 10000.0, 12000.0]);
    }

    #[test]
    fn test_transform_is_idempotent() {
        let fitted = pipeline(TransformSpec::default()).fit(&train()).unwrap();
        let snapshot = fitted.clone();

        let first = fitted.transform(&train()).unwrap();
        let second = fitted.transform(&train()).unwrap();
        assert!(first.equals(&second));
        assert_eq!(fitted, snapshot);
    }

    #[test]
    fn test_unknown_category_is_all_zero() {
        let fitted = pipeline(TransformSpec::default()).fit(&train()).unwrap();
        let new = df!["LotArea" => [9000.0], "Street" => ["Dirt"]].unwrap();

        let out = fitted.transform(&new).unwrap();
        for name in ["Street_Grvl", "Street_Pave", "Street_missing"] {
            assert_eq!(out.column(name).unwrap().f64().unwrap().get(0), Some(0.0));
        }

        let strict = pipeline(TransformSpec {
            unknown_categories: UnknownCategoryPolicy::Error,
            ..Default::default()
        })
        .fit(&train())
        .unwrap();
        assert!(matches!(
            strict.transform(&new),
            Err(PrepError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_missing_column_at_fit_and_transform() {
        let bad = FeaturePipeline::new(vec!["Nope".into()], vec![], TransformSpec::default());
        assert!(matches!(bad.fit(&train()), Err(PrepError::UnknownColumn(_))));

        let fitted = pipeline(TransformSpec::default()).fit(&train()).unwrap();
        let partial = df!["LotArea" => [1.0]].unwrap();
        assert!(matches!(
            fitted.transform(&partial),
            Err(PrepError::UnknownColumn(ref c)) if c == "Street"
        ));
    }

    #[test]
    fn test_spec_serde_defaults() {
        let spec: TransformSpec = serde_json::from_str(r#"{"scale_numeric": false}"#).unwrap();
        assert_eq!(spec.numeric, NumericImputation::Median);
        assert_eq!(spec.categorical, CategoricalImputation::default());
        assert!(!spec.scale_numeric);
    }
}
