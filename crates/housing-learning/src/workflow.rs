//! End-to-end training and evaluation workflow.
//!
//! Load → analyze missing values → classify and drop → split → fit the
//! feature pipeline and regressor → evaluate on both partitions → optionally
//! score the evaluation table and write predictions and a JSON report.

use crate::error::{LearningError, Result};
use crate::model::{LinearRegression, Regressor, TrainedModel};
use housing_prep::reporting::{EvaluationEntry, ResidualSummary, SplitSummary};
use housing_prep::{
    ClassifyOptions, DEFAULT_RESIDUAL_BINS, DEFAULT_TEST_FILE, DEFAULT_TRAIN_FILE, FeaturePipeline,
    MetricsReport, MissingRecommendation, MissingReport, PrepConfig, ReportGenerator,
    ResidualDiagnostics, RunReport, Split, SplitOptions, analyze_missing, load_data,
    preprocess_data, recommend, residual_diagnostics, save_csv, series_to_f64, split_data,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default target column of the housing dataset.
pub const DEFAULT_TARGET: &str = "SalePrice";

/// Identifier column copied into the predictions file when present.
pub const ID_COLUMN: &str = "Id";

/// Configuration for a workflow run.
///
/// # Example
///
/// ```rust,ignore
/// use housing_learning::WorkflowConfig;
///
/// let config = WorkflowConfig::builder()
///     .data_dir("data/raw")
///     .log_target(true)
///     .save_predictions(true)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Preparation settings, including the target column and output directory.
    pub prep: PrepConfig,

    /// Directory holding the training and evaluation files.
    /// Default: "data"
    pub data_dir: PathBuf,

    /// Default: "train.csv"
    pub train_file: String,

    /// Default: "test.csv"
    pub test_file: String,

    /// Train on `log1p(target)` and invert predictions with `expm1`.
    /// Default: true
    pub log_target: bool,

    /// Score the evaluation table and write `predictions.csv`.
    /// Default: false
    pub save_predictions: bool,

    /// Write `housing_report.json` to the output directory.
    /// Default: false
    pub emit_report: bool,

    /// Histogram bins for residual diagnostics.
    /// Default: 30
    pub residual_bins: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            prep: PrepConfig {
                target_column: Some(DEFAULT_TARGET.to_string()),
                ..PrepConfig::default()
            },
            data_dir: PathBuf::from("data"),
            train_file: DEFAULT_TRAIN_FILE.to_string(),
            test_file: DEFAULT_TEST_FILE.to_string(),
            log_target: true,
            save_predictions: false,
            emit_report: false,
            residual_bins: DEFAULT_RESIDUAL_BINS,
        }
    }
}

impl WorkflowConfig {
    pub fn builder() -> WorkflowConfigBuilder {
        WorkflowConfigBuilder::default()
    }

    pub fn target(&self) -> &str {
        self.prep.target_column.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    pub fn validate(&self) -> Result<()> {
        self.prep
            .validate()
            .map_err(|e| LearningError::InvalidConfig(e.to_string()))?;
        if self.residual_bins == 0 {
            return Err(LearningError::InvalidConfig(
                "residual_bins must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`WorkflowConfig`].
#[derive(Debug, Default)]
pub struct WorkflowConfigBuilder {
    config: Option<WorkflowConfig>,
}

impl WorkflowConfigBuilder {
    fn config(&mut self) -> &mut WorkflowConfig {
        self.config.get_or_insert_with(WorkflowConfig::default)
    }

    pub fn prep(mut self, prep: PrepConfig) -> Self {
        let target = prep
            .target_column
            .clone()
            .or_else(|| Some(DEFAULT_TARGET.to_string()));
        self.config().prep = PrepConfig {
            target_column: target,
            ..prep
        };
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config().data_dir = dir.into();
        self
    }

    pub fn train_file(mut self, name: impl Into<String>) -> Self {
        self.config().train_file = name.into();
        self
    }

    pub fn test_file(mut self, name: impl Into<String>) -> Self {
        self.config().test_file = name.into();
        self
    }

    pub fn log_target(mut self, enabled: bool) -> Self {
        self.config().log_target = enabled;
        self
    }

    pub fn save_predictions(mut self, enabled: bool) -> Self {
        self.config().save_predictions = enabled;
        self
    }

    pub fn emit_report(mut self, enabled: bool) -> Self {
        self.config().emit_report = enabled;
        self
    }

    pub fn residual_bins(mut self, bins: usize) -> Self {
        self.config().residual_bins = bins;
        self
    }

    pub fn build(mut self) -> Result<WorkflowConfig> {
        let config = self.config().clone();
        config.validate()?;
        Ok(config)
    }
}

/// Everything a run produced.
#[derive(Debug)]
pub struct WorkflowOutcome {
    pub rows: usize,
    pub columns: usize,
    pub missing: MissingReport,
    pub recommendation: MissingRecommendation,
    pub dropped_columns: Vec<String>,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub split: Split,
    pub model: TrainedModel<LinearRegression>,
    /// Metrics on the model's own scale (log scale when `log_target` is set).
    pub train_metrics: MetricsReport,
    pub test_metrics: MetricsReport,
    pub residuals: ResidualDiagnostics,
    pub predictions_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

/// The target as dense `f64`, optionally `log1p`-transformed.
fn prepare_target(table: &DataFrame, target: &str, log_target: bool) -> Result<Series> {
    let series = table
        .column(target)
        .map_err(|_| housing_prep::PrepError::UnknownColumn(target.to_string()))?
        .as_materialized_series();
    let values = series_to_f64(series).map_err(|_| {
        LearningError::InvalidData(format!("target '{target}' contains missing values"))
    })?;

    let values: Vec<f64> = if log_target {
        if values.iter().any(|v| *v <= -1.0) {
            return Err(LearningError::InvalidData(format!(
                "target '{target}' has values <= -1; log1p is undefined"
            )));
        }
        values.iter().map(|v| v.ln_1p()).collect()
    } else {
        values
    };
    Ok(Series::new(target.into(), values))
}

/// Run the full workflow.
pub fn run(config: &WorkflowConfig) -> Result<WorkflowOutcome> {
    config.validate()?;
    let prep = &config.prep;
    let target = config.target();

    let (train, eval) = load_data(&config.data_dir, &config.train_file, &config.test_file)?;

    let missing = analyze_missing(&train);
    let recommendation = recommend(&missing, prep.report_threshold_pct);

    let classified = preprocess_data(
        &train,
        Some(target),
        ClassifyOptions {
            drop_high_missing: prep.drop_high_missing,
            missing_threshold: prep.missing_threshold,
        },
    )?;
    let y = prepare_target(&classified.table, target, config.log_target)?;
    let features = classified.table.drop(target)?;

    let data = split_data(
        &features,
        &y,
        SplitOptions {
            test_fraction: prep.test_fraction,
            seed: prep.seed,
            stratify: None,
        },
    )?;

    let pipeline = FeaturePipeline::new(
        classified.numeric.clone(),
        classified.categorical.clone(),
        prep.transform.clone(),
    );
    let model = TrainedModel::fit(&pipeline, LinearRegression::new(), &data.x_train, &data.y_train)?;

    let train_metrics = model.evaluate(&data.x_train, &data.y_train)?;
    let test_metrics = model.evaluate(&data.x_test, &data.y_test)?;
    let residuals = residual_diagnostics(&test_metrics, config.residual_bins);
    info!(
        "{}: train RMSE={:.4}, test RMSE={:.4}, test R²={:.4}",
        model.name(),
        train_metrics.rmse,
        test_metrics.rmse,
        test_metrics.r2
    );

    let predictions_path = if config.save_predictions {
        Some(write_predictions(config, &model, &eval)?)
    } else {
        None
    };

    let mut outcome = WorkflowOutcome {
        rows: train.height(),
        columns: train.width(),
        missing,
        recommendation,
        dropped_columns: classified.dropped,
        numeric_features: classified.numeric,
        categorical_features: classified.categorical,
        split: data.split,
        model,
        train_metrics,
        test_metrics,
        residuals,
        predictions_path,
        report_path: None,
    };

    if config.emit_report {
        let report = build_report(config, &outcome);
        let path = ReportGenerator::new(&prep.output_dir).write_report_to_file(&report, "housing")?;
        outcome.report_path = Some(path);
    }

    Ok(outcome)
}

/// Score the evaluation table and save `{Id, target}` rows.
fn write_predictions<R: Regressor>(
    config: &WorkflowConfig,
    model: &TrainedModel<R>,
    eval: &DataFrame,
) -> Result<PathBuf> {
    let raw = model.predict(eval)?;
    let predictions: Vec<f64> = if config.log_target {
        raw.iter().map(|v| v.exp_m1()).collect()
    } else {
        raw
    };

    let mut columns = Vec::with_capacity(2);
    match eval.column(ID_COLUMN) {
        Ok(id) => columns.push(id.clone()),
        Err(_) => warn!("Evaluation table has no '{}' column", ID_COLUMN),
    }
    columns.push(Column::new(config.target().into(), predictions));
    let out = DataFrame::new(columns)?;

    let path = save_csv(&out, config.prep.output_dir.join("predictions.csv"))?;
    info!("Predictions saved: {} ({} rows)", path.display(), out.height());
    Ok(path)
}

fn build_report(config: &WorkflowConfig, outcome: &WorkflowOutcome) -> RunReport {
    let name = outcome.model.name().to_string();
    RunReport {
        generated_at: ReportGenerator::timestamp(),
        input_dir: config.data_dir.display().to_string(),
        predictions_file: outcome
            .predictions_path
            .as_ref()
            .map(|p| p.display().to_string()),
        target_column: Some(config.target().to_string()),
        log_target: config.log_target,
        rows: outcome.rows,
        columns: outcome.columns,
        missing: outcome.missing.clone(),
        recommendation: outcome.recommendation.clone(),
        dropped_columns: outcome.dropped_columns.clone(),
        numeric_features: outcome.numeric_features.clone(),
        categorical_features: outcome.categorical_features.clone(),
        n_features: outcome.model.pipeline().n_features(),
        split: SplitSummary::from(&outcome.split),
        evaluations: vec![
            EvaluationEntry {
                model: name.clone(),
                partition: "train".into(),
                metrics: outcome.train_metrics.clone(),
            },
            EvaluationEntry {
                model: name,
                partition: "test".into(),
                metrics: outcome.test_metrics.clone(),
            },
        ],
        residuals: Some(ResidualSummary::from(&outcome.residuals)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkflowConfig::default();
        assert_eq!(config.target(), "SalePrice");
        assert_eq!(config.train_file, "train.csv");
        assert!(config.log_target);
        assert_eq!(config.residual_bins, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validates() {
        let err = WorkflowConfig::builder().residual_bins(0).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let prep = PrepConfig {
            test_fraction: 1.0,
            ..PrepConfig::default()
        };
        assert!(WorkflowConfig::builder().prep(prep).build().is_err());
    }

    #[test]
    fn test_builder_keeps_default_target() {
        let config = WorkflowConfig::builder()
            .prep(PrepConfig::default())
            .data_dir("x")
            .build()
            .unwrap();
        assert_eq!(config.target(), "SalePrice");
        assert_eq!(config.data_dir, PathBuf::from("x"));
    }

    #[test]
    fn test_prepare_target_log1p() {
        let table = df!["SalePrice" => [0i64, 99]].unwrap();
        let y = prepare_target(&table, "SalePrice", true).unwrap();
        let values: Vec<f64> = y.f64().unwrap().into_no_null_iter().collect();
        assert_eq!(values[0], 0.0);
        assert!((values[1] - 100f64.ln()).abs() < 1e-12);

        let missing = df!["SalePrice" => [Some(1.0), None]].unwrap();
        assert_eq!(
            prepare_target(&missing, "SalePrice", false).unwrap_err().error_code(),
            "INVALID_DATA"
        );
        assert_eq!(
            prepare_target(&table, "Price", false).unwrap_err().error_code(),
            "UNKNOWN_COLUMN"
        );
    }
}
