//! Housing Price Data Preparation Library
//!
//! Data preparation and evaluation for tabular house-price regression, built
//! on Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV train/test tables with inferred schemas
//! - **Classification**: numeric and categorical feature lists, target
//!   exclusion, removal of mostly-empty columns
//! - **Missing Data**: per-column analysis, recommendations and numeric filling
//! - **Feature Pipeline**: fit-once imputation, scaling and one-hot encoding
//! - **Splitting**: seeded, optionally stratified train/test partitions
//! - **Evaluation**: MSE, RMSE, MAE, R² and residual diagnostics
//! - **Reporting**: text renderings and a JSON run report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use housing_prep::{
//!     ClassifyOptions, FeaturePipeline, SplitOptions, TransformSpec,
//!     load_data, preprocess_data, split_data,
//! };
//!
//! let (train, _test) = load_data("data", "train.csv", "test.csv")?;
//! let classified = preprocess_data(&train, Some("SalePrice"), ClassifyOptions::default())?;
//!
//! let target = classified.table.column("SalePrice")?.as_materialized_series().clone();
//! let split = split_data(&classified.table, &target, SplitOptions::default())?;
//!
//! let pipeline = FeaturePipeline::new(
//!     classified.numeric,
//!     classified.categorical,
//!     TransformSpec::default(),
//! );
//! let fitted = pipeline.fit(&split.x_train)?;
//! let x_train = fitted.transform(&split.x_train)?;
//! let x_test = fitted.transform(&split.x_test)?;
//! ```
//!
//! # Configuration
//!
//! Use [`PrepConfig`] to collect the workflow settings:
//!
//! ```rust,ignore
//! use housing_prep::config::PrepConfig;
//!
//! let config = PrepConfig::builder()
//!     .target_column("SalePrice")
//!     .missing_threshold(0.8)     // Drop columns with >80% missing
//!     .test_fraction(0.2)
//!     .seed(42)
//!     .build()?;
//! ```

pub mod classifier;
pub mod config;
pub mod eda;
pub mod encoding;
pub mod error;
pub mod evaluation;
pub mod loader;
pub mod missing;
pub mod reporting;
pub mod splitter;
pub mod transform;
pub mod utils;

// Re-exports for convenient access
pub use classifier::{
    ClassifiedTable, ClassifyOptions, ColumnRole, column_roles, missing_fractions, preprocess_data,
};
pub use config::{ConfigValidationError, PrepConfig, PrepConfigBuilder};
pub use eda::{
    CorrelationMatrix, CorrelationMethod, DatasetOverview, NumericSummary, correlation_matrix,
    dataset_overview, numeric_summary,
};
pub use encoding::{EncodingMethod, convert_categories};
pub use error::{PrepError, Result as PrepResult, ResultExt};
pub use evaluation::{
    DEFAULT_RESIDUAL_BINS, HistogramBin, MetricsReport, ResidualDiagnostics, compare_models,
    evaluate, residual_diagnostics, series_to_f64,
};
pub use loader::{DEFAULT_TEST_FILE, DEFAULT_TRAIN_FILE, load_csv, load_data, save_csv};
pub use missing::{
    FillStrategy, MissingEntry, MissingRecommendation, MissingReport, analyze_missing,
    fill_numeric_values, recommend,
};
pub use reporting::{ReportGenerator, RunReport};
pub use splitter::{Split, SplitData, SplitOptions, split_data, split_indices};
pub use transform::{
    CategoricalImputation, FeaturePipeline, FittedPipeline, NumericImputation, TransformSpec,
    UnknownCategoryPolicy,
};
pub use utils::ColumnKind;
