//! Configuration types for the preparation workflow.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic setup.

use crate::transform::TransformSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default missing fraction above which a column is dropped.
pub const DEFAULT_MISSING_THRESHOLD: f64 = 0.8;

/// Default missing percentage above which the report suggests dropping a column.
pub const DEFAULT_REPORT_THRESHOLD_PCT: f64 = 30.0;

/// Default fraction of rows held out for testing.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Default seed for the train/test permutation.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration for the preparation workflow.
///
/// Use [`PrepConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use housing_prep::config::PrepConfig;
///
/// let config = PrepConfig::builder()
///     .target_column("SalePrice")
///     .missing_threshold(0.5)
///     .test_fraction(0.25)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepConfig {
    /// Columns whose missing fraction is strictly above this value are dropped
    /// when `drop_high_missing` is set (0.0 - 1.0).
    /// Default: 0.8
    pub missing_threshold: f64,

    /// Whether to drop columns above `missing_threshold`.
    /// Default: true
    pub drop_high_missing: bool,

    /// Missing percentage (0 - 100) above which the missing-value report
    /// recommends dropping a column.
    /// Default: 30.0
    pub report_threshold_pct: f64,

    /// How numeric and categorical features are imputed, scaled and encoded.
    pub transform: TransformSpec,

    /// Fraction of rows held out for testing, strictly between 0 and 1.
    /// Default: 0.2
    pub test_fraction: f64,

    /// Seed for the train/test permutation.
    /// Default: 42
    pub seed: u64,

    /// Column to predict. Excluded from both feature lists.
    /// Default: None
    pub target_column: Option<String>,

    /// Output directory for predictions and reports.
    /// Default: "output"
    pub output_dir: PathBuf,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            missing_threshold: DEFAULT_MISSING_THRESHOLD,
            drop_high_missing: true,
            report_threshold_pct: DEFAULT_REPORT_THRESHOLD_PCT,
            transform: TransformSpec::default(),
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            target_column: None,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl PrepConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PrepConfigBuilder {
        PrepConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(0.0..=1.0).contains(&self.missing_threshold) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "missing_threshold".to_string(),
                value: self.missing_threshold,
            });
        }

        if !(0.0..=100.0).contains(&self.report_threshold_pct) {
            return Err(ConfigValidationError::InvalidPercentage {
                field: "report_threshold_pct".to_string(),
                value: self.report_threshold_pct,
            });
        }

        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigValidationError::InvalidTestFraction(
                self.test_fraction,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Invalid percentage for '{field}': {value} (must be between 0 and 100)")]
    InvalidPercentage { field: String, value: f64 },

    #[error("Invalid test fraction: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestFraction(f64),
}

impl From<ConfigValidationError> for crate::error::PrepError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::PrepError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PrepConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PrepConfigBuilder {
    missing_threshold: Option<f64>,
    drop_high_missing: Option<bool>,
    report_threshold_pct: Option<f64>,
    transform: Option<TransformSpec>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
    target_column: Option<String>,
    output_dir: Option<PathBuf>,
}

impl PrepConfigBuilder {
    /// Set the missing fraction above which columns are dropped.
    ///
    /// # Arguments
    /// * `threshold` - Value between 0.0 and 1.0 (e.g., 0.8 = 80%)
    pub fn missing_threshold(mut self, threshold: f64) -> Self {
        self.missing_threshold = Some(threshold);
        self
    }

    /// Enable or disable dropping of high-missing columns.
    pub fn drop_high_missing(mut self, drop: bool) -> Self {
        self.drop_high_missing = Some(drop);
        self
    }

    /// Set the report's drop-recommendation percentage (0 - 100).
    pub fn report_threshold_pct(mut self, pct: f64) -> Self {
        self.report_threshold_pct = Some(pct);
        self
    }

    /// Set the feature transform specification.
    pub fn transform(mut self, spec: TransformSpec) -> Self {
        self.transform = Some(spec);
        self
    }

    /// Set the held-out test fraction.
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = Some(fraction);
        self
    }

    /// Set the split seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the target column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PrepConfig` or an error if validation fails.
    pub fn build(self) -> Result<PrepConfig, ConfigValidationError> {
        let config = PrepConfig {
            missing_threshold: self.missing_threshold.unwrap_or(DEFAULT_MISSING_THRESHOLD),
            drop_high_missing: self.drop_high_missing.unwrap_or(true),
            report_threshold_pct: self
                .report_threshold_pct
                .unwrap_or(DEFAULT_REPORT_THRESHOLD_PCT),
            transform: self.transform.unwrap_or_default(),
            test_fraction: self.test_fraction.unwrap_or(DEFAULT_TEST_FRACTION),
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            target_column: self.target_column,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
        };

        config.validate()?;
        Ok(config)
    }
}
