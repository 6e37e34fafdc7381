use crate::error::{PrepError, Result};
use crate::evaluation::{MetricsReport, ResidualDiagnostics};
use crate::missing::{MissingRecommendation, MissingReport};
use crate::splitter::Split;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Run Report Types
// ============================================================================

/// Everything a workflow run decided and measured, for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    // Metadata
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Directory the train/test files were read from
    pub input_dir: String,
    /// Path to the predictions file (if written)
    pub predictions_file: Option<String>,

    // Data preparation
    pub target_column: Option<String>,
    /// Whether the model was trained on `log1p(target)`
    pub log_target: bool,
    pub rows: usize,
    pub columns: usize,
    pub missing: MissingReport,
    pub recommendation: MissingRecommendation,
    /// Columns removed for exceeding the missing threshold
    pub dropped_columns: Vec<String>,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    /// Width of the encoded feature matrix
    pub n_features: usize,

    // Evaluation
    pub split: SplitSummary,
    pub evaluations: Vec<EvaluationEntry>,
    pub residuals: Option<ResidualSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
    pub stratified: bool,
}

impl From<&Split> for SplitSummary {
    fn from(split: &Split) -> Self {
        Self {
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            seed: split.seed,
            stratified: split.stratified,
        }
    }
}

/// Metrics of one model on one partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationEntry {
    pub model: String,
    /// "train" or "test"
    pub partition: String,
    pub metrics: MetricsReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl From<&ResidualDiagnostics> for ResidualSummary {
    fn from(diag: &ResidualDiagnostics) -> Self {
        Self {
            mean: diag.mean,
            std: diag.std,
            min: diag.min,
            max: diag.max,
        }
    }
}

// ============================================================================
// Report Generator
// ============================================================================

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Current local time in RFC 3339 form.
    pub fn timestamp() -> String {
        Local::now().to_rfc3339()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a run report as pretty JSON to `{base_name}_report.json`.
    pub fn write_report_to_file(&self, report: &RunReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| PrepError::io(&self.output_dir, e))?;

        let report_path = self.output_dir.join(format!("{base_name}_report.json"));
        let mut file = File::create(&report_path).map_err(|e| PrepError::io(&report_path, e))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())
            .map_err(|e| PrepError::io(&report_path, e))?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
