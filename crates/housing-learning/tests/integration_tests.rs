//! Integration tests for the training workflow.
//!
//! These tests run the whole workflow on a small housing fixture and check
//! the files it writes.

use housing_learning::{WorkflowConfig, run};
use housing_prep::{PrepConfig, load_csv};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data")
}

fn config(output: &std::path::Path) -> WorkflowConfig {
    let prep = PrepConfig::builder()
        .target_column("SalePrice")
        .output_dir(output)
        .build()
        .unwrap();
    WorkflowConfig::builder()
        .prep(prep)
        .data_dir(data_dir())
        .build()
        .unwrap()
}

// ============================================================================
// Workflow Tests
// ============================================================================

#[test]
fn test_workflow_trains_and_evaluates() {
    let out = tempfile::tempdir().unwrap();
    let outcome = run(&config(out.path())).unwrap();

    assert_eq!(outcome.rows, 20);
    assert_eq!(outcome.dropped_columns, vec!["Alley", "PoolQC"]);
    assert!(!outcome.numeric_features.contains(&"SalePrice".to_string()));
    assert_eq!(outcome.split.train.len(), 16);
    assert_eq!(outcome.split.test.len(), 4);

    assert_eq!(outcome.train_metrics.len(), 16);
    assert_eq!(outcome.test_metrics.len(), 4);
    assert!(outcome.train_metrics.rmse.is_finite());
    assert!(outcome.test_metrics.rmse.is_finite());
    assert_eq!(outcome.residuals.residuals.len(), 4);
    assert_eq!(outcome.residuals.histogram.len(), 30);

    assert!(outcome.predictions_path.is_none());
    assert!(outcome.report_path.is_none());
}

#[test]
fn test_workflow_is_reproducible() {
    let out = tempfile::tempdir().unwrap();
    let a = run(&config(out.path())).unwrap();
    let b = run(&config(out.path())).unwrap();

    assert_eq!(a.split, b.split);
    assert_eq!(a.test_metrics, b.test_metrics);
}

#[test]
fn test_predictions_and_report_are_written() {
    let out = tempfile::tempdir().unwrap();
    let mut cfg = config(&out.path().join("results"));
    cfg.save_predictions = true;
    cfg.emit_report = true;

    let outcome = run(&cfg).unwrap();

    let predictions_path = outcome.predictions_path.unwrap();
    let predictions = load_csv(&predictions_path).unwrap();
    assert_eq!(predictions.shape(), (5, 2));
    let names: Vec<String> = predictions
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["Id", "SalePrice"]);

    let report_path = outcome.report_path.unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["target_column"], "SalePrice");
    assert_eq!(report["log_target"], true);
    assert_eq!(report["split"]["test_rows"], 4);
    assert_eq!(report["evaluations"].as_array().unwrap().len(), 2);
}

#[test]
fn test_missing_data_dir_is_io_error() {
    let out = tempfile::tempdir().unwrap();
    let mut cfg = config(out.path());
    cfg.data_dir = out.path().join("absent");

    let err = run(&cfg).unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
}

#[test]
fn test_unknown_target() {
    let out = tempfile::tempdir().unwrap();
    let mut cfg = config(out.path());
    cfg.prep.target_column = Some("Price".into());

    let err = run(&cfg).unwrap_err();
    assert_eq!(err.error_code(), "UNKNOWN_COLUMN");
}
