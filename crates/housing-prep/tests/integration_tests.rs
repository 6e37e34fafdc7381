//! Integration tests for the preparation toolkit.
//!
//! These tests exercise the load, classify, split, transform and evaluate
//! steps together on a small housing fixture.

use approx::assert_relative_eq;
use housing_prep::{
    ClassifyOptions, FeaturePipeline, FillStrategy, PrepError, SplitOptions, TransformSpec,
    analyze_missing, evaluate, fill_numeric_values, load_csv, load_data, preprocess_data,
    recommend, save_csv, split_data,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture(filename: &str) -> DataFrame {
    load_csv(fixtures_path().join(filename)).expect("Failed to read fixture")
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

// ============================================================================
// Loader Tests
// ============================================================================

#[test]
fn test_load_data_reads_both_tables() {
    let (train, test) =
        load_data(fixtures_path(), "housing_subset.csv", "housing_eval.csv").unwrap();

    assert_eq!(train.shape(), (20, 12));
    assert_eq!(test.shape(), (5, 11));
    assert_eq!(train.column("SalePrice").unwrap().dtype(), &DataType::Int64);
    assert_eq!(train.column("MSZoning").unwrap().dtype(), &DataType::String);
    assert_eq!(train.column("LotFrontage").unwrap().null_count(), 4);
}

#[test]
fn test_na_coded_fixture_loads_numeric_columns() {
    let (train, test) =
        load_data(fixtures_path(), "housing_subset.csv", "housing_eval.csv").unwrap();

    assert_eq!(train.column("LotFrontage").unwrap().dtype(), &DataType::Int64);
    assert_eq!(test.column("LotFrontage").unwrap().dtype(), &DataType::Int64);
    assert_eq!(test.column("LotFrontage").unwrap().null_count(), 1);
    assert_eq!(train.column("PoolQC").unwrap().null_count(), 20);
    assert_eq!(train.column("Alley").unwrap().null_count(), 19);
}

#[test]
fn test_csv_round_trip_preserves_values() {
    let df = df![
        "Id" => [1i64, 2, 3],
        "Delta" => [Some(-12.5), None, Some(3.25)],
        "Neighborhood" => [Some("College Creek, North"), Some("Veenker"), None],
    ]
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = save_csv(&df, dir.path().join("out/round_trip.csv")).unwrap();
    let loaded = load_csv(&path).unwrap();

    assert_eq!(column_names(&loaded), column_names(&df));
    assert_eq!(loaded.dtypes(), df.dtypes());
    assert!(loaded.equals_missing(&df));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_data(fixtures_path(), "nope.csv", "housing_eval.csv").unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
}

// ============================================================================
// Missing-Data Tests
// ============================================================================

#[test]
fn test_missing_report_on_fixture() {
    let train = load_fixture("housing_subset.csv");
    let report = analyze_missing(&train);

    let columns: Vec<&str> = report.entries.iter().map(|e| e.column.as_str()).collect();
    assert_eq!(columns, vec!["PoolQC", "Alley", "LotFrontage", "GarageType"]);
    assert_eq!(report.get("LotFrontage").unwrap().missing_percentage, 20.0);

    let rec = recommend(&report, 30.0);
    let dropped: Vec<&str> = rec.drop.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(dropped, vec!["PoolQC", "Alley"]);
    assert_eq!(rec.numeric_fill, vec!["LotFrontage"]);
    assert_eq!(rec.categorical_fill, vec!["GarageType"]);
}

#[test]
fn test_bogus_strategy_leaves_table_untouched() {
    let train = load_fixture("housing_subset.csv");
    let before = train.clone();

    let result = "bogus"
        .parse::<FillStrategy>()
        .and_then(|s| fill_numeric_values(&train, None, s));

    assert!(matches!(result, Err(PrepError::InvalidStrategy { .. })));
    assert!(train.equals_missing(&before));
}

// ============================================================================
// End-to-End Preparation Tests
// ============================================================================

#[test]
fn test_classify_split_and_transform() {
    let train = load_fixture("housing_subset.csv");
    let classified =
        preprocess_data(&train, Some("SalePrice"), ClassifyOptions::default()).unwrap();

    assert_eq!(classified.dropped, vec!["Alley", "PoolQC"]);
    assert!(!classified.numeric.contains(&"SalePrice".to_string()));

    let target = classified
        .table
        .column("SalePrice")
        .unwrap()
        .as_materialized_series()
        .clone();
    let split = split_data(&classified.table, &target, SplitOptions::default()).unwrap();
    assert_eq!(split.x_test.height(), 4);
    assert_eq!(split.x_train.height(), 16);

    let pipeline = FeaturePipeline::new(
        classified.numeric.clone(),
        classified.categorical.clone(),
        TransformSpec::default(),
    );
    let fitted = pipeline.fit(&split.x_train).unwrap();
    let x_train = fitted.transform(&split.x_train).unwrap();
    let x_test = fitted.transform(&split.x_test).unwrap();

    assert_eq!(column_names(&x_train), fitted.feature_names());
    assert_eq!(x_train.width(), x_test.width());
    assert!(x_train.column("SalePrice").is_err());
    for col in x_test.get_columns() {
        assert_eq!(col.null_count(), 0);
    }
}

#[test]
fn test_split_is_deterministic() {
    let train = load_fixture("housing_subset.csv");
    let target = train.column("SalePrice").unwrap().as_materialized_series().clone();

    let options = SplitOptions {
        test_fraction: 0.25,
        seed: 11,
        stratify: None,
    };
    let a = split_data(&train, &target, options.clone()).unwrap();
    let b = split_data(&train, &target, options).unwrap();

    assert_eq!(a.split, b.split);
    assert!(a.x_test.equals(&b.x_test));
}

#[test]
fn test_unseen_categories_encode_as_zero() {
    let train = load_fixture("housing_subset.csv");
    let eval = load_fixture("housing_eval.csv");

    let pipeline = FeaturePipeline::new(
        vec!["GrLivArea".into()],
        vec!["MSZoning".into()],
        TransformSpec::default(),
    );
    let fitted = pipeline.fit(&train).unwrap();
    let out = fitted.transform(&eval).unwrap();

    // row 0 is "RH", row 3 is "FV": neither appears in training
    for row in [0usize, 3] {
        let total: f64 = fitted.feature_names()[1..]
            .iter()
            .map(|name| out.column(name).unwrap().f64().unwrap().get(row).unwrap())
            .sum();
        assert_eq!(total, 0.0);
    }
    assert_eq!(out.column("MSZoning_RL").unwrap().f64().unwrap().get(1), Some(1.0));
}

#[test]
fn test_fitted_pipeline_is_idempotent() {
    let train = load_fixture("housing_subset.csv");
    let classified =
        preprocess_data(&train, Some("SalePrice"), ClassifyOptions::default()).unwrap();
    let fitted = FeaturePipeline::new(
        classified.numeric,
        classified.categorical,
        TransformSpec::default(),
    )
    .fit(&classified.table)
    .unwrap();

    let first = fitted.transform(&classified.table).unwrap();
    let second = fitted.transform(&classified.table).unwrap();
    assert!(first.equals(&second));
}

#[test]
fn test_metrics_scenario() {
    let report = evaluate(&[3.0, -0.5, 2.0, 7.0], &[2.5, 0.0, 2.0, 8.0]).unwrap();
    assert_relative_eq!(report.mse, 0.375);
    assert_relative_eq!(report.rmse, 0.6124, epsilon = 1e-4);
    assert_relative_eq!(report.mae, 0.5);
    assert_relative_eq!(report.r2, 0.9486, epsilon = 1e-4);
}
