//! CLI entry point for the housing-price training workflow.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use housing_learning::{WorkflowConfig, WorkflowOutcome, run};
use housing_prep::reporting::{
    DEFAULT_CHART_FLOOR_PCT, render_correlation, render_metrics, render_missing_report,
    render_numeric_summary, render_overview, render_residuals,
};
use housing_prep::{
    CategoricalImputation, CorrelationMethod, NumericImputation, PrepConfig, TransformSpec,
    UnknownCategoryPolicy, compare_models, correlation_matrix, dataset_overview, load_csv,
    numeric_summary,
};
use serde_json::json;
use std::path::Path;
use tracing::info;

/// CLI-compatible numeric imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNumericImputation {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
    /// Use the most frequent value
    MostFrequent,
    /// Use the value of --numeric-fill
    Constant,
}

/// CLI-compatible categorical imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCategoricalImputation {
    /// Use the value of --categorical-fill
    Constant,
    /// Use the most frequent value
    MostFrequent,
}

/// CLI-compatible unknown-category policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliUnknownCategories {
    /// Encode unseen categories as all zeros
    Ignore,
    /// Fail on unseen categories
    Error,
}

impl From<CliUnknownCategories> for UnknownCategoryPolicy {
    fn from(cli: CliUnknownCategories) -> Self {
        match cli {
            CliUnknownCategories::Ignore => UnknownCategoryPolicy::Ignore,
            CliUnknownCategories::Error => UnknownCategoryPolicy::Error,
        }
    }
}

/// CLI-compatible correlation method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCorrelation {
    Pearson,
    Spearman,
    Kendall,
}

impl From<CliCorrelation> for CorrelationMethod {
    fn from(cli: CliCorrelation) -> Self {
        match cli {
            CliCorrelation::Pearson => CorrelationMethod::Pearson,
            CliCorrelation::Spearman => CorrelationMethod::Spearman,
            CliCorrelation::Kendall => CorrelationMethod::Kendall,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Housing-price data preparation and linear regression evaluation",
    long_about = "Loads train/test CSV files, reports missing values, builds the feature \
                  pipeline, trains a linear regression and evaluates it.\n\n\
                  EXAMPLES:\n  \
                  # Train and evaluate on data/train.csv\n  \
                  housing -d data\n\n  \
                  # Save predictions for data/test.csv and a JSON report\n  \
                  housing -d data --save-predictions -r -o results/\n\n  \
                  # Explore the training table first\n  \
                  housing -d data --eda --correlation spearman"
)]
struct Args {
    /// Directory containing the training and evaluation files
    #[arg(short, long, default_value = "data")]
    data_dir: String,

    /// Training file name inside the data directory
    #[arg(long, default_value = "train.csv")]
    train_file: String,

    /// Evaluation file name inside the data directory
    #[arg(long, default_value = "test.csv")]
    test_file: String,

    /// Target column to predict
    #[arg(short, long, default_value = "SalePrice")]
    target: String,

    /// Output directory for predictions and reports
    #[arg(short, long, default_value = "output")]
    output: String,

    /// Missing fraction (0.0 - 1.0) above which a column is dropped
    #[arg(long, default_value = "0.8")]
    missing_threshold: f64,

    /// Keep columns regardless of their missing fraction
    #[arg(long)]
    keep_high_missing: bool,

    /// Missing percentage (0 - 100) above which the report suggests dropping
    #[arg(long, default_value = "30.0")]
    report_threshold: f64,

    /// Fraction of training rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Seed for the train/test permutation
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Strategy for imputing missing numeric values
    #[arg(long, value_enum, default_value = "median")]
    numeric_imputation: CliNumericImputation,

    /// Fill value for `--numeric-imputation constant`
    #[arg(long, default_value = "0.0")]
    numeric_fill: f64,

    /// Strategy for imputing missing categorical values
    #[arg(long, value_enum, default_value = "constant")]
    categorical_imputation: CliCategoricalImputation,

    /// Sentinel category for `--categorical-imputation constant`
    #[arg(long, default_value = "missing")]
    categorical_fill: String,

    /// Disable standard scaling of numeric features
    #[arg(long)]
    no_scale: bool,

    /// How to encode categories not seen during training
    #[arg(long, value_enum, default_value = "ignore")]
    unknown_categories: CliUnknownCategories,

    /// Train on the raw target instead of log1p(target)
    #[arg(long)]
    no_log_target: bool,

    /// Score the evaluation file and write predictions.csv
    #[arg(long)]
    save_predictions: bool,

    /// Print an overview, numeric distributions and correlations first
    #[arg(long)]
    eda: bool,

    /// Correlation method for --eda
    #[arg(long, value_enum, default_value = "pearson")]
    correlation: CliCorrelation,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final metrics.
    #[arg(long)]
    json: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as housing_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

impl Args {
    fn transform_spec(&self) -> TransformSpec {
        let numeric = match self.numeric_imputation {
            CliNumericImputation::Mean => NumericImputation::Mean,
            CliNumericImputation::Median => NumericImputation::Median,
            CliNumericImputation::MostFrequent => NumericImputation::MostFrequent,
            CliNumericImputation::Constant => NumericImputation::Constant(self.numeric_fill),
        };
        let categorical = match self.categorical_imputation {
            CliCategoricalImputation::Constant => {
                CategoricalImputation::Constant(self.categorical_fill.clone())
            }
            CliCategoricalImputation::MostFrequent => CategoricalImputation::MostFrequent,
        };
        TransformSpec {
            numeric,
            categorical,
            scale_numeric: !self.no_scale,
            unknown_categories: self.unknown_categories.into(),
        }
    }

    fn workflow_config(&self) -> Result<WorkflowConfig> {
        let prep = PrepConfig::builder()
            .target_column(&self.target)
            .missing_threshold(self.missing_threshold)
            .drop_high_missing(!self.keep_high_missing)
            .report_threshold_pct(self.report_threshold)
            .test_fraction(self.test_fraction)
            .seed(self.seed)
            .transform(self.transform_spec())
            .output_dir(&self.output)
            .build()?;

        Ok(WorkflowConfig::builder()
            .prep(prep)
            .data_dir(&self.data_dir)
            .train_file(&self.train_file)
            .test_file(&self.test_file)
            .log_target(!self.no_log_target)
            .save_predictions(self.save_predictions)
            .emit_report(self.emit_report)
            .build()?)
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.data_dir).is_dir() {
        return Err(anyhow!("Data directory not found: {}", args.data_dir));
    }

    let config = args.workflow_config()?;

    if args.eda && !args.json {
        run_eda(&args)?;
    }

    info!("Running workflow on {}", args.data_dir);
    let outcome = run(&config).context("workflow failed")?;

    if args.json {
        print_json(&outcome)?;
    } else {
        print_summary(&config, &outcome)?;
    }
    Ok(())
}

/// Print exploratory summaries of the training table.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn run_eda(args: &Args) -> Result<()> {
    let train = load_csv(Path::new(&args.data_dir).join(&args.train_file))?;

    println!("{}", render_overview(&dataset_overview(&train)));
    println!("{}", render_numeric_summary(&numeric_summary(&train, None)?));
    println!(
        "{}",
        render_correlation(&correlation_matrix(&train, args.correlation.into())?)
    );
    Ok(())
}

fn print_summary(config: &WorkflowConfig, outcome: &WorkflowOutcome) -> Result<()> {
    println!(
        "{}",
        render_missing_report(&outcome.missing, &outcome.recommendation, DEFAULT_CHART_FLOOR_PCT)
    );

    if !outcome.dropped_columns.is_empty() {
        println!("Dropped columns: {}", outcome.dropped_columns.join(", "));
    }
    println!(
        "Features: {} numeric, {} categorical -> {} encoded",
        outcome.numeric_features.len(),
        outcome.categorical_features.len(),
        outcome.model.pipeline().n_features()
    );
    println!(
        "Split: {} train / {} test (seed {})",
        outcome.split.train.len(),
        outcome.split.test.len(),
        outcome.split.seed
    );
    if config.log_target {
        println!("Metrics are on the log1p({}) scale", config.target());
    }
    println!();

    let name = outcome.model.name();
    println!("{}", render_metrics(&outcome.train_metrics, &format!("{name} (train)")));
    println!("{}", render_metrics(&outcome.test_metrics, &format!("{name} (test)")));
    println!("{}", render_residuals(&outcome.residuals, name));

    let comparison = compare_models(&[
        ("train", &outcome.train_metrics),
        ("test", &outcome.test_metrics),
    ])?;
    println!("{comparison}");

    if let Some(path) = &outcome.predictions_path {
        println!("Predictions written to {}", path.display());
    }
    if let Some(path) = &outcome.report_path {
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_json(outcome: &WorkflowOutcome) -> Result<()> {
    let value = json!({
        "model": outcome.model.name(),
        "dropped_columns": outcome.dropped_columns,
        "n_features": outcome.model.pipeline().n_features(),
        "train": outcome.train_metrics,
        "test": outcome.test_metrics,
        "predictions_file": outcome.predictions_path,
        "report_file": outcome.report_path,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
