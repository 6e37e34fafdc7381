//! Report generation module.
//!
//! Text renderings for the terminal live in [`text`]; [`RunReport`] and
//! [`ReportGenerator`] produce the machine-readable JSON report of a run.
//!
//! # Example
//!
//! ```rust,ignore
//! use housing_prep::reporting::{render_metrics, ReportGenerator};
//!
//! println!("{}", render_metrics(&metrics, "LinearRegression"));
//!
//! let generator = ReportGenerator::new("output");
//! generator.write_report_to_file(&run_report, "train")?;
//! ```

mod generator;
pub mod text;

pub use generator::{
    EvaluationEntry, ReportGenerator, ResidualSummary, RunReport, SplitSummary,
};
pub use text::{
    DEFAULT_CHART_FLOOR_PCT, render_correlation, render_metrics, render_missing_report,
    render_numeric_summary, render_overview, render_residuals,
};
