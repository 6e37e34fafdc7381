//! housing-learning: linear regression training and evaluation for
//! housing-price data.
//!
//! This crate builds on `housing_prep` to train an ordinary least squares
//! model on the encoded feature matrix and evaluate it.
//!
//! # Features
//!
//! - **Regressor seam**: the [`Regressor`] trait over `nalgebra` matrices
//! - **Linear regression**: SVD-based least squares with an intercept
//! - **Trained model**: a fitted feature pipeline plus a fitted regressor,
//!   scoring raw tables directly
//! - **Workflow**: load, prepare, split, train, evaluate and report in one call
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use housing_learning::{WorkflowConfig, run};
//! use housing_prep::reporting::render_metrics;
//!
//! let config = WorkflowConfig::builder()
//!     .data_dir("data")
//!     .save_predictions(true)
//!     .build()?;
//!
//! let outcome = run(&config)?;
//! println!("{}", render_metrics(&outcome.test_metrics, outcome.model.name()));
//! ```
//!
//! # Architecture
//!
//! ```text
//! WorkflowConfig ──► run ──► FeaturePipeline ──► TrainedModel ──► MetricsReport
//!                              (housing_prep)     (LinearRegression)
//! ```

pub mod error;
pub mod model;
pub mod workflow;

pub use error::{LearningError, Result};
pub use model::{LinearRegression, Regressor, TrainedModel, frame_to_matrix};
pub use workflow::{
    DEFAULT_TARGET, WorkflowConfig, WorkflowConfigBuilder, WorkflowOutcome, run,
};
