//! Custom error types for the preparation toolkit.
//!
//! This module provides the error hierarchy using `thiserror` so every
//! failure is surfaced to the caller with enough context to act on it.
//!
//! Errors are serializable as `{ code, message }`, which is what the JSON
//! run report embeds when a step fails.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for loading, preparing and evaluating tables.
#[derive(Error, Debug)]
pub enum PrepError {
    /// A file could not be opened, read or written.
    #[error("IO error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid delimited tabular data.
    #[error("Failed to parse '{path}' as CSV: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// An imputation, encoding or correlation method name was not recognized.
    #[error("Invalid strategy '{name}' (expected one of: {expected})")]
    InvalidStrategy { name: String, expected: String },

    /// A referenced column is absent from the table.
    #[error("Column '{0}' not found in table")]
    UnknownColumn(String),

    /// A category not seen during fitting, under the `Error` unknown policy.
    #[error("Unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// The split ratio is out of range or leaves a partition empty.
    #[error("Invalid test fraction {fraction}: {reason}")]
    InvalidFraction { fraction: f64, reason: String },

    /// Paired inputs have misaligned row counts.
    #[error("Size mismatch: {left} has {left_len} rows but {right} has {right_len}")]
    SizeMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PrepError>,
    },
}

impl PrepError {
    /// Build an [`PrepError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`PrepError::SizeMismatch`] between two named inputs.
    pub fn size_mismatch(
        left: impl Into<String>,
        left_len: usize,
        right: impl Into<String>,
        right_len: usize,
    ) -> Self {
        PrepError::SizeMismatch {
            left: left.into(),
            left_len,
            right: right.into(),
            right_len,
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PrepError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::InvalidStrategy { .. } => "INVALID_STRATEGY",
            Self::UnknownColumn(_) => "UNKNOWN_COLUMN",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::InvalidFraction { .. } => "INVALID_FRACTION",
            Self::SizeMismatch { .. } => "SIZE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Strip any context wrappers and return the underlying error.
    pub fn root(&self) -> &PrepError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PrepError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PrepError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PrepError::Polars(e).with_context(context))
    }
}
