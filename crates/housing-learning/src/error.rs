//! Error types for the housing-learning crate.
//!
//! [`LearningError`] wraps every preparation failure from `housing_prep` and
//! adds the conditions specific to fitting and applying a regressor.

use housing_prep::PrepError;
use thiserror::Error;

/// The main error type for training and prediction.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// A loading, preparation or evaluation step failed.
    #[error(transparent)]
    Prep(#[from] PrepError),

    /// The least-squares system could not be solved.
    ///
    /// Usually the design matrix is empty or contains non-finite values.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// `predict` was called before `fit`.
    #[error("Model '{0}' has not been fitted")]
    NotFitted(String),

    /// Training or prediction input is unusable.
    ///
    /// Common causes:
    /// - The target column contains nulls
    /// - The feature width differs from the fitted width
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<polars::prelude::PolarsError> for LearningError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        LearningError::Prep(PrepError::Polars(err))
    }
}

impl LearningError {
    /// Stable machine-readable code, delegating to the preparation error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Prep(e) => e.error_code(),
            Self::SingularSystem(_) => "SINGULAR_SYSTEM",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LearningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prep_errors_keep_their_code() {
        let err: LearningError = PrepError::UnknownColumn("SalePrice".into()).into();
        assert_eq!(err.error_code(), "UNKNOWN_COLUMN");
        assert!(err.to_string().contains("SalePrice"));
    }

    #[test]
    fn test_learning_codes() {
        assert_eq!(LearningError::NotFitted("ols".into()).error_code(), "NOT_FITTED");
        assert_eq!(
            LearningError::SingularSystem("empty".into()).to_string(),
            "Singular system: empty"
        );
    }
}
