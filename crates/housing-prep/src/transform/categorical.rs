//! Categorical branch: imputation followed by one-hot encoding.

use super::{CategoricalImputation, UnknownCategoryPolicy};
use crate::error::{PrepError, Result};
use crate::utils::{series_of, text_mode, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Parameters learned for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalParams {
    pub column: String,
    pub fill_value: String,
    /// Sorted categories seen at fit time, the imputed value included.
    pub vocabulary: Vec<String>,
}

impl CategoricalParams {
    pub(crate) fn fit(
        df: &DataFrame,
        column: &str,
        imputation: &CategoricalImputation,
    ) -> Result<Self> {
        let values = text_values(series_of(df, column)?)?;

        let fill_value = match imputation {
            CategoricalImputation::Constant(v) => v.clone(),
            CategoricalImputation::MostFrequent => text_mode(&values).unwrap_or_else(|| {
                warn!(
                    "Column '{}' has no observed values; imputing '{}'",
                    column,
                    CategoricalImputation::DEFAULT_FILL
                );
                CategoricalImputation::DEFAULT_FILL.to_string()
            }),
        };

        let vocabulary: Vec<String> = values
            .into_iter()
            .map(|v| v.unwrap_or_else(|| fill_value.clone()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        debug!(
            "Categorical '{}': fill='{}', {} categories",
            column,
            fill_value,
            vocabulary.len()
        );

        Ok(Self {
            column: column.to_string(),
            fill_value,
            vocabulary,
        })
    }

    /// Output column names, `{column}_{category}` in vocabulary order.
    pub fn feature_names(&self) -> impl Iterator<Item = String> + '_ {
        self.vocabulary
            .iter()
            .map(move |cat| format!("{}_{}", self.column, cat))
    }

    pub(crate) fn apply(&self, df: &DataFrame, policy: UnknownCategoryPolicy) -> Result<Vec<Column>> {
        let values = text_values(series_of(df, &self.column)?)?;
        let mut blocks = vec![vec![0.0f64; values.len()]; self.vocabulary.len()];

        for (row, value) in values.iter().enumerate() {
            let value = value.as_deref().unwrap_or(&self.fill_value);
            match self.vocabulary.binary_search_by(|cat| cat.as_str().cmp(value)) {
                Ok(idx) => blocks[idx][row] = 1.0,
                Err(_) => {
                    if policy == UnknownCategoryPolicy::Error {
                        return Err(PrepError::UnknownCategory {
                            column: self.column.clone(),
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        Ok(self
            .feature_names()
            .zip(blocks)
            .map(|(name, block)| Column::new(name.into(), block))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn zoning() -> DataFrame {
        df!["MSZoning" => [Some("RM"), None, Some("RL"), Some("RL")]].unwrap()
    }

    #[test]
    fn test_constant_fill_enters_vocabulary() {
        let params =
            CategoricalParams::fit(&zoning(), "MSZoning", &CategoricalImputation::default())
                .unwrap();
        assert_eq!(params.fill_value, "missing");
        assert_eq!(params.vocabulary, vec!["RL", "RM", "missing"]);
    }

    #[test]
    fn test_most_frequent_fill() {
        let params =
            CategoricalParams::fit(&zoning(), "MSZoning", &CategoricalImputation::MostFrequent)
                .unwrap();
        assert_eq!(params.fill_value, "RL");
        assert_eq!(params.vocabulary, vec!["RL", "RM"]);
    }

    #[test]
    fn test_unknown_category_policies() {
        let params =
            CategoricalParams::fit(&zoning(), "MSZoning", &CategoricalImputation::default())
                .unwrap();
        let new = df!["MSZoning" => ["FV"]].unwrap();

        let cols = params.apply(&new, UnknownCategoryPolicy::Ignore).unwrap();
        assert_eq!(cols.len(), 3);
        for col in &cols {
            assert_eq!(col.f64().unwrap().get(0), Some(0.0));
        }

        let err = params.apply(&new, UnknownCategoryPolicy::Error).unwrap_err();
        assert!(matches!(err, PrepError::UnknownCategory { ref value, .. } if value == "FV"));
    }
}
