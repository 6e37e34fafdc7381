//! Stand-alone categorical conversion.
//!
//! Unlike the fitted [`crate::transform`] pipeline, these conversions learn
//! their categories from the table they are applied to. They are meant for
//! exploratory work on a single table.

use crate::error::{PrepError, Result};
use crate::utils::{ColumnKind, columns_of_kind, series_of, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::debug;

/// How categorical columns are turned into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingMethod {
    /// One `UInt8` dummy column per category, named `{column}_{category}`.
    OneHot { drop_first: bool },
    /// Replace each value by its index in the sorted category list.
    Label,
}

impl Default for EncodingMethod {
    fn default() -> Self {
        EncodingMethod::OneHot { drop_first: false }
    }
}

impl FromStr for EncodingMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onehot" | "one-hot" => Ok(EncodingMethod::default()),
            "label" => Ok(EncodingMethod::Label),
            _ => Err(PrepError::InvalidStrategy {
                name: s.to_string(),
                expected: "onehot, label".to_string(),
            }),
        }
    }
}

/// Sorted distinct non-null categories of a column.
fn categories(values: &[Option<String>]) -> Vec<String> {
    values
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Convert categorical columns to numeric form.
///
/// `columns` defaults to every text column. With one-hot encoding the source
/// column is removed and its dummies are appended at the end of the table;
/// missing values get an all-zero row. With label encoding missing values
/// stay missing.
pub fn convert_categories(
    df: &DataFrame,
    columns: Option<&[&str]>,
    method: EncodingMethod,
) -> Result<DataFrame> {
    let targets: Vec<String> = match columns {
        Some(cols) => cols.iter().map(|c| c.to_string()).collect(),
        None => columns_of_kind(df, ColumnKind::Text),
    };

    let mut out = df.clone();
    for name in &targets {
        let values = text_values(series_of(df, name)?)?;
        let cats = categories(&values);

        match method {
            EncodingMethod::OneHot { drop_first } => {
                out = out.drop(name)?;
                let skip = usize::from(drop_first && !cats.is_empty());
                for cat in cats.iter().skip(skip) {
                    let dummy: Vec<u8> = values
                        .iter()
                        .map(|v| u8::from(v.as_deref() == Some(cat.as_str())))
                        .collect();
                    out.with_column(Series::new(format!("{name}_{cat}").into(), dummy))?;
                }
                debug!("One-hot encoded '{}' into {} column(s)", name, cats.len() - skip);
            }
            EncodingMethod::Label => {
                let codes: Vec<Option<u32>> = values
                    .iter()
                    .map(|v| {
                        v.as_ref()
                            .and_then(|v| cats.binary_search(v).ok())
                            .map(|idx| idx as u32)
                    })
                    .collect();
                out.replace(name, Series::new(name.as_str().into(), codes))?;
                debug!("Label encoded '{}' with {} categories", name, cats.len());
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df![
            "LotArea" => [8450i64, 9600, 11250],
            "MSZoning" => [Some("RL"), Some("RM"), None],
            "Street" => ["Pave", "Grvl", "Pave"],
        ]
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_one_hot_without_drop_first() {
        let out = convert_categories(&sample(), None, EncodingMethod::default()).unwrap();

        assert_eq!(
            names(&out),
            vec!["LotArea", "MSZoning_RL", "MSZoning_RM", "Street_Grvl", "Street_Pave"]
        );
        let rl: Vec<Option<u8>> = out.column("MSZoning_RL").unwrap().u8().unwrap().into_iter().collect();
        assert_eq!(rl, vec![Some(1), Some(0), Some(0)]);
        let rm: Vec<Option<u8>> = out.column("MSZoning_RM").unwrap().u8().unwrap().into_iter().collect();
        assert_eq!(rm, vec![Some(0), Some(1), Some(0)]);
    }

    #[test]
    fn test_one_hot_drop_first() {
        let out = convert_categories(
            &sample(),
            Some(&["Street"]),
            EncodingMethod::OneHot { drop_first: true },
        )
        .unwrap();
        assert_eq!(names(&out), vec!["LotArea", "MSZoning", "Street_Pave"]);
    }

    #[test]
    fn test_label_encoding() {
        let out = convert_categories(&sample(), None, EncodingMethod::Label).unwrap();
        let zoning: Vec<Option<u32>> = out.column("MSZoning").unwrap().u32().unwrap().into_iter().collect();
        assert_eq!(zoning, vec![Some(0), Some(1), None]);
        let street: Vec<Option<u32>> = out.column("Street").unwrap().u32().unwrap().into_iter().collect();
        assert_eq!(street, vec![Some(1), Some(0), Some(1)]);
    }

    #[test]
    fn test_method_names() {
        assert_eq!("label".parse::<EncodingMethod>().unwrap(), EncodingMethod::Label);
        assert_eq!(
            "onehot".parse::<EncodingMethod>().unwrap(),
            EncodingMethod::OneHot { drop_first: false }
        );
        assert!(matches!(
            "ordinal".parse::<EncodingMethod>(),
            Err(PrepError::InvalidStrategy { .. })
        ));
    }
}
