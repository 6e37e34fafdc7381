//! Seeded train/test splitting.
//!
//! Row order is permuted with `StdRng::seed_from_u64`, so the same seed and
//! the same input always produce the same partition.

use crate::config::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use crate::error::{PrepError, Result, ResultExt};
use crate::utils::text_values;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Options for [`split_data`] and [`split_indices`].
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Fraction of rows in the test partition, strictly between 0 and 1.
    pub test_fraction: f64,
    pub seed: u64,
    /// Class labels whose proportions both partitions should preserve.
    pub stratify: Option<Series>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            stratify: None,
        }
    }
}

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub seed: u64,
    pub stratified: bool,
}

/// Features and target for both partitions.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
    pub split: Split,
}

fn validate_fraction(fraction: f64) -> Result<()> {
    if fraction > 0.0 && fraction < 1.0 {
        Ok(())
    } else {
        Err(PrepError::InvalidFraction {
            fraction,
            reason: "must be strictly between 0 and 1".to_string(),
        })
    }
}

/// Partition `0..n_rows` into train and test indices.
///
/// `ceil(n_rows * test_fraction)` rows go to test. When stratified, that
/// total is shared among the classes in proportion to their size: each
/// class gets the floor of its share and the leftover rows go to the
/// classes with the largest fractional remainders (first-seen class wins a
/// tie).
pub fn split_indices(n_rows: usize, options: &SplitOptions) -> Result<Split> {
    validate_fraction(options.test_fraction)?;
    let mut rng = StdRng::seed_from_u64(options.seed);
    let n_test = (n_rows as f64 * options.test_fraction).ceil() as usize;

    let (train, test) = match &options.stratify {
        None => {
            let mut indices: Vec<usize> = (0..n_rows).collect();
            indices.shuffle(&mut rng);
            let test = indices.split_off(n_rows.saturating_sub(n_test));
            (indices, test)
        }
        Some(labels) => {
            if labels.len() != n_rows {
                return Err(PrepError::size_mismatch(
                    "features",
                    n_rows,
                    "stratify",
                    labels.len(),
                ));
            }
            stratified_indices(labels, n_test, &mut rng)?
        }
    };

    if train.is_empty() || test.is_empty() {
        return Err(PrepError::InvalidFraction {
            fraction: options.test_fraction,
            reason: format!(
                "split of {} rows leaves an empty partition (train={}, test={})",
                n_rows,
                train.len(),
                test.len()
            ),
        });
    }

    Ok(Split {
        train,
        test,
        seed: options.seed,
        stratified: options.stratify.is_some(),
    })
}

fn stratified_indices(
    labels: &Series,
    n_test: usize,
    rng: &mut StdRng,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let keys = text_values(labels)?;

    let mut order: HashMap<Option<&str>, usize> = HashMap::new();
    let mut classes: Vec<Vec<usize>> = Vec::new();
    for (row, key) in keys.iter().enumerate() {
        let slot = *order.entry(key.as_deref()).or_insert_with(|| {
            classes.push(Vec::new());
            classes.len() - 1
        });
        classes[slot].push(row);
    }

    let sizes: Vec<usize> = classes.iter().map(Vec::len).collect();
    let allocation = allocate_test_rows(&sizes, n_test);

    let mut train = Vec::new();
    let mut test = Vec::new();
    for (mut members, class_test) in classes.into_iter().zip(allocation) {
        members.shuffle(rng);
        test.extend(members.split_off(members.len() - class_test));
        train.extend(members);
    }

    train.shuffle(rng);
    test.shuffle(rng);
    Ok((train, test))
}

/// Share `n_test` rows among classes of the given sizes.
///
/// Largest-remainder allocation; no class receives more rows than it has.
fn allocate_test_rows(sizes: &[usize], n_test: usize) -> Vec<usize> {
    let total: usize = sizes.iter().sum();
    if total == 0 {
        return vec![0; sizes.len()];
    }
    let n_test = n_test.min(total);

    let shares: Vec<f64> = sizes
        .iter()
        .map(|&size| size as f64 * n_test as f64 / total as f64)
        .collect();
    let mut allocation: Vec<usize> = shares
        .iter()
        .zip(sizes)
        .map(|(share, &size)| (share.floor() as usize).min(size))
        .collect();

    let mut by_remainder: Vec<usize> = (0..sizes.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = shares[a] - shares[a].floor();
        let rb = shares[b] - shares[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    let mut left = n_test - allocation.iter().sum::<usize>();
    while left > 0 {
        let before = left;
        for &class in &by_remainder {
            if left == 0 {
                break;
            }
            if allocation[class] < sizes[class] {
                allocation[class] += 1;
                left -= 1;
            }
        }
        if left == before {
            break;
        }
    }
    allocation
}

fn to_idx(indices: &[usize]) -> IdxCa {
    IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    )
}

/// Split a feature table and its target into train and test partitions.
pub fn split_data(features: &DataFrame, target: &Series, options: SplitOptions) -> Result<SplitData> {
    if features.height() != target.len() {
        return Err(PrepError::size_mismatch(
            "features",
            features.height(),
            "target",
            target.len(),
        ));
    }

    let split = split_indices(features.height(), &options)?;
    let train_idx = to_idx(&split.train);
    let test_idx = to_idx(&split.test);

    info!(
        "Split {} rows into {} train / {} test (seed={}, stratified={})",
        features.height(),
        split.train.len(),
        split.test.len(),
        split.seed,
        split.stratified
    );

    Ok(SplitData {
        x_train: features.take(&train_idx).context("Selecting training rows")?,
        x_test: features.take(&test_idx).context("Selecting test rows")?,
        y_train: target.take(&train_idx)?,
        y_test: target.take(&test_idx)?,
        split,
    })
}
