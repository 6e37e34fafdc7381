//! CSV loading and saving.
//!
//! Tables are read with a header row and a schema inferred from the whole
//! file, so integer, float and text columns come back with the dtype they
//! were written with. The markers in [`NULL_MARKERS`] (`NA` among them, as
//! used throughout the Kaggle house-prices files) are read as nulls.

use crate::error::{PrepError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default training file name inside the data directory.
pub const DEFAULT_TRAIN_FILE: &str = "train.csv";

/// Default evaluation file name inside the data directory.
pub const DEFAULT_TEST_FILE: &str = "test.csv";

/// Cell values read as missing in every column.
pub const NULL_MARKERS: [&str; 5] = ["NA", "NaN", "N/A", "null", ""];

/// Load the training and evaluation tables from `data_dir`.
///
/// # Example
///
/// ```rust,ignore
/// use housing_prep::loader::{load_data, DEFAULT_TEST_FILE, DEFAULT_TRAIN_FILE};
///
/// let (train, test) = load_data("data/raw", DEFAULT_TRAIN_FILE, DEFAULT_TEST_FILE)?;
/// println!("train: {:?}, test: {:?}", train.shape(), test.shape());
/// ```
pub fn load_data(
    data_dir: impl AsRef<Path>,
    train_file: &str,
    test_file: &str,
) -> Result<(DataFrame, DataFrame)> {
    let data_dir = data_dir.as_ref();
    let train = load_csv(data_dir.join(train_file)).context("Loading training table")?;
    let test = load_csv(data_dir.join(test_file)).context("Loading evaluation table")?;
    Ok((train, test))
}

/// Load a single CSV file with a header row.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PrepError::io(path, e))?;

    debug!("Reading CSV: {}", path.display());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(
                    NULL_MARKERS.iter().map(|m| (*m).into()).collect(),
                ))),
        )
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| parse_error(path, e))?;

    info!("Loaded {} ({} rows x {} columns)", path.display(), df.height(), df.width());
    Ok(df)
}

/// Save a table as CSV with a header row, creating parent directories.
pub fn save_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PrepError::io(parent, e))?;
    }

    let mut file = File::create(path).map_err(|e| PrepError::io(path, e))?;
    let mut out = df.clone();

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut out)
        .map_err(|e| match e {
            PolarsError::IO { error, .. } => PrepError::io(
                path,
                std::io::Error::new(error.kind(), error.to_string()),
            ),
            other => PrepError::Polars(other),
        })?;

    info!("Saved {} ({} rows x {} columns)", path.display(), df.height(), df.width());
    Ok(path.to_path_buf())
}

fn parse_error(path: &Path, err: PolarsError) -> PrepError {
    PrepError::Parse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}
