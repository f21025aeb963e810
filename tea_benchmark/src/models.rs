use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, PolarsError};
use thiserror::Error;

// Column headers written by the enrichment engine
pub const TISSUE: &str = "Tissue";
pub const Q_VALUE: &str = "Q value";
pub const FOLD_CHANGE: &str = "Enrichment Fold Change";
pub const EXPECTED: &str = "Expected";
pub const OBSERVED: &str = "Observed";

/// Columns every persisted enrichment result must carry.
pub const REQUIRED_RESULT_COLUMNS: [&str; 4] = [TISSUE, Q_VALUE, FOLD_CHANGE, OBSERVED];

/// Gene identifier column of a gold-standard gene set.
pub const GENE: &str = "gene";

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{source_name}: missing required column(s) {missing:?}")]
    Schema {
        source_name: String,
        missing: Vec<String>,
    },

    #[error("comparison suffixes must differ, both are '{suffix}'")]
    Conflict { suffix: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected file name '{name}', expected {expected}")]
    FileName { name: String, expected: &'static str },

    #[error("enrichment engine failed: {0}")]
    Engine(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;

/// Attach the offending path to an `io::Error`.
pub fn io_err(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> BenchError {
    let path = path.as_ref().to_path_buf();
    move |source| BenchError::Io { path, source }
}

/// Check that `df` carries every column in `required`, reporting all that are absent.
pub fn require_columns(df: &DataFrame, required: &[&str], source_name: &str) -> BenchResult<()> {
    let schema = df.schema();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !schema.contains(name))
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BenchError::Schema {
            source_name: source_name.to_string(),
            missing,
        })
    }
}

/// Anything on disk the benchmark reads as a table.
pub trait Dataset {
    fn load(&self) -> BenchResult<DataFrame>;
}
