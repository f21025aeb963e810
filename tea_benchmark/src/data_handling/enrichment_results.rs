use std::path::PathBuf;

use polars::prelude::*;
use tracing::{error, info};

use crate::helper_functions::read_csv;
use crate::models::{
    require_columns, BenchResult, Dataset, EXPECTED, FOLD_CHANGE, OBSERVED, Q_VALUE,
    REQUIRED_RESULT_COLUMNS, TISSUE,
};

/// A result table persisted by the enrichment engine (or by the walker,
/// with a leading `#<gene set>` comment line).
pub struct EnrichmentResultFile {
    pub path: PathBuf,
}

impl Dataset for EnrichmentResultFile {
    fn load(&self) -> BenchResult<DataFrame> {
        info!("Reading enrichment results from {}", self.path.display());
        let df = read_csv(&self.path, None)?;

        validate_result_table(df, &self.path.display().to_string()).map_err(|e| {
            error!("Rejected {}: {}", self.path.display(), e);
            e
        })
    }
}

/// Check the result schema and normalise column types.
///
/// A header-only file parses every column as a string, so `Tissue` is forced
/// to `String` and the numeric columns to `Float64` to keep joins between
/// empty and non-empty tables well-typed.
pub fn validate_result_table(df: DataFrame, source_name: &str) -> BenchResult<DataFrame> {
    require_columns(&df, &REQUIRED_RESULT_COLUMNS, source_name)?;

    let mut casts = vec![
        col(TISSUE).cast(DataType::String),
        col(Q_VALUE).cast(DataType::Float64),
        col(FOLD_CHANGE).cast(DataType::Float64),
        col(OBSERVED).cast(DataType::Float64),
    ];
    if df.schema().contains(EXPECTED) {
        casts.push(col(EXPECTED).cast(DataType::Float64));
    }

    Ok(df.lazy().with_columns(casts).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BenchError;

    #[test]
    fn reads_file_with_comment_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("set.csv");
        std::fs::write(
            &path,
            "#WBPaper00024970_GABAergic_neuron_specific\n\
             Tissue,Expected,Observed,Enrichment Fold Change,Q value\n\
             Neuron,1.5,6,4,0.001\n\
             Pharynx,2,3,1.5,0.04\n",
        )
        .unwrap();

        let df = EnrichmentResultFile { path }.load().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column(FOLD_CHANGE).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(TISSUE).unwrap().str().unwrap().get(0), Some("Neuron"));
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Tissue,Expected\nNeuron,1\n").unwrap();

        let loaded = EnrichmentResultFile { path }.load();
        match loaded {
            Err(BenchError::Schema { missing, .. }) => {
                assert_eq!(missing, vec![Q_VALUE, FOLD_CHANGE, OBSERVED]);
            }
            other => panic!("expected schema error, got {:?}", other.map(|df| df.shape())),
        }
    }

    #[test]
    fn header_only_file_gets_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "Tissue,Expected,Observed,Enrichment Fold Change,Q value\n").unwrap();

        let df = EnrichmentResultFile { path }.load().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.column(Q_VALUE).unwrap().dtype(), &DataType::Float64);
    }
}
