use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use polars::prelude::*;
use regex::Regex;
use tracing::info;

use crate::helper_functions::read_csv;
use crate::models::{require_columns, BenchError, BenchResult, Dataset, GENE};

// <source>_<label>[_WBbt_<term>_<size>].<ext>, e.g.
// WBPaper00024970_GABAergic_neuron_specific_WBbt_0005190_247.csv
static GENE_SET_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<source>[A-Za-z]+\d+)_(?P<label>.+?)(?:_WBbt_\d+_\d+)?\.(?:csv|txt)$")
        .expect("gene set file name pattern")
});

const GENE_SET_NAME_HINT: &str = "<source><digits>_<label>[_WBbt_<term>_<size>].csv";

/// A gold-standard gene set.
#[derive(Debug)]
pub struct GeneSet {
    pub path: PathBuf,
    /// File name, used as the set's identifier in the summary ledger.
    pub file_name: String,
    /// Label with the source prefix and anatomy suffix stripped.
    pub short_name: String,
}

impl GeneSet {
    pub fn from_path(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let short_name = GENE_SET_NAME
            .captures(&file_name)
            .map(|caps| caps["label"].to_string())
            .ok_or_else(|| BenchError::FileName {
                name: file_name.clone(),
                expected: GENE_SET_NAME_HINT,
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            short_name,
        })
    }

    /// File name without its extension; result tables are named after it.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone())
    }

    pub fn genes(&self) -> BenchResult<Vec<String>> {
        let df = self.load()?;
        let genes = df
            .column(GENE)?
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(genes)
    }
}

impl Dataset for GeneSet {
    fn load(&self) -> BenchResult<DataFrame> {
        info!("Reading gene set {}", self.file_name);
        let df = read_csv(&self.path, None)?;
        require_columns(&df, &[GENE], &self.file_name)?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_drops_source_and_anatomy_suffix() {
        let set = GeneSet::from_path("sets/WBPaper00024970_GABAergic_neuron_specific_WBbt_0005190_247.csv").unwrap();
        assert_eq!(set.short_name, "GABAergic_neuron_specific");
        assert_eq!(set.stem(), "WBPaper00024970_GABAergic_neuron_specific_WBbt_0005190_247");
        assert_eq!(set.file_name, "WBPaper00024970_GABAergic_neuron_specific_WBbt_0005190_247.csv");

        let set = GeneSet::from_path("WBPaper00031532_Pan_Neuronal.csv").unwrap();
        assert_eq!(set.short_name, "Pan_Neuronal");
    }

    #[test]
    fn unexpected_name_fails_loudly() {
        let err = GeneSet::from_path("neurons.csv").unwrap_err();
        assert!(matches!(err, BenchError::FileName { .. }));
    }

    #[test]
    fn reads_gene_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("WBPaper00000001_test.csv");
        std::fs::write(&path, "gene,score\nWBGene00000001,1\nWBGene00000002,2\n").unwrap();

        let genes = GeneSet::from_path(&path).unwrap().genes().unwrap();
        assert_eq!(genes, vec!["WBGene00000001", "WBGene00000002"]);
    }

    #[test]
    fn gene_column_is_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("WBPaper00000001_test.csv");
        std::fs::write(&path, "wbid\nWBGene00000001\n").unwrap();

        let err = GeneSet::from_path(&path).unwrap().genes().unwrap_err();
        assert!(matches!(err, BenchError::Schema { .. }));
    }
}
