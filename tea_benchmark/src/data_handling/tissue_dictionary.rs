use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use polars::prelude::*;
use regex::Regex;
use tracing::{debug, info};

use crate::helper_functions::read_csv;
use crate::models::{BenchError, BenchResult, Dataset};

static DICTIONARY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^cutoff(?P<cutoff>\d+)_threshold(?P<threshold>\d*\.?\d+)_method(?P<method>[A-Za-z]+)\.csv$")
        .expect("dictionary file name pattern")
});

const DICTIONARY_NAME_HINT: &str = "cutoff<int>_threshold<float>_method<name>.csv";

/// Build parameters of a tissue dictionary, recovered from its file name.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryParams {
    pub annotation_cutoff: u32,
    pub threshold: f64,
    pub method: String,
}

impl DictionaryParams {
    pub fn from_file_name(name: &str) -> BenchResult<Self> {
        let bad_name = || BenchError::FileName {
            name: name.to_string(),
            expected: DICTIONARY_NAME_HINT,
        };

        let caps = DICTIONARY_NAME.captures(name).ok_or_else(bad_name)?;
        let annotation_cutoff = caps["cutoff"].parse().map_err(|_| bad_name())?;
        let threshold = caps["threshold"].parse().map_err(|_| bad_name())?;

        Ok(Self {
            annotation_cutoff,
            threshold,
            method: caps["method"].to_string(),
        })
    }

    /// Directory name used for the results of every run on this dictionary.
    ///
    /// Carries all three parameters, so dictionaries that differ only in
    /// their threshold never share a directory.
    pub fn results_dir_name(&self) -> String {
        format!("HGT{}_{}_{}_Results", self.annotation_cutoff, self.method, self.threshold)
    }
}

impl fmt::Display for DictionaryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cutoff {} / threshold {} / method {}", self.annotation_cutoff, self.threshold, self.method)
    }
}

/// A tissue dictionary on disk: one gene-identifier column followed by one
/// membership column per tissue term.
#[derive(Debug)]
pub struct TissueDictionary {
    pub path: PathBuf,
    pub params: DictionaryParams,
}

impl TissueDictionary {
    pub fn from_path(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let params = DictionaryParams::from_file_name(&name)?;
        debug!("Dictionary {} -> {}", name, params);

        Ok(Self {
            path: path.to_path_buf(),
            params,
        })
    }
}

impl Dataset for TissueDictionary {
    fn load(&self) -> BenchResult<DataFrame> {
        info!("Reading tissue dictionary from {}", self.path.display());
        read_csv(&self.path, None)
    }
}

/// Size of a loaded dictionary as reported in the executive summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryShape {
    pub tissues_tested: usize,
    pub genes_in_dict: usize,
}

impl DictionaryShape {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            tissues_tested: df.width().saturating_sub(1),
            genes_in_dict: df.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn parses_dictionary_names() {
        let p = DictionaryParams::from_file_name("cutoff25_threshold0.95_methodany.csv").unwrap();
        assert_eq!(
            p,
            DictionaryParams {
                annotation_cutoff: 25,
                threshold: 0.95,
                method: "any".to_string(),
            }
        );
        assert_eq!(p.results_dir_name(), "HGT25_any_0.95_Results");

        let p = DictionaryParams::from_file_name("cutoff100_threshold1_methodavg.csv").unwrap();
        assert_eq!(p.annotation_cutoff, 100);
        assert_eq!(p.threshold, 1.0);
        assert_eq!(p.method, "avg");
        assert_eq!(p.results_dir_name(), "HGT100_avg_1_Results");
    }

    #[test]
    fn thresholds_get_separate_result_directories() {
        let strict = DictionaryParams::from_file_name("cutoff25_threshold0.95_methodany.csv").unwrap();
        let loose = DictionaryParams::from_file_name("cutoff25_threshold0.5_methodany.csv").unwrap();
        assert_ne!(strict.results_dir_name(), loose.results_dir_name());
    }

    #[test]
    fn rejects_unexpected_names() {
        for name in ["cutoff25_methodany.csv", "dictionary.csv", "cutoff25_threshold0.95_methodany.tsv"] {
            assert!(
                matches!(DictionaryParams::from_file_name(name), Err(BenchError::FileName { .. })),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn shape_excludes_gene_column() {
        let df = df![
            "wbid" => &["WBGene1", "WBGene2", "WBGene3"],
            "neuron" => &[1, 0, 1],
            "pharynx" => &[0, 1, 1]
        ]
        .unwrap();

        let shape = DictionaryShape::of(&df);
        assert_eq!(shape.tissues_tested, 2);
        assert_eq!(shape.genes_in_dict, 3);
    }
}
