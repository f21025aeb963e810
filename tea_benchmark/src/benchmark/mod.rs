//! Driving the enrichment engine over dictionaries and gene sets.

pub mod batch;
pub mod ledger;
pub mod walker;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::BenchmarkConfig;
use crate::data_handling::gene_set::GeneSet;
use crate::data_handling::tissue_dictionary::TissueDictionary;
use crate::helper_functions::data_files;
use crate::models::{io_err, BenchResult};

/// Create every output directory the benchmark writes into.
pub fn ensure_output_dirs(config: &BenchmarkConfig) -> BenchResult<()> {
    let mut dirs = vec![
        config.output_dir.clone(),
        config.summary_dir(),
        config.comparisons_dir(),
        config.figures_dir.clone(),
    ];
    dirs.extend(config.detailed_runs.iter().map(|run| config.output_dir.join(&run.output)));

    for dir in &dirs {
        if !dir.exists() {
            info!("Creating {}", dir.display());
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }
    }
    Ok(())
}

/// Every gene set in `dir`; an unparseable file name aborts the listing.
pub fn gene_sets(dir: &Path) -> BenchResult<Vec<GeneSet>> {
    data_files(dir)?.iter().map(GeneSet::from_path).collect()
}

/// Every tissue dictionary in `dir`; an unparseable file name aborts the listing.
pub fn dictionaries(dir: &Path) -> BenchResult<Vec<TissueDictionary>> {
    data_files(dir)?.iter().map(TissueDictionary::from_path).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_creates_all_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = testing::fixture(dir.path());

        ensure_output_dirs(&config).unwrap();
        assert!(config.summary_dir().is_dir());
        assert!(config.comparisons_dir().is_dir());
        assert!(config.figures_dir.is_dir());
        assert!(config.output_dir.join("HGT25_any_Results").is_dir());

        // second call is a no-op
        ensure_output_dirs(&config).unwrap();
    }

    #[test]
    fn listings_skip_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = testing::fixture(dir.path());

        assert_eq!(dictionaries(&config.dictionaries_dir).unwrap().len(), 2);
        let sets = gene_sets(&config.gene_sets_dir).unwrap();
        let names: Vec<&str> = sets.iter().map(|s| s.short_name.as_str()).collect();
        assert_eq!(names, vec!["neurons", "nothing"]);
    }
}
