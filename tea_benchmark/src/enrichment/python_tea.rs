use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use polars::prelude::*;
use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::data_handling::enrichment_results::validate_result_table;
use crate::data_handling::tissue_dictionary::TissueDictionary;
use crate::enrichment::{EnrichmentEngine, EnrichmentOutcome};
use crate::helper_functions::read_csv;
use crate::models::{io_err, BenchError, BenchResult};

/// Runs the Python enrichment library through `scripts/tea_runner.py`.
///
/// Inputs and outputs are exchanged through files in a scratch directory
/// that is removed when the call returns.
pub struct PythonTea {
    pub python: PathBuf,
    pub script: PathBuf,
}

impl PythonTea {
    pub fn new(config: &EngineConfig, root: &Path) -> Self {
        Self {
            python: root.join(&config.python),
            script: root.join(&config.script),
        }
    }

    fn run(&self, command: &mut Command, what: &str) -> BenchResult<()> {
        debug!("Running {:?}", command);
        let output = command
            .output()
            .map_err(|e| BenchError::Engine(format!("could not start {}: {}", self.python.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("{} failed:\n{}", what, stderr);
            return Err(BenchError::Engine(format!("{} failed: {}", what, stderr.trim())));
        }
        debug!("{} stdout:\n{}", what, String::from_utf8_lossy(&output.stdout));
        Ok(())
    }
}

fn scratch_dir() -> BenchResult<TempDir> {
    tempfile::tempdir().map_err(io_err(std::env::temp_dir()))
}

impl EnrichmentEngine for PythonTea {
    fn enrichment_analysis(
        &self,
        genes: &[String],
        dictionary: &TissueDictionary,
        alpha: f64,
    ) -> BenchResult<EnrichmentOutcome> {
        let scratch = scratch_dir()?;
        let genes_path = scratch.path().join("genes.txt");
        let output_path = scratch.path().join("results.csv");
        let unused_path = scratch.path().join("unused.txt");

        {
            let mut f = File::create(&genes_path).map_err(io_err(&genes_path))?;
            for gene in genes {
                writeln!(f, "{}", gene).map_err(io_err(&genes_path))?;
            }
        }

        info!(
            "Enrichment analysis of {} genes against {}",
            genes.len(),
            dictionary.params
        );
        self.run(
            Command::new(&self.python)
                .arg(&self.script)
                .arg("analyse")
                .arg("--genes").arg(&genes_path)
                .arg("--dictionary").arg(&dictionary.path)
                .arg("--alpha").arg(alpha.to_string())
                .arg("--output").arg(&output_path)
                .arg("--unused").arg(&unused_path),
            "enrichment analysis",
        )?;

        let table = read_csv(&output_path, None)?;
        let table = validate_result_table(table, "enrichment engine output")?;

        let unused = fs::read_to_string(&unused_path)
            .map_err(io_err(&unused_path))?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(EnrichmentOutcome { table, unused })
    }

    fn plot_enrichment_results(
        &self,
        table: &DataFrame,
        title: &str,
        out_dir: &Path,
        ftype: &str,
    ) -> BenchResult<()> {
        let scratch = scratch_dir()?;
        let input_path = scratch.path().join("results.csv");
        {
            let mut f = File::create(&input_path).map_err(io_err(&input_path))?;
            CsvWriter::new(&mut f).include_header(true).finish(&mut table.clone())?;
        }
        fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;

        self.run(
            Command::new(&self.python)
                .arg(&self.script)
                .arg("plot")
                .arg("--input").arg(&input_path)
                .arg("--title").arg(title)
                .arg("--out-dir").arg(out_dir)
                .arg("--ftype").arg(ftype),
            "enrichment plot",
        )?;
        info!("Plotted {} into {}", title, out_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_interpreter_is_an_engine_error() {
        let engine = PythonTea {
            python: PathBuf::from("/no/such/python"),
            script: PathBuf::from("tea_runner.py"),
        };
        let dictionary = TissueDictionary::from_path("cutoff25_threshold0.95_methodany.csv").unwrap();

        let err = engine
            .enrichment_analysis(&["WBGene00000001".to_string()], &dictionary, 0.05)
            .unwrap_err();
        assert!(matches!(err, BenchError::Engine(_)));
    }
}
