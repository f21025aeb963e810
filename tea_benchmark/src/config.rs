use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::compare::{ComparisonJob, Excerpt};
use crate::models::{io_err, BenchResult};

pub const DEFAULT_CONFIG_FILE: &str = "benchmark_config.json";

/// Where the Python side of the enrichment engine lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub python: PathBuf,
    pub script: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("scripts/tea_env/bin/python"),
            script: PathBuf::from("scripts/tea_runner.py"),
        }
    }
}

/// A dictionary that gets the full per-gene-set treatment (see `benchmark::walker`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedRun {
    /// File name inside `dictionaries_dir`.
    pub dictionary: String,
    /// Directory name inside `output_dir`.
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub output_dir: PathBuf,
    pub dictionaries_dir: PathBuf,
    pub gene_sets_dir: PathBuf,
    pub figures_dir: PathBuf,
    pub alpha: f64,
    pub plot_results: bool,
    pub plot_format: String,
    /// Written in place of missing values in comparison tables.
    pub missing_token: String,
    /// Significant digits of floats in comparison tables.
    pub significant_digits: usize,
    pub engine: EngineConfig,
    pub detailed_runs: Vec<DetailedRun>,
    pub comparisons: Vec<ComparisonJob>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        let detailed_runs = [25, 50, 100, 33]
            .iter()
            .map(|cutoff| DetailedRun {
                dictionary: format!("cutoff{}_threshold0.95_methodany.csv", cutoff),
                output: format!("HGT{}_any_Results", cutoff),
            })
            .collect();

        Self {
            output_dir: PathBuf::from("output"),
            dictionaries_dir: PathBuf::from("input/WS252AnatomyDictionary"),
            gene_sets_dir: PathBuf::from("input/genesets_golden"),
            figures_dir: PathBuf::from("doc/figures"),
            alpha: 0.05,
            plot_results: true,
            plot_format: "pdf".to_string(),
            missing_token: "-".to_string(),
            significant_digits: 2,
            engine: EngineConfig::default(),
            detailed_runs,
            comparisons: default_comparisons(),
        }
    }
}

/// Comparison tables are relative to `output_dir`, excerpts to `figures_dir`.
fn default_comparisons() -> Vec<ComparisonJob> {
    const SPENCER: &str = "WBPaper00024970_GABAergic_neuron_specific_WBbt_0005190_247.csv";
    const WATSON: &str = "WBPaper00037950_GABAergic-motor-neurons_larva_enriched_WBbt_0005190_132.csv";
    let result = |dir: &str, set: &str| Path::new(dir).join(set);
    let comparison = |name: &str| Path::new("comparisons").join(name);

    vec![
        ComparisonJob {
            a: result("HGT33_any_Results", SPENCER),
            b: result("HGT33_any_Results", WATSON),
            suffix_a: "Spencer".to_string(),
            suffix_b: "Watson".to_string(),
            output: comparison("neuronal_comparison_33_WBPaper00024970_with_WBPaper0037950_complete.csv"),
            head: None,
        },
        ComparisonJob {
            a: result("HGT33_any_Results", WATSON),
            b: result("HGT50_any_Results", WATSON),
            suffix_a: "33".to_string(),
            suffix_b: "50".to_string(),
            output: comparison("neuronal_comparison_GABAergic_33-50_WBPaper0037950_complete.csv"),
            head: None,
        },
        ComparisonJob {
            a: result("HGT33_any_Results", SPENCER),
            b: result("HGT50_any_Results", SPENCER),
            suffix_a: "-33".to_string(),
            suffix_b: "-50".to_string(),
            output: comparison("neuronal_comparison_Pan_Neuronal_33-50_WBPaper0031532_complete.csv"),
            head: Some(Excerpt {
                rows: 10,
                output: PathBuf::from("dict-comparison-50-33.csv"),
            }),
        },
    ]
}

impl BenchmarkConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `<root>/benchmark_config.json`
    /// is used when present and the built-in defaults otherwise.
    pub fn load(path: Option<&Path>, root: &Path) -> BenchResult<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (root.join(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            info!("No {} found, using default configuration", path.display());
            return Ok(Self::default());
        }

        let file = File::open(&path).map_err(io_err(&path))?;
        let config: Self = serde_json::from_reader(file)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Anchor the directories and engine paths at `root`.
    ///
    /// Relative paths of comparison jobs are anchored at `output_dir`, and
    /// those of their excerpts at `figures_dir`, so moving the output tree
    /// moves the comparisons with it.
    pub fn resolve(mut self, root: &Path) -> Self {
        fn anchor(p: &mut PathBuf, base: &Path) {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }

        anchor(&mut self.output_dir, root);
        anchor(&mut self.dictionaries_dir, root);
        anchor(&mut self.gene_sets_dir, root);
        anchor(&mut self.figures_dir, root);
        anchor(&mut self.engine.python, root);
        anchor(&mut self.engine.script, root);
        for job in &mut self.comparisons {
            anchor(&mut job.a, &self.output_dir);
            anchor(&mut job.b, &self.output_dir);
            anchor(&mut job.output, &self.output_dir);
            if let Some(excerpt) = job.head.as_mut() {
                anchor(&mut excerpt.output, &self.figures_dir);
            }
        }
        self
    }

    pub fn summary_dir(&self) -> PathBuf {
        self.output_dir.join("SummaryInformation")
    }

    pub fn comparisons_dir(&self) -> PathBuf {
        self.output_dir.join("comparisons")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = BenchmarkConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.alpha, 0.05);
        assert_eq!(config.missing_token, "-");
        assert_eq!(config.detailed_runs.len(), 4);
        assert_eq!(config.comparisons.len(), 3);
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(BenchmarkConfig::load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "alpha": 0.01, "significant_digits": 3, "comparisons": [] }"#,
        )
        .unwrap();

        let config = BenchmarkConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.significant_digits, 3);
        assert!(config.comparisons.is_empty());
        assert_eq!(config.plot_format, "pdf");
    }

    #[test]
    fn relative_paths_are_anchored_at_root() {
        let root = Path::new("/data/tea");
        let config = BenchmarkConfig::default().resolve(root);
        assert_eq!(config.output_dir, root.join("output"));
        assert_eq!(config.summary_dir(), root.join("output/SummaryInformation"));
        assert!(config.comparisons[0].a.starts_with(root.join("output/HGT33_any_Results")));
        assert_eq!(
            config.comparisons[2].head.as_ref().unwrap().output,
            root.join("doc/figures/dict-comparison-50-33.csv")
        );
    }

    #[test]
    fn default_comparisons_follow_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"{ "output_dir": "/scratch/bench", "figures_dir": "figs" }"#,
        )
        .unwrap();

        let config = BenchmarkConfig::load(None, dir.path()).unwrap().resolve(dir.path());
        let out = Path::new("/scratch/bench");
        for job in &config.comparisons {
            assert!(job.a.starts_with(out), "{}", job.a.display());
            assert!(job.b.starts_with(out), "{}", job.b.display());
            assert!(job.output.starts_with(out.join("comparisons")), "{}", job.output.display());
        }
        assert_eq!(
            config.comparisons[2].head.as_ref().unwrap().output,
            dir.path().join("figs/dict-comparison-50-33.csv")
        );
    }
}
