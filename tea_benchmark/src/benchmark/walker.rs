use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::benchmark::gene_sets;
use crate::config::BenchmarkConfig;
use crate::data_handling::gene_set::GeneSet;
use crate::data_handling::tissue_dictionary::TissueDictionary;
use crate::enrichment::EnrichmentEngine;
use crate::helper_functions::{ensure_parent, write_csv};
use crate::models::{io_err, BenchResult};

pub const EMPTY_LIST: &str = "empty.txt";

#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub alpha: f64,
    /// Persist results, plots and the empty list; otherwise only report.
    pub save: bool,
    /// Figure format, `None` to skip plotting.
    pub plot_format: Option<String>,
}

/// Gene sets split by whether the engine found any enriched tissue.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WalkReport {
    pub enriched: Vec<String>,
    pub empty: Vec<String>,
}

/// Analyse every gene set against one dictionary.
///
/// Non-empty results are written to `<directory>/<set>.csv` with a leading
/// `#<set file name>` line; gene sets with no enrichment are listed in
/// `<directory>/empty.txt`.
pub fn walk<E: EnrichmentEngine>(
    engine: &E,
    dictionary: &TissueDictionary,
    sets: &[GeneSet],
    directory: &Path,
    options: &WalkOptions,
) -> BenchResult<WalkReport> {
    let mut report = WalkReport::default();

    for set in sets {
        let genes = set.genes()?;
        let outcome = engine.enrichment_analysis(&genes, dictionary, options.alpha)?;

        if outcome.is_empty() {
            report.empty.push(set.file_name.clone());
            continue;
        }

        if options.save {
            let path = directory.join(format!("{}.csv", set.stem()));
            write_csv(&mut outcome.table.clone(), &path, Some(&set.file_name))?;
            if let Some(ftype) = &options.plot_format {
                engine.plot_enrichment_results(&outcome.table, &set.short_name, directory, ftype)?;
            }
        }
        report.enriched.push(set.file_name.clone());
    }

    if options.save {
        write_empty_list(&directory.join(EMPTY_LIST), &report.empty)?;
    }

    info!(
        "{}: {} gene sets enriched, {} without enrichment",
        dictionary.params,
        report.enriched.len(),
        report.empty.len()
    );
    Ok(report)
}

fn write_empty_list(path: &Path, names: &[String]) -> BenchResult<()> {
    ensure_parent(path)?;
    let mut f = File::create(path).map_err(io_err(path))?;
    writeln!(f, "Genesets with no enrichment:").map_err(io_err(path))?;
    for name in names {
        writeln!(f, "{}", name).map_err(io_err(path))?;
    }
    Ok(())
}

/// Walk every dictionary configured under `detailed_runs`.
pub fn run_detailed<E: EnrichmentEngine>(engine: &E, config: &BenchmarkConfig) -> BenchResult<Vec<WalkReport>> {
    let sets = gene_sets(&config.gene_sets_dir)?;
    let options = WalkOptions {
        alpha: config.alpha,
        save: true,
        plot_format: config.plot_results.then(|| config.plot_format.clone()),
    };

    config
        .detailed_runs
        .iter()
        .map(|run| {
            let dictionary = TissueDictionary::from_path(config.dictionaries_dir.join(&run.dictionary))?;
            walk(engine, &dictionary, &sets, &config.output_dir.join(&run.output), &options)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::testing::{fixture, StubEngine};
    use crate::data_handling::enrichment_results::EnrichmentResultFile;
    use crate::models::Dataset;

    #[test]
    fn splits_enriched_and_empty_sets() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture(dir.path());
        let engine = StubEngine::default();

        let reports = run_detailed(&engine, &config).unwrap();
        assert_eq!(
            reports,
            vec![WalkReport {
                enriched: vec!["WBPaper00000001_neurons_WBbt_0005190_3.csv".to_string()],
                empty: vec!["WBPaper00000002_nothing.csv".to_string()],
            }]
        );

        let out = config.output_dir.join("HGT25_any_Results");
        let empty = std::fs::read_to_string(out.join(EMPTY_LIST)).unwrap();
        assert_eq!(empty, "Genesets with no enrichment:\nWBPaper00000002_nothing.csv\n");
        assert!(!out.join("WBPaper00000002_nothing.csv").exists());

        assert_eq!(engine.plots.borrow()[0].0, "neurons");
    }

    #[test]
    fn saved_result_carries_provenance_comment() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture(dir.path());
        run_detailed(&StubEngine::default(), &config).unwrap();

        let path = config
            .output_dir
            .join("HGT25_any_Results/WBPaper00000001_neurons_WBbt_0005190_3.csv");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("#WBPaper00000001_neurons_WBbt_0005190_3.csv\n"));

        let table = EnrichmentResultFile { path }.load().unwrap();
        assert_eq!(table.height(), 1);
    }

    #[test]
    fn dry_walk_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = fixture(dir.path());
        let engine = StubEngine::default();
        let dictionary =
            TissueDictionary::from_path(config.dictionaries_dir.join("cutoff25_threshold0.95_methodany.csv")).unwrap();
        let sets = gene_sets(&config.gene_sets_dir).unwrap();
        let target = dir.path().join("dry");

        let options = WalkOptions {
            alpha: 0.05,
            save: false,
            plot_format: Some("pdf".to_string()),
        };
        let report = walk(&engine, &dictionary, &sets, &target, &options).unwrap();
        assert_eq!(report.enriched.len(), 1);
        assert!(!target.exists());
        assert!(engine.plots.borrow().is_empty());
    }
}
