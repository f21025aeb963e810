use tracing::{debug, info};

use crate::benchmark::ledger::{RunSummary, SummaryLedger, EXECUTIVE_SUMMARY};
use crate::benchmark::{dictionaries, gene_sets};
use crate::config::BenchmarkConfig;
use crate::data_handling::tissue_dictionary::DictionaryShape;
use crate::enrichment::EnrichmentEngine;
use crate::helper_functions::write_csv;
use crate::models::{BenchResult, Dataset};

/// Run every dictionary against every gene set.
///
/// Each result table goes to `<output>/HGT<cutoff>_<method>_<threshold>_Results/<set>.csv`
/// and each run adds a [`RunSummary`] to the returned ledger, which is also
/// written to `<output>/SummaryInformation/ExecutiveSummary.csv` once all runs
/// are done. The first failing run aborts the batch; result tables already
/// written stay on disk.
pub fn run_batch<E: EnrichmentEngine>(engine: &E, config: &BenchmarkConfig) -> BenchResult<SummaryLedger> {
    let dictionaries = dictionaries(&config.dictionaries_dir)?;
    let sets = gene_sets(&config.gene_sets_dir)?;
    info!(
        "Benchmarking {} dictionaries against {} gene sets",
        dictionaries.len(),
        sets.len()
    );

    // gene lists do not change between dictionaries
    let gene_lists = sets
        .iter()
        .map(|set| set.genes())
        .collect::<BenchResult<Vec<_>>>()?;

    let mut ledger = SummaryLedger::new();

    for dictionary in &dictionaries {
        let shape = DictionaryShape::of(&dictionary.load()?);
        let results_dir = config.output_dir.join(dictionary.params.results_dir_name());
        info!(
            "Dictionary {}: {} tissues, {} genes",
            dictionary.params, shape.tissues_tested, shape.genes_in_dict
        );

        for (set, genes) in sets.iter().zip(&gene_lists) {
            let outcome = engine.enrichment_analysis(genes, dictionary, config.alpha)?;

            let result_path = results_dir.join(format!("{}.csv", set.stem()));
            write_csv(&mut outcome.table.clone(), &result_path, None)?;
            debug!("Saved {} result rows to {}", outcome.table.height(), result_path.display());

            if config.plot_results && !outcome.is_empty() {
                engine.plot_enrichment_results(&outcome.table, &set.stem(), &results_dir, &config.plot_format)?;
            }

            ledger.push(RunSummary {
                annotation_cutoff: dictionary.params.annotation_cutoff,
                threshold: dictionary.params.threshold,
                method: dictionary.params.method.clone(),
                gene_set: set.file_name.clone(),
                tissues_tested: shape.tissues_tested,
                genes_submitted: genes.len(),
                tissues_returned: outcome.table.height(),
                genes_used: genes.len().saturating_sub(outcome.unused.len()),
                avg_fold: outcome.mean_fold_change()?,
                avg_q: outcome.mean_q_value()?,
                genes_in_dict: shape.genes_in_dict,
            });
        }
    }

    ledger.flush(&config.summary_dir().join(EXECUTIVE_SUMMARY))?;
    Ok(ledger)
}
