//! Post-processing of the executive summary ledger.

use std::path::Path;

use polars::prelude::*;
use tracing::{info, warn};

use crate::benchmark::ledger::{EXECUTIVE_SUMMARY, LEDGER_HEADER};
use crate::config::BenchmarkConfig;
use crate::helper_functions::{read_csv, write_csv};
use crate::models::{require_columns, BenchResult};

pub const TISSUE_NUMBERS: &str = "TissueNumbers.csv";
pub const CONFIGURATION_OVERVIEW: &str = "ConfigurationOverview.csv";

fn configuration_keys() -> [Expr; 3] {
    [col("NoAnnotations"), col("Threshold"), col("Method")]
}

/// Read the ledger, drop runs with undefined averages, add `fracTissues`
/// (share of tested tissues that came back significant) and sort by
/// configuration.
pub fn load_summary(path: &Path) -> BenchResult<DataFrame> {
    let df = read_csv(path, None)?;
    require_columns(&df, &LEDGER_HEADER, &path.display().to_string())?;

    let df = df
        .lazy()
        .with_columns([
            col("AvgFold").cast(DataType::Float64),
            col("AvgQ").cast(DataType::Float64),
        ])
        .collect()?;

    let incomplete = incomplete_runs(&df)?;
    if !incomplete.is_empty() {
        warn!("Dropping {} runs without enrichment averages", incomplete.len());
        for run in &incomplete {
            info!("  no averages for {}", run);
        }
    }

    let df = df
        .drop_nulls::<String>(None)?
        .lazy()
        .with_column(
            (col("TissuesReturned").cast(DataType::Float64) / col("TissuesTested").cast(DataType::Float64))
                .alias("fracTissues"),
        )
        .sort_by_exprs(configuration_keys(), SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    info!("{} runs kept from {}", df.height(), path.display());
    Ok(df)
}

/// Configuration and gene set of every run with an undefined average.
fn incomplete_runs(df: &DataFrame) -> BenchResult<Vec<String>> {
    let incomplete = df
        .clone()
        .lazy()
        .filter(col("AvgFold").is_null().or(col("AvgQ").is_null()))
        .select([
            col("NoAnnotations").cast(DataType::Int64),
            col("Threshold").cast(DataType::Float64),
            col("Method").cast(DataType::String),
            col("EnrichmentSetUsed").cast(DataType::String),
        ])
        .collect()?;

    let cutoffs = incomplete.column("NoAnnotations")?.i64()?;
    let thresholds = incomplete.column("Threshold")?.f64()?;
    let methods = incomplete.column("Method")?.str()?;
    let sets = incomplete.column("EnrichmentSetUsed")?.str()?;

    Ok(cutoffs
        .into_iter()
        .zip(thresholds)
        .zip(methods)
        .zip(sets)
        .map(|(((cutoff, threshold), method), set)| {
            format!(
                "{} (cutoff {} / threshold {} / method {})",
                set.unwrap_or("?"),
                cutoff.map_or("?".to_string(), |c| c.to_string()),
                threshold.map_or("?".to_string(), |t| t.to_string()),
                method.unwrap_or("?"),
            )
        })
        .collect())
}

/// Number of tissue terms of every dictionary configuration.
pub fn dictionary_sizes(summary: &DataFrame) -> BenchResult<DataFrame> {
    Ok(summary
        .clone()
        .lazy()
        .group_by(configuration_keys())
        .agg([col("TissuesTested").first()])
        .sort_by_exprs(configuration_keys(), SortMultipleOptions::default())
        .select([
            col("NoAnnotations").alias("Annotation Cutoff"),
            col("Threshold").alias("Similarity Threshold"),
            col("Method"),
            col("TissuesTested").alias("No. Of Terms in Dictionary"),
        ])
        .collect()?)
}

/// Per configuration: run count plus mean and median of `fracTissues`,
/// `AvgQ` and `AvgFold` across gene sets.
pub fn configuration_overview(summary: &DataFrame) -> BenchResult<DataFrame> {
    let mut aggs = vec![col("EnrichmentSetUsed").count().alias("Runs")];
    for measure in ["fracTissues", "AvgQ", "AvgFold"] {
        aggs.push(col(measure).mean().alias(format!("Mean{}", measure).as_str()));
        aggs.push(col(measure).median().alias(format!("Median{}", measure).as_str()));
    }

    Ok(summary
        .clone()
        .lazy()
        .group_by(configuration_keys())
        .agg(aggs)
        .sort_by_exprs(configuration_keys(), SortMultipleOptions::default())
        .collect()?)
}

/// Load the ledger and write the derived tables next to it (and the
/// dictionary sizes into the figures directory).
pub fn summarize(config: &BenchmarkConfig) -> BenchResult<DataFrame> {
    let summary_dir = config.summary_dir();
    let summary = load_summary(&summary_dir.join(EXECUTIVE_SUMMARY))?;

    let mut sizes = dictionary_sizes(&summary)?;
    write_csv(&mut sizes, summary_dir.join(TISSUE_NUMBERS), None)?;
    write_csv(&mut sizes, config.figures_dir.join(TISSUE_NUMBERS), None)?;

    let mut overview = configuration_overview(&summary)?;
    write_csv(&mut overview, summary_dir.join(CONFIGURATION_OVERVIEW), None)?;

    info!(
        "Summarized {} runs over {} dictionary configurations",
        summary.height(),
        sizes.height()
    );
    Ok(summary)
}
