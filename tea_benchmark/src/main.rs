use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::analysis::compare::{ComparisonJob, Excerpt};
use crate::analysis::summary::summarize;
use crate::benchmark::batch::run_batch;
use crate::benchmark::ensure_output_dirs;
use crate::benchmark::walker::run_detailed;
use crate::cli::{Cli, Commands};
use crate::config::BenchmarkConfig;
use crate::enrichment::python_tea::PythonTea;
use crate::helper_functions::project_root;

mod analysis;
mod benchmark;
mod cli;
mod config;
mod data_handling;
mod enrichment;
mod helper_functions;
mod models;

fn run_comparisons(config: &BenchmarkConfig) -> anyhow::Result<()> {
    for job in &config.comparisons {
        job.run(&config.missing_token, config.significant_digits)
            .with_context(|| format!("comparing {} with {}", job.a.display(), job.b.display()))?;
    }
    info!("{} comparisons written", config.comparisons.len());
    Ok(())
}

fn execute(cli: Cli) -> anyhow::Result<()> {
    let root = project_root();
    let config = BenchmarkConfig::load(cli.config.as_deref(), &root)?.resolve(&root);
    let engine = PythonTea::new(&config.engine, &root);

    match cli.command {
        Commands::Run => {
            ensure_output_dirs(&config)?;
            let ledger = run_batch(&engine, &config)?;
            info!("Batch finished with {} runs", ledger.len());
            summarize(&config)?;
            run_detailed(&engine, &config)?;
            run_comparisons(&config)?;
        }
        Commands::Batch => {
            ensure_output_dirs(&config)?;
            run_batch(&engine, &config)?;
        }
        Commands::Summarize => {
            summarize(&config)?;
        }
        Commands::Walk => {
            ensure_output_dirs(&config)?;
            for report in run_detailed(&engine, &config)? {
                info!("{} enriched, {} empty", report.enriched.len(), report.empty.len());
            }
        }
        Commands::Compare {
            a,
            b,
            suffix_a,
            suffix_b,
            output,
            head,
            head_output,
        } => {
            let job = ComparisonJob {
                a,
                b,
                suffix_a,
                suffix_b,
                output,
                head: head.zip(head_output).map(|(rows, output)| Excerpt { rows, output }),
            };
            let df = job.run(&config.missing_token, config.significant_digits)?;
            println!("{}", df);
        }
        Commands::Comparisons => run_comparisons(&config)?,
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting the TEA benchmark");

    let cli = Cli::parse_args();
    execute(cli).map_err(|e| {
        error!("{:#}", e);
        e
    })
}
