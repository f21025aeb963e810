//! Command-line interface of the TEA benchmark.
//!
//! - `tea-benchmark run` does everything, in the order of the subcommands below
//! - `tea-benchmark compare --a x.csv --b y.csv --suffix-a 33 --suffix-b 50 --output cmp.csv`

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Benchmark tissue enrichment analysis over dictionaries and gold-standard gene sets.
#[derive(Parser, Debug)]
#[command(name = "tea-benchmark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file. Defaults to `benchmark_config.json` in the
    /// project root, or built-in defaults if that file does not exist.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Batch, summarize, detailed walks and configured comparisons
    Run,

    /// Run every dictionary against every gene set and write the executive summary
    Batch,

    /// Post-process the executive summary into per-configuration tables
    Summarize,

    /// Run every gene set against each dictionary listed under `detailed_runs`
    Walk,

    /// Compare two enrichment result tables
    Compare {
        /// First result table
        #[arg(long)]
        a: PathBuf,

        /// Second result table
        #[arg(long)]
        b: PathBuf,

        /// Appended to the columns coming from the first table
        #[arg(long, allow_hyphen_values = true)]
        suffix_a: String,

        /// Appended to the columns coming from the second table
        #[arg(long, allow_hyphen_values = true)]
        suffix_b: String,

        /// Where to write the comparison
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the first N rows to this file
        #[arg(long, requires = "head_output")]
        head: Option<usize>,

        #[arg(long)]
        head_output: Option<PathBuf>,
    },

    /// Run only the comparisons listed in the configuration
    Comparisons,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_arguments() {
        let cli = Cli::try_parse_from([
            "tea-benchmark", "compare", "--a", "x.csv", "--b", "y.csv", "--suffix-a", "-33",
            "--suffix-b", "-50", "-o", "out.csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Compare { suffix_a, suffix_b, head, .. } => {
                assert_eq!(suffix_a, "-33");
                assert_eq!(suffix_b, "-50");
                assert_eq!(head, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn head_needs_an_output() {
        let res = Cli::try_parse_from([
            "tea-benchmark", "compare", "--a", "x.csv", "--b", "y.csv", "--suffix-a", "A",
            "--suffix-b", "B", "-o", "out.csv", "--head", "10",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn config_is_global() {
        let cli = Cli::try_parse_from(["tea-benchmark", "batch", "--config", "bench.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bench.json")));
        assert!(matches!(cli.command, Commands::Batch));
    }
}
