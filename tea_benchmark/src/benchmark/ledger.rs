use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::helper_functions::ensure_parent;
use crate::models::{io_err, BenchResult};

pub const EXECUTIVE_SUMMARY: &str = "ExecutiveSummary.csv";
const LEDGER_COMMENT: &str = "Summary of results from all benchmarks";

pub const LEDGER_HEADER: [&str; 11] = [
    "NoAnnotations",
    "Threshold",
    "Method",
    "EnrichmentSetUsed",
    "TissuesTested",
    "GenesSubmitted",
    "TissuesReturned",
    "GenesUsed",
    "AvgFold",
    "AvgQ",
    "GenesInDict",
];

/// One enrichment run: a dictionary against a gene set.
///
/// Field order matches [`LEDGER_HEADER`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub annotation_cutoff: u32,
    pub threshold: f64,
    pub method: String,
    pub gene_set: String,
    pub tissues_tested: usize,
    pub genes_submitted: usize,
    pub tissues_returned: usize,
    pub genes_used: usize,
    /// `None` when the run returned no tissues.
    pub avg_fold: Option<f64>,
    pub avg_q: Option<f64>,
    pub genes_in_dict: usize,
}

/// Accumulates run summaries in memory; written once with [`SummaryLedger::flush`].
#[derive(Debug, Default)]
pub struct SummaryLedger {
    records: Vec<RunSummary>,
}

impl SummaryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: RunSummary) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RunSummary] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn flush(&self, path: &Path) -> BenchResult<()> {
        ensure_parent(path)?;
        let mut file = File::create(path).map_err(io_err(path))?;
        writeln!(file, "#{}", LEDGER_COMMENT).map_err(io_err(path))?;

        // Header written by hand so that an empty ledger still has one.
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(LEDGER_HEADER)?;
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush().map_err(io_err(path))?;

        info!("Wrote {} run summaries to {}", self.records.len(), path.display());
        Ok(())
    }
}
