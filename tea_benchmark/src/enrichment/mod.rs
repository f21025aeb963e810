//! The enrichment engine is an external collaborator: it takes a gene list
//! and a tissue dictionary and returns a result table plus the genes it
//! could not place. The benchmark only drives it.

pub mod python_tea;

use std::path::Path;

use polars::prelude::*;

use crate::data_handling::tissue_dictionary::TissueDictionary;
use crate::models::{BenchResult, FOLD_CHANGE, Q_VALUE};

pub trait EnrichmentEngine {
    fn enrichment_analysis(
        &self,
        genes: &[String],
        dictionary: &TissueDictionary,
        alpha: f64,
    ) -> BenchResult<EnrichmentOutcome>;

    /// Render `table` into `out_dir`. Write-only; nothing reads the figure back.
    fn plot_enrichment_results(
        &self,
        table: &DataFrame,
        title: &str,
        out_dir: &Path,
        ftype: &str,
    ) -> BenchResult<()>;
}

#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    /// Validated result table, one row per significant tissue term.
    pub table: DataFrame,
    /// Input genes absent from the dictionary.
    pub unused: Vec<String>,
}

impl EnrichmentOutcome {
    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }

    pub fn mean_fold_change(&self) -> BenchResult<Option<f64>> {
        Ok(self.table.column(FOLD_CHANGE)?.f64()?.mean())
    }

    pub fn mean_q_value(&self) -> BenchResult<Option<f64>> {
        Ok(self.table.column(Q_VALUE)?.f64()?.mean())
    }
}
