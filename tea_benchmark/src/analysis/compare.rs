//! Side-by-side comparison of two enrichment result tables.
//!
//! Output columns, for suffixes `A` and `B`:
//! ┌────────┬──────────┬──────────┬─────────────────────────┬─────────────────────────┐
//! │ Tissue ┆ Q valueA ┆ Q valueB ┆ Enrichment Fold ChangeA ┆ Enrichment Fold ChangeB │
//! └────────┴──────────┴──────────┴─────────────────────────┴─────────────────────────┘

use std::fs::File;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::data_handling::enrichment_results::EnrichmentResultFile;
use crate::helper_functions::{ensure_parent, format_significant, read_csv};
use crate::models::{
    io_err, require_columns, BenchError, BenchResult, Dataset, FOLD_CHANGE, Q_VALUE,
    REQUIRED_RESULT_COLUMNS, TISSUE,
};

fn suffixed(column: &str, suffix: &str) -> String {
    format!("{}{}", column, suffix)
}

/// Output column names, in output order, for a pair of suffixes.
pub fn comparison_columns(suffix_a: &str, suffix_b: &str) -> [String; 5] {
    [
        TISSUE.to_string(),
        suffixed(Q_VALUE, suffix_a),
        suffixed(Q_VALUE, suffix_b),
        suffixed(FOLD_CHANGE, suffix_a),
        suffixed(FOLD_CHANGE, suffix_b),
    ]
}

/// The compared measures of one table, renamed with its suffix. `Observed`
/// and `Expected` do not enter the join.
fn side(table: &DataFrame, suffix: &str) -> LazyFrame {
    table.clone().lazy().select([
        col(TISSUE).cast(DataType::String),
        col(Q_VALUE)
            .cast(DataType::Float64)
            .alias(suffixed(Q_VALUE, suffix).as_str()),
        col(FOLD_CHANGE)
            .cast(DataType::Float64)
            .alias(suffixed(FOLD_CHANGE, suffix).as_str()),
    ])
}

/// Full outer merge of two result tables on `Tissue`.
///
/// Every tissue of either table appears exactly once; a tissue missing from
/// one side gets nulls in that side's columns. Rows are ordered by the
/// q-value of `table_a`, then of `table_b`, both ascending with nulls last.
/// Neither input is modified.
pub fn compare(
    table_a: &DataFrame,
    table_b: &DataFrame,
    suffix_a: &str,
    suffix_b: &str,
) -> BenchResult<DataFrame> {
    if suffix_a == suffix_b {
        return Err(BenchError::Conflict {
            suffix: suffix_a.to_string(),
        });
    }
    require_columns(table_a, &REQUIRED_RESULT_COLUMNS, &format!("table '{}'", suffix_a))?;
    require_columns(table_b, &REQUIRED_RESULT_COLUMNS, &format!("table '{}'", suffix_b))?;

    let [tissue, q_a, q_b, fc_a, fc_b] = comparison_columns(suffix_a, suffix_b);

    let merged = side(table_a, suffix_a)
        .join(
            side(table_b, suffix_b),
            [col(TISSUE)],
            [col(TISSUE)],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort_by_exprs(
            [col(q_a.as_str()), col(q_b.as_str())],
            SortMultipleOptions::default()
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .select([
            col(tissue.as_str()),
            col(q_a.as_str()),
            col(q_b.as_str()),
            col(fc_a.as_str()),
            col(fc_b.as_str()),
        ])
        .collect()?;

    info!(
        "Compared {} ({} tissues) with {} ({} tissues): {} rows",
        suffix_a,
        table_a.height(),
        suffix_b,
        table_b.height(),
        merged.height()
    );
    Ok(merged)
}

/// Read two persisted result tables and [`compare`] them.
pub fn compare_files(
    path_a: &Path,
    path_b: &Path,
    suffix_a: &str,
    suffix_b: &str,
) -> BenchResult<DataFrame> {
    let table_a = EnrichmentResultFile { path: path_a.to_path_buf() }.load()?;
    let table_b = EnrichmentResultFile { path: path_b.to_path_buf() }.load()?;
    compare(&table_a, &table_b, suffix_a, suffix_b)
}

fn render_column(column: &Column, missing_token: &str, significant_digits: usize) -> BenchResult<Vec<String>> {
    let render = |cell: Option<String>| cell.unwrap_or_else(|| missing_token.to_string());

    if column.dtype() == &DataType::String {
        Ok(column
            .str()?
            .into_iter()
            .map(|v| render(v.map(str::to_string)))
            .collect())
    } else {
        Ok(column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| render(v.map(|x| format_significant(x, significant_digits))))
            .collect())
    }
}

/// Persist a comparison table: missing values as `missing_token`, floats
/// with `significant_digits` significant digits.
pub fn write_comparison_csv(
    df: &DataFrame,
    path: &Path,
    missing_token: &str,
    significant_digits: usize,
) -> BenchResult<()> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(io_err(path))?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record(df.get_column_names().iter().map(|name| name.as_str()))?;

    let cells = df
        .get_columns()
        .iter()
        .map(|c| render_column(c, missing_token, significant_digits))
        .collect::<BenchResult<Vec<_>>>()?;

    for row in 0..df.height() {
        wtr.write_record(cells.iter().map(|column| column[row].as_str()))?;
    }
    wtr.flush().map_err(io_err(path))?;

    info!("Comparison written to {}", path.display());
    Ok(())
}

/// Read a persisted comparison table back, restoring nulls and float columns.
pub fn load_comparison(path: &Path, missing_token: &str) -> BenchResult<DataFrame> {
    let df = read_csv(path, Some(missing_token))?;
    require_columns(&df, &[TISSUE], &path.display().to_string())?;

    let casts: Vec<Expr> = df
        .get_column_names()
        .iter()
        .map(|name| {
            if name.as_str() == TISSUE {
                col(TISSUE).cast(DataType::String)
            } else {
                col(name.as_str()).cast(DataType::Float64)
            }
        })
        .collect();

    Ok(df.lazy().select(casts).collect()?)
}

/// First rows of a comparison, written separately (e.g. for a figure table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Excerpt {
    pub rows: usize,
    pub output: PathBuf,
}

/// One configured comparison between two persisted result tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonJob {
    pub a: PathBuf,
    pub b: PathBuf,
    pub suffix_a: String,
    pub suffix_b: String,
    pub output: PathBuf,
    #[serde(default)]
    pub head: Option<Excerpt>,
}

impl ComparisonJob {
    /// Compare, then write the full table and the optional excerpt. Nothing is
    /// written when the comparison itself fails.
    pub fn run(&self, missing_token: &str, significant_digits: usize) -> BenchResult<DataFrame> {
        let df = compare_files(&self.a, &self.b, &self.suffix_a, &self.suffix_b)?;
        write_comparison_csv(&df, &self.output, missing_token, significant_digits)?;

        if let Some(excerpt) = &self.head {
            if df.height() < excerpt.rows {
                warn!(
                    "Excerpt of {} rows requested, comparison only has {}",
                    excerpt.rows,
                    df.height()
                );
            }
            let head = df.head(Some(excerpt.rows));
            write_comparison_csv(&head, &excerpt.output, missing_token, significant_digits)?;
        }
        Ok(df)
    }
}
