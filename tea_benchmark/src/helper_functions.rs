use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::debug;

use crate::models::{io_err, BenchResult};

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Read a comma-delimited table with a header row.
///
/// Lines starting with `#` are skipped, and `null_token` (if any) is read as a
/// missing value in every column.
pub fn read_csv(file_path: impl AsRef<Path>, null_token: Option<&str>) -> BenchResult<DataFrame> {
    let file_path = file_path.as_ref();
    let file = File::open(file_path).map_err(io_err(file_path))?;

    let mut parse_options = CsvParseOptions::default().with_comment_prefix(Some("#"));
    if let Some(token) = null_token {
        parse_options =
            parse_options.with_null_values(Some(NullValues::AllColumnsSingle(token.into())));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(file)
        .finish()?;

    debug!("Read {} rows x {} columns from {}", df.height(), df.width(), file_path.display());
    Ok(df)
}

/// Write `df` as CSV, optionally preceded by a `#<comment>` line.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>, comment: Option<&str>) -> BenchResult<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let mut file = File::create(path).map_err(io_err(path))?;

    if let Some(comment) = comment {
        writeln!(file, "#{}", comment).map_err(io_err(path))?;
    }

    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

pub fn ensure_parent(path: &Path) -> BenchResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_err(parent))
        }
        _ => Ok(()),
    }
}

/// Regular files in `dir`, sorted by name, hidden files (e.g. `.DS_Store`) excluded.
pub fn data_files(dir: impl AsRef<Path>) -> BenchResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Format like printf's `%.<digits>g`: `digits` significant digits, trailing
/// zeros removed, scientific notation for very small or large magnitudes.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let digits = digits.max(1);
    // Let the formatter do the rounding, then read the exponent back.
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
