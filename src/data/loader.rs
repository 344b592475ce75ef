use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::normalize::{cell, RawTable};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a source file could not become a dataset. Every variant names the file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: file not found", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: unsupported file type '.{ext}' (expected .csv, .json or .parquet)", path.display())]
    Unsupported { path: PathBuf, ext: String },

    #[error("{}: could not read file: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: not a readable table: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

// ---------------------------------------------------------------------------
// Source formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Csv,
    Json,
    Parquet,
}

impl SourceFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "parquet" | "pq" => Ok(SourceFormat::Parquet),
            _ => Err(LoadError::Unsupported {
                path: path.to_path_buf(),
                ext,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a file's bytes, distinguishing "missing" from other I/O failures.
pub fn read_source(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Parse already-read file contents into a raw table.
///
/// Supported formats:
/// * `.csv`     – header row plus delimited records (recommended)
/// * `.json`    – `[{ "Title": "...", ... }, ...]`
/// * `.parquet` – one column per field, any scalar type
pub fn parse_source(path: &Path, format: SourceFormat, bytes: &[u8]) -> Result<RawTable, LoadError> {
    let parsed = match format {
        SourceFormat::Csv => parse_csv(bytes),
        SourceFormat::Json => parse_json(bytes),
        SourceFormat::Parquet => parse_parquet(bytes),
    };
    parsed.map_err(|e| LoadError::Malformed {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, then one record per line.
/// Short rows are padded with missing values; long rows are an error.
pub fn parse_csv<R: Read>(input: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        bail!("no columns to parse");
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("reading CSV record")?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            bail!(
                "expected {} fields on line {line}, saw {}",
                headers.len(),
                record.len()
            );
        }
        let mut row: Vec<Option<String>> = record.iter().map(cell).collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Application Number": "EP1234", "Title": "...", "Application Date": "2019-03-14" },
///   ...
/// ]
/// ```
///
/// Columns are the union of all keys in first-seen order.
fn parse_json(bytes: &[u8]) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut objects = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !index.contains_key(key) {
                index.insert(key.clone(), headers.len());
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            let mut row = vec![None; headers.len()];
            for (key, val) in obj {
                if let Some(&col) = index.get(key) {
                    row[col] = json_to_cell(val);
                }
            }
            row
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => cell(s),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by Pandas (`df.to_parquet()`) or Polars.
/// Every column is rendered to text; dates come out as `YYYY-MM-DD`.
fn parse_parquet(raw: &[u8]) -> Result<RawTable> {
    let data = bytes::Bytes::copy_from_slice(raw);
    let builder = ParquetRecordBatchReaderBuilder::try_new(data)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(headers.len());
            for col in batch.columns() {
                if col.is_null(row) {
                    cells.push(None);
                } else {
                    let text = array_value_to_string(col.as_ref(), row)
                        .with_context(|| format!("row {row}: formatting value"))?;
                    cells.push(cell(&text));
                }
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}
