use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int32Type, Int64Type, TimeUnit,
    TimestampMicrosecondType, TimestampMillisecondType, TimestampNanosecondType,
    TimestampSecondType,
};
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Record, RecordSet};
use crate::config::{PipelineConfig, SourceEncoding};
use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the investor table from a file, dispatching by extension, then check
/// the schema and normalise the date column.
///
/// Supported formats:
/// * `.csv`     – header row, Latin-1 or UTF-8 per `config.encoding`
/// * `.json`    – `[{ "Investors": "...", "Segment": "...", ... }, ...]`
/// * `.parquet` – flat string / numeric / boolean / date / timestamp columns
///
/// Text cells are typed the same way whatever the source format, so a table
/// exported to CSV reads back identically.
pub fn load_file(path: &Path, config: &PipelineConfig) -> Result<RecordSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => load_csv(path, config.encoding),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let store = prepare(raw, config)?;
    log::info!(
        "Loaded {} investor rows with columns {:?}",
        store.len(),
        store.columns()
    );
    Ok(store)
}

/// Validate required columns and convert the date column to dates.
pub fn prepare(set: RecordSet, config: &PipelineConfig) -> Result<RecordSet, PipelineError> {
    set.require_columns(&config.columns.required())?;
    normalize_dates(set, &config.columns.date)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

// Two-digit years first: `%Y` would accept "23" as year 23.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%d-%b-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// Parse a date in any of the layouts seen in investor exports.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%b %d, %Y").ok())
}

/// Turn every cell of `column` into a [`CellValue::Date`]. Nulls stay null;
/// anything unparsable is fatal because range bounds depend on it.
pub fn normalize_dates(set: RecordSet, column: &str) -> Result<RecordSet, PipelineError> {
    set.try_map_column(column, |row, cell| match cell {
        CellValue::Null | CellValue::Date(_) => Ok(cell),
        CellValue::String(ref s) => parse_date(s).map(CellValue::Date).ok_or_else(|| {
            PipelineError::DateParse {
                column: column.to_string(),
                row,
                value: s.clone(),
            }
        }),
        other => Err(PipelineError::DateParse {
            column: column.to_string(),
            row,
            value: other.to_string(),
        }),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Decode raw file bytes into text.
pub fn decode(bytes: &[u8], encoding: SourceEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        SourceEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(bytes)),
        SourceEncoding::Utf8 => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .context("input is not valid UTF-8"),
    }
}

fn load_csv(path: &Path, encoding: SourceEncoding) -> Result<RecordSet> {
    let bytes = std::fs::read(path).context("reading CSV file")?;
    let text = decode(&bytes, encoding)?;
    read_csv(text.as_bytes())
}

/// Parse CSV text with a header row into a [`RecordSet`], guessing cell types.
pub fn read_csv<R: Read>(input: R) -> Result<RecordSet> {
    let mut reader = csv::Reader::from_reader(input);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(Record::new(record.iter().map(guess_cell_type).collect()));
    }

    Ok(RecordSet::new(columns, rows))
}

/// Type a text cell. Only finite numbers with at least one digit count as
/// floats, so names like "NaN" or "Infinity" stay text.
pub fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if s.bytes().any(|b| b.is_ascii_digit()) {
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return CellValue::Date(d);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Investors": "Acme Ventures", "Segment": "Champions", "Total Investments": 12 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; keys missing from a row read as null.
fn load_json(path: &Path) -> Result<RecordSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            Record::new(
                columns
                    .iter()
                    .map(|c| obj.get(c).map_or(CellValue::Null, json_to_cell))
                    .collect(),
            )
        })
        .collect();

    Ok(RecordSet::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => guess_cell_type(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Timestamp columns, which is how Pandas
/// stores a parsed date column, are truncated to their calendar day.
fn load_parquet(path: &Path) -> Result<RecordSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
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
            let values = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()?;
            rows.push(Record::new(values));
        }
    }

    Ok(RecordSet::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => guess_cell_type(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => guess_cell_type(col.as_string::<i64>().value(row)),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .context("date out of range")?,
        DataType::Date64 => col
            .as_primitive::<Date64Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .context("date out of range")?,
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => col.as_primitive::<TimestampSecondType>().value_as_datetime(row),
                TimeUnit::Millisecond => col
                    .as_primitive::<TimestampMillisecondType>()
                    .value_as_datetime(row),
                TimeUnit::Microsecond => col
                    .as_primitive::<TimestampMicrosecondType>()
                    .value_as_datetime(row),
                TimeUnit::Nanosecond => col
                    .as_primitive::<TimestampNanosecondType>()
                    .value_as_datetime(row),
            };
            datetime
                .map(|dt| CellValue::Date(dt.date()))
                .context("timestamp out of range")?
        }
        other => bail!("Unsupported parquet column type {other:?}"),
    };
    Ok(cell)
}
