use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::DataError;
use super::model::{
    Record, SalesDataset, CITY, COGS, CUSTOMER_TYPE, DATE, GROSS_INCOME, PRODUCT_LINE,
    QUANTITY, RATING, REQUIRED_COLUMNS, TAX, TOTAL, UNIT_PRICE,
};

/// Date-only layouts tried in order; month-first matches the usual export.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"];
/// Timestamp layouts whose time part is dropped.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the required column names (default)
/// * `.json`    – `[{ "Date": "1/5/2019", "City": "Yangon", ... }, ...]`
/// * `.parquet` – one column per required name (strings, numbers, Date32)
///
/// A missing file is reported as [`DataError::DataUnavailable`] before the
/// extension is looked at.
pub fn load_file(path: &Path) -> Result<SalesDataset, DataError> {
    let file = open_source(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(file)?,
        "json" => load_json(file)?,
        "parquet" | "pq" => load_parquet(file)?,
        other => return Err(DataError::UnsupportedExtension(other.to_string())),
    };

    let dataset = SalesDataset::from_records(records);
    if dataset.is_empty() {
        return Err(DataError::Empty);
    }
    log::debug!("parsed {} records from {}", dataset.len(), path.display());
    Ok(dataset)
}

fn open_source(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DataError::DataUnavailable(path.to_path_buf())
        } else {
            DataError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Map every required column name to its position, failing on the first
/// one that is absent.
fn column_index<F>(position: F) -> Result<BTreeMap<&'static str, usize>, DataError>
where
    F: Fn(&str) -> Option<usize>,
{
    REQUIRED_COLUMNS
        .iter()
        .map(|&name| {
            position(name)
                .map(|i| (name, i))
                .ok_or(DataError::MissingColumn(name))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(file: File) -> Result<Vec<Record>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));
    let headers = reader.headers()?.clone();
    let index = column_index(|name| headers.iter().position(|h| h == name))?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        let record = parse_record(i + 1, |column| {
            index
                .get(column)
                .and_then(|&idx| row.get(idx))
                .map(str::to_owned)
        })?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
/// Values may be strings or numbers; `null` counts as missing.
fn load_json(file: File) -> Result<Vec<Record>, DataError> {
    let root: JsonValue = serde_json::from_reader(BufReader::new(file))?;
    let rows = root
        .as_array()
        .ok_or_else(|| DataError::Layout("expected a top-level JSON array".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(i, value)| {
            let obj = value
                .as_object()
                .ok_or_else(|| DataError::Layout(format!("row {} is not a JSON object", i + 1)))?;
            parse_record(i + 1, |column| match obj.get(column)? {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Cells are rendered through Arrow's display layer, so string, integer,
/// float and Date32 columns all go through the same parsers as CSV.
fn load_parquet(file: File) -> Result<Vec<Record>, DataError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let index = column_index(|name| schema.index_of(name).ok())?;

        for i in 0..batch.num_rows() {
            let record = parse_record(records.len() + 1, |column| {
                let col = batch.column(*index.get(column)?);
                if col.is_null(i) {
                    return None;
                }
                array_value_to_string(col.as_ref(), i).ok()
            })?;
            records.push(record);
        }
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Cell parsers shared by every format
// ---------------------------------------------------------------------------

/// Build a [`Record`] from a row; `field` returns the raw text of a column.
fn parse_record<F>(row: usize, field: F) -> Result<Record, DataError>
where
    F: Fn(&'static str) -> Option<String>,
{
    let text = |column: &'static str| -> Result<String, DataError> {
        field(column).ok_or_else(|| DataError::format(row, column, "<missing>", "a value"))
    };

    Ok(Record {
        date: parse_date(row, &text(DATE)?)?,
        city: parse_category(row, CITY, &text(CITY)?)?,
        product_line: parse_category(row, PRODUCT_LINE, &text(PRODUCT_LINE)?)?,
        customer_type: parse_category(row, CUSTOMER_TYPE, &text(CUSTOMER_TYPE)?)?,
        unit_price: parse_number(row, UNIT_PRICE, &text(UNIT_PRICE)?)?,
        quantity: parse_quantity(row, &text(QUANTITY)?)?,
        tax: parse_number(row, TAX, &text(TAX)?)?,
        total: parse_number(row, TOTAL, &text(TOTAL)?)?,
        cogs: parse_number(row, COGS, &text(COGS)?)?,
        gross_income: parse_number(row, GROSS_INCOME, &text(GROSS_INCOME)?)?,
        rating: parse_number(row, RATING, &text(RATING)?)?,
    })
}

fn parse_date(row: usize, raw: &str) -> Result<NaiveDate, DataError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| DataError::format(row, DATE, raw, "a date"))
}

fn parse_category(row: usize, column: &'static str, raw: &str) -> Result<String, DataError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DataError::format(row, column, raw, "a non-empty category"));
    }
    Ok(raw.to_string())
}

/// `NaN` and infinities parse as `f64` but are rejected here.
fn parse_number(row: usize, column: &'static str, raw: &str) -> Result<f64, DataError> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataError::format(row, column, raw, "a finite number"))
}

fn parse_quantity(row: usize, raw: &str) -> Result<u32, DataError> {
    let raw = raw.trim();
    raw.parse::<u32>()
        .ok()
        .or_else(|| {
            // integral floats such as "7.0" from float-typed columns
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(v))
                .map(|v| v as u32)
        })
        .ok_or_else(|| DataError::format(row, QUANTITY, raw, "a non-negative integer"))
}
