use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Record, RecordSet, RESERVED_FIELDS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a score table from a file.  Dispatch by extension.
///
/// Every format carries the columns `model`, `channel` and `lead_time`
/// (hours); every other column is a numeric skill score.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "model": "...", "channel": "...", "lead_time": 6, "rmse": 1.2 }, ...]`
/// * `.parquet` – flat columns; strings for model/channel, any numeric type otherwise
pub fn load_file(path: &Path) -> Result<RecordSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, e.g.
///
/// ```text
/// model,channel,lead_time,acc,rmse
/// sfno,z500,6.0,0.998,21.4
/// ```
///
/// An empty metric cell means the record has no value for that metric.
fn load_csv(path: &Path) -> Result<RecordSet> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse CSV from any reader (used directly by tests and stdin input).
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RecordSet> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV missing '{name}' column"))
    };
    let model_idx = column("model")?;
    let channel_idx = column("channel")?;
    let lead_idx = column("lead_time")?;
    let metric_columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| ![model_idx, channel_idx, lead_idx].contains(i))
        .map(|(_, h)| h.clone())
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        let lead_cell = row.get(lead_idx).unwrap_or("");
        let lead_time = parse_float(lead_cell)
            .with_context(|| format!("Row {row_no}, lead_time: '{lead_cell}' is not a number"))?;

        let mut metrics = BTreeMap::new();
        for (col_idx, cell) in row.iter().enumerate() {
            if col_idx == model_idx || col_idx == channel_idx || col_idx == lead_idx {
                continue;
            }
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let name = &headers[col_idx];
            let value = parse_float(cell)
                .with_context(|| format!("Row {row_no}, {name}: '{cell}' is not a number"))?;
            metrics.insert(name.clone(), value);
        }

        records.push(Record {
            model: row.get(model_idx).unwrap_or("").trim().to_string(),
            channel: row.get(channel_idx).unwrap_or("").trim().to_string(),
            lead_time,
            metrics,
        });
    }

    Ok(RecordSet::with_metric_columns(records, metric_columns))
}

fn parse_float(s: &str) -> Result<f64> {
    Ok(s.trim().parse::<f64>()?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`).
/// Numbers may also arrive as numeric strings; `null` metrics are skipped.
fn load_json(path: &Path) -> Result<RecordSet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<RecordSet> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut metric_columns: Vec<String> = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let text_field = |key: &str| -> Result<String> {
            match obj.get(key) {
                Some(JsonValue::String(s)) => Ok(s.clone()),
                Some(JsonValue::Number(n)) => Ok(n.to_string()),
                _ => bail!("Row {i}: missing or invalid '{key}'"),
            }
        };

        let model = text_field("model")?;
        let channel = text_field("channel")?;
        let lead_time = json_to_f64(obj.get("lead_time"))
            .with_context(|| format!("Row {i}: missing or invalid 'lead_time'"))?;

        let mut metrics = BTreeMap::new();
        for (key, val) in obj {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if !metric_columns.contains(key) {
                metric_columns.push(key.clone());
            }
            if val.is_null() {
                continue;
            }
            let value = json_to_f64(Some(val))
                .with_context(|| format!("Row {i}, {key}: not a number"))?;
            metrics.insert(key.clone(), value);
        }

        records.push(Record {
            model,
            channel,
            lead_time,
            metrics,
        });
    }

    Ok(RecordSet::with_metric_columns(records, metric_columns))
}

fn json_to_f64(val: Option<&JsonValue>) -> Option<f64> {
    match val? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// `model` and `channel` may be any type castable to Utf8; `lead_time` and
/// the metric columns any numeric type (cast to Float64). Null metric cells
/// are skipped.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RecordSet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let metric_columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let index_of = |name: &str| {
            schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };
        let model_idx = index_of("model")?;
        let channel_idx = index_of("channel")?;
        let lead_idx = index_of("lead_time")?;

        let models = cast(batch.column(model_idx).as_ref(), &DataType::Utf8)
            .context("casting 'model' to strings")?;
        let channels = cast(batch.column(channel_idx).as_ref(), &DataType::Utf8)
            .context("casting 'channel' to strings")?;
        let lead_times = float_column(batch.column(lead_idx), "lead_time")?;

        let metric_cols: Vec<(String, ArrayRef)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != model_idx && *i != channel_idx && *i != lead_idx)
            .map(|(i, f)| -> Result<(String, ArrayRef)> {
                Ok((f.name().clone(), float_column(batch.column(i), f.name())?))
            })
            .collect::<Result<_>>()?;

        let models = models.as_string::<i32>();
        let channels = channels.as_string::<i32>();
        let lead_times = lead_times.as_primitive::<Float64Type>();
        let metric_cols: Vec<(&String, &Float64Array)> = metric_cols
            .iter()
            .map(|(name, col)| (name, col.as_primitive::<Float64Type>()))
            .collect();

        for row in 0..batch.num_rows() {
            if lead_times.is_null(row) {
                bail!("Row {row}: null lead_time");
            }

            let mut metrics = BTreeMap::new();
            for (name, col) in &metric_cols {
                if !col.is_null(row) {
                    metrics.insert((*name).clone(), col.value(row));
                }
            }

            records.push(Record {
                model: string_cell(models, row),
                channel: string_cell(channels, row),
                lead_time: lead_times.value(row),
                metrics,
            });
        }
    }

    Ok(RecordSet::with_metric_columns(records, metric_columns))
}

// -- Parquet / Arrow helpers --

fn float_column(col: &ArrayRef, name: &str) -> Result<ArrayRef> {
    if !col.data_type().is_numeric() {
        bail!("Column '{name}' is {:?}, expected a numeric type", col.data_type());
    }
    cast(col.as_ref(), &DataType::Float64)
        .with_context(|| format!("casting '{name}' to Float64"))
}

fn string_cell(col: &StringArray, row: usize) -> String {
    if col.is_null(row) {
        String::new()
    } else {
        col.value(row).to_string()
    }
}
