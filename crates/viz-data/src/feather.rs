//! Arrow IPC ("feather") read/write for health export tables.
//!
//! Every column is cast to UTF-8 on read, so string, timestamp (zoned or
//! naive) and numeric encodings of the same schema all load identically.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, TimestampMicrosecondArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::error::ArrowError;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use tracing::debug;
use viz_core::models::RawRecord;
use viz_core::time_utils::{canonicalize_timestamp, TimestampMode};
use viz_core::{Result, VizError};

/// Columns an export must carry; `sourceName` and `unit` are optional.
pub const REQUIRED_COLUMNS: [&str; 4] = ["type", "value", "startDate", "endDate"];

/// Read every batch of an Arrow IPC file into raw records.
pub fn read_feather(path: &Path) -> Result<Vec<RawRecord>> {
    let file = File::open(path).map_err(|source| VizError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = FileReader::try_new(file, None).map_err(arrow_error)?;

    let mut records = Vec::new();
    let mut batches = 0usize;
    for batch in reader {
        let batch = batch.map_err(arrow_error)?;
        batches += 1;
        append_batch(&batch, &mut records)?;
    }

    debug!(
        "Read {} rows in {} batches from {}",
        records.len(),
        batches,
        path.display()
    );
    Ok(records)
}

/// Write records as an Arrow IPC file.
///
/// Metadata columns are UTF-8; `startDate`/`endDate` are naive microsecond
/// timestamps.
pub fn write_feather(path: &Path, records: &[RawRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("type", DataType::Utf8, false),
        Field::new("sourceName", DataType::Utf8, false),
        Field::new("unit", DataType::Utf8, false),
        Field::new(
            "startDate",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
        Field::new(
            "endDate",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
        Field::new("value", DataType::Utf8, false),
    ]));

    let starts = timestamp_column(records.iter().map(|r| r.start_date.as_str()))?;
    let ends = timestamp_column(records.iter().map(|r| r.end_date.as_str()))?;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.record_type.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.source_name.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.unit.as_str()),
        )),
        Arc::new(starts),
        Arc::new(ends),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.value.as_str()),
        )),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).map_err(arrow_error)?;

    let file = File::create(path).map_err(|source| VizError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = FileWriter::try_new(file, &schema).map_err(arrow_error)?;
    writer.write(&batch).map_err(arrow_error)?;
    writer.finish().map_err(arrow_error)?;

    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn arrow_error(e: ArrowError) -> VizError {
    VizError::decode("Arrow IPC", e)
}

fn append_batch(batch: &RecordBatch, out: &mut Vec<RawRecord>) -> Result<()> {
    let record_type = required_text(batch, "type")?;
    let value = required_text(batch, "value")?;
    let start_date = required_text(batch, "startDate")?;
    let end_date = required_text(batch, "endDate")?;
    let source_name = text_column(batch, "sourceName")?;
    let unit = text_column(batch, "unit")?;

    out.reserve(batch.num_rows());
    for i in 0..batch.num_rows() {
        out.push(RawRecord {
            record_type: cell(&record_type, i),
            source_name: source_name.as_ref().map(|c| cell(c, i)).unwrap_or_default(),
            unit: unit.as_ref().map(|c| cell(c, i)).unwrap_or_default(),
            start_date: cell(&start_date, i),
            end_date: cell(&end_date, i),
            value: cell(&value, i),
        });
    }
    Ok(())
}

fn required_text(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    text_column(batch, name)?.ok_or_else(|| VizError::MissingColumn(name.to_string()))
}

/// Cast a named column to UTF-8, or `None` when the batch lacks it.
fn text_column(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    let text = cast(column, &DataType::Utf8).map_err(arrow_error)?;
    let strings = text
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| VizError::MissingColumn(name.to_string()))?;
    Ok(Some(strings))
}

/// Nulls read as empty strings.
fn cell(array: &StringArray, i: usize) -> String {
    if array.is_null(i) {
        String::new()
    } else {
        array.value(i).to_string()
    }
}

fn timestamp_column<'a>(
    values: impl Iterator<Item = &'a str>,
) -> Result<TimestampMicrosecondArray> {
    let micros = values
        .map(|raw| {
            canonicalize_timestamp(raw, TimestampMode::WallClock)
                .map(|ts| ts.and_utc().timestamp_micros())
        })
        .collect::<Result<Vec<i64>>>()?;
    Ok(TimestampMicrosecondArray::from(micros))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
