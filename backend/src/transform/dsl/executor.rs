//! DSL Executor
//!
//! Executes a projection over records to produce a CSV document.

use serde::Serialize;
use serde_json::{Map, Value};

use super::projection::{ColumnSpec, Projection};
use crate::encoder::CsvDocument;
use crate::error::{TransformError, TransformResult};

/// Project records into a CSV document
///
/// Body row `i` is computed from `records[i]`; records are neither
/// reordered nor dropped. An empty slice yields a header-only document.
///
/// # Arguments
/// * `records` - JSON objects, one per record
/// * `projection` - The column list to apply
pub fn project(records: &[Value], projection: &Projection) -> TransformResult<CsvDocument> {
    projection.validate()?;

    let mut document = CsvDocument::new(projection.headers());

    for (row_idx, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or(TransformError::NotAnObject { row: row_idx })?;

        let row = projection
            .columns
            .iter()
            .map(|column| project_cell(obj, column, row_idx))
            .collect::<TransformResult<Vec<String>>>()?;

        document.push_row(row);
    }

    Ok(document)
}

/// Serialize typed records and project them
pub fn project_records<T: Serialize>(records: &[T], projection: &Projection) -> TransformResult<CsvDocument> {
    let values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;
    project(&values, projection)
}

/// Compute one cell
fn project_cell(record: &Map<String, Value>, column: &ColumnSpec, row_idx: usize) -> TransformResult<String> {
    let mut value = record.get(&column.source).cloned().unwrap_or(Value::Null);

    for op in &column.operations {
        value = op.apply(&value).map_err(|source| TransformError::Format {
            row: row_idx,
            column: column.header.clone(),
            source,
        })?;
    }

    Ok(match value {
        Value::Null => column.default.clone().unwrap_or_default(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // Nested values are written as compact JSON
        other => other.to_string(),
    })
}
