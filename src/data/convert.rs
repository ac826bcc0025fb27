use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Float32Type, Float64Type, Int32Type, Int64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::{Map, Value as JsonValue};

use crate::error::{DeriveError, Result};

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// JSON records
// ---------------------------------------------------------------------------

impl Table {
    /// Expected JSON shape (records-oriented, as `df.to_json(orient='records')` writes):
    ///
    /// ```json
    /// [
    ///   { "patient": "P1", "reconstruction_type": "Mono_70keV", "hu_mean": 41.2 },
    ///   ...
    /// ]
    /// ```
    ///
    /// Columns are taken in first-seen key order; a key absent from a record is `Null`.
    pub fn from_json_records(root: &JsonValue) -> Result<Table> {
        let records = root
            .as_array()
            .ok_or_else(|| DeriveError::invalid_record("expected top-level JSON array"))?;

        let mut columns: Vec<String> = Vec::new();
        for (i, rec) in records.iter().enumerate() {
            let obj = rec
                .as_object()
                .ok_or_else(|| DeriveError::invalid_record(format!("row {i} is not a JSON object")))?;
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(JsonValue::as_object)
            .map(|obj| {
                columns
                    .iter()
                    .map(|c| obj.get(c).map_or(CellValue::Null, json_to_cell))
                    .collect()
            })
            .collect();

        Ok(Table::from_parts(columns, rows))
    }

    /// Parse records-oriented JSON text.
    pub fn from_json_str(text: &str) -> Result<Table> {
        let root: JsonValue = serde_json::from_str(text)?;
        Table::from_json_records(&root)
    }

    /// Records-oriented JSON, one object per row.
    pub fn to_json_records(&self) -> JsonValue {
        JsonValue::Array(
            self.rows()
                .iter()
                .map(|row| {
                    let obj: Map<String, JsonValue> = self
                        .column_names()
                        .iter()
                        .zip(row)
                        .map(|(c, v)| (c.clone(), cell_to_json(v)))
                        .collect();
                    JsonValue::Object(obj)
                })
                .collect(),
        )
    }
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
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

fn cell_to_json(val: &CellValue) -> JsonValue {
    match val {
        CellValue::String(s) => JsonValue::String(s.clone()),
        CellValue::Integer(i) => JsonValue::from(*i),
        // Non-finite floats have no JSON form and become null
        CellValue::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(JsonValue::Null, JsonValue::Number),
        CellValue::Bool(b) => JsonValue::Bool(*b),
        CellValue::Null => JsonValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Arrow record batches
// ---------------------------------------------------------------------------

impl Table {
    /// Build a table from an arrow batch.
    ///
    /// Supported column types:
    /// * `Utf8` / `LargeUtf8` → `String`
    /// * `Int32` / `Int64`    → `Integer`
    /// * `Float32` / `Float64` → `Float`
    /// * `Boolean`            → `Bool`
    ///
    /// Nulls become `Null`; any other type is rejected.
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Table> {
        let schema = batch.schema();
        let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();

        let mut rows = vec![Vec::with_capacity(columns.len()); batch.num_rows()];
        for (col_idx, name) in columns.iter().enumerate() {
            let array = batch.column(col_idx);
            for (row_idx, row) in rows.iter_mut().enumerate() {
                row.push(extract_cell(array, row_idx, name)?);
            }
        }

        Ok(Table::from_parts(columns, rows))
    }

    /// Convert to an arrow batch, inferring one arrow type per column.
    ///
    /// Integer-only columns become `Int64`, numeric columns mixing integers and
    /// floats become `Float64`, boolean-only columns become `Boolean`, and
    /// anything else is rendered as `Utf8`.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let mut fields = Vec::with_capacity(self.num_columns());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.num_columns());

        for (idx, name) in self.column_names().iter().enumerate() {
            let cells: Vec<&CellValue> = self.rows().iter().map(|r| &r[idx]).collect();
            let array = build_array(&cells);
            fields.push(Field::new(name, array.data_type().clone(), true));
            arrays.push(array);
        }

        let options = RecordBatchOptions::new().with_row_count(Some(self.len()));
        let batch =
            RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(batch)
    }

    /// Render the table with arrow's pretty printer.
    pub fn pretty(&self) -> Result<String> {
        let batch = self.to_record_batch()?;
        Ok(arrow::util::pretty::pretty_format_batches(&[batch])?.to_string())
    }
}

// -- Arrow helpers --

/// Extract a single cell from an arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize, name: &str) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => {
            return Err(DeriveError::UnsupportedType {
                column: name.to_string(),
                data_type: format!("{other:?}"),
            })
        }
    };
    Ok(cell)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Integer,
    Float,
    Bool,
    Utf8,
}

fn infer_kind(cells: &[&CellValue]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for cell in cells {
        let this = match cell {
            CellValue::Null => continue,
            CellValue::Integer(_) => ColumnKind::Integer,
            CellValue::Float(_) => ColumnKind::Float,
            CellValue::Bool(_) => ColumnKind::Bool,
            CellValue::String(_) => ColumnKind::Utf8,
        };
        kind = Some(match (kind, this) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Integer), ColumnKind::Float)
            | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
            _ => ColumnKind::Utf8,
        });
    }
    kind.unwrap_or(ColumnKind::Utf8)
}

fn build_array(cells: &[&CellValue]) -> ArrayRef {
    match infer_kind(cells) {
        ColumnKind::Integer => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Float => Arc::new(Float64Array::from(
            cells.iter().map(|c| c.as_f64()).collect::<Vec<_>>(),
        )),
        ColumnKind::Bool => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnKind::Utf8 => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Null => None,
                    other => Some(other.to_string()),
                })
                .collect::<Vec<_>>(),
        )),
    }
}
