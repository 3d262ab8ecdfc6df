use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use crate::data::datatable::{DataColumn, DataRow, DataTable, DataValue};
use crate::data::type_inference::{TypeInference, INFERENCE_SAMPLE_SIZE};

/// Load a `.csv` or `.json` file, chosen by extension
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<DataTable> {
    let path = path.as_ref();
    let table_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("data")
        .to_string();

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => load_csv_to_datatable(path, &table_name),
        Some("json") => load_json_to_datatable(path, &table_name),
        _ => bail!(
            "Unsupported file type: {} (expected .csv or .json)",
            path.display()
        ),
    }
}

/// Load a CSV file into a DataTable. Column types come from the first
/// rows; blank cells load as Null.
pub fn load_csv_to_datatable<P: AsRef<Path>>(path: P, table_name: &str) -> Result<DataTable> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV headers from {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut string_rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Malformed CSV record {} in {}", line + 1, path.display()))?;
        string_rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    let mut table = DataTable::new(table_name);
    table.metadata.insert("source_type".to_string(), "csv".to_string());
    table
        .metadata
        .insert("source_path".to_string(), path.display().to_string());

    for (col_idx, header) in headers.iter().enumerate() {
        let samples = string_rows
            .iter()
            .take(INFERENCE_SAMPLE_SIZE)
            .filter_map(|row| row.get(col_idx))
            .map(String::as_str);
        table.add_column(DataColumn::new(header).with_type(TypeInference::infer_from_samples(samples)));
    }

    for string_row in &string_rows {
        let mut row = DataRow::new();
        for (col_idx, column) in table.columns.iter().enumerate() {
            let text = string_row.get(col_idx).map(String::as_str).unwrap_or("");
            row.insert(column.name.clone(), DataValue::from_string(text, &column.data_type));
        }
        table.add_row(row);
    }

    table.infer_column_types();
    info!(
        target: "loader",
        "Loaded {} from {}",
        table.get_stats(),
        path.display()
    );
    Ok(table)
}

/// Load a JSON file holding an array of objects
pub fn load_json_to_datatable<P: AsRef<Path>>(path: P, table_name: &str) -> Result<DataTable> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let json_data: Vec<JsonValue> = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON file: {}", path.display()))?;

    let mut table = load_json_data_to_datatable(json_data, table_name)?;
    table.metadata.insert("source_type".to_string(), "json".to_string());
    table
        .metadata
        .insert("source_path".to_string(), path.display().to_string());

    info!(
        target: "loader",
        "Loaded {} from {}",
        table.get_stats(),
        path.display()
    );
    Ok(table)
}

/// Build a DataTable from already parsed JSON objects. Columns are the union
/// of all keys in first-seen order; a missing key reads as Null.
pub fn load_json_data_to_datatable(data: Vec<JsonValue>, table_name: &str) -> Result<DataTable> {
    let mut table = DataTable::new(table_name);
    let mut column_names: Vec<String> = Vec::new();

    for (position, item) in data.iter().enumerate() {
        let obj = item
            .as_object()
            .with_context(|| format!("JSON data must be an array of objects (item {})", position))?;
        for key in obj.keys() {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
        }
    }

    for name in &column_names {
        table.add_column(DataColumn::new(name));
    }

    for item in &data {
        let mut row = DataRow::new();
        if let Some(obj) = item.as_object() {
            for (key, value) in obj {
                row.insert(key.clone(), DataValue::from_json(value));
            }
        }
        table.add_row(row);
    }

    table.infer_column_types();
    debug!(
        target: "loader",
        "json: {} objects, {} columns",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}
