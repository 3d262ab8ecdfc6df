use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

use crate::data::type_inference::TypeInference;

/// Represents the data type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Null,
    Mixed, // For columns with mixed types
}

impl DataType {
    /// Infer type from a string value
    pub fn infer_from_string(value: &str) -> Self {
        if value.eq_ignore_ascii_case("null") {
            return DataType::Null;
        }
        TypeInference::infer_from_string(value)
    }

    /// Merge two types (for columns with mixed types)
    pub fn merge(&self, other: &DataType) -> DataType {
        if self == other {
            return *self;
        }

        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => *t,
            (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
                DataType::Float
            }
            _ => DataType::Mixed,
        }
    }
}

/// Column metadata discovered while loading a source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataColumn {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub null_count: usize,
}

impl DataColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::String,
            nullable: true,
            null_count: 0,
        }
    }

    pub fn with_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(String), // Kept as the source text, parsed on demand
    Null,
}

static NULL_VALUE: DataValue = DataValue::Null;

impl DataValue {
    pub fn from_string(s: &str, data_type: &DataType) -> Self {
        if s.is_empty() {
            return DataValue::Null;
        }

        match data_type {
            DataType::String => DataValue::String(s.to_string()),
            _ if s.eq_ignore_ascii_case("null") => DataValue::Null,
            DataType::Integer => s
                .parse::<i64>()
                .map(DataValue::Integer)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Float => s
                .parse::<f64>()
                .map(DataValue::Float)
                .unwrap_or_else(|_| DataValue::String(s.to_string())),
            DataType::Boolean => {
                let lower = s.to_lowercase();
                DataValue::Boolean(lower == "true" || lower == "1" || lower == "yes")
            }
            DataType::DateTime => DataValue::DateTime(s.to_string()),
            DataType::Null => DataValue::Null,
            DataType::Mixed => {
                let inferred = DataType::infer_from_string(s);
                if inferred == DataType::Mixed {
                    DataValue::String(s.to_string())
                } else {
                    Self::from_string(s, &inferred)
                }
            }
        }
    }

    /// Convert a JSON scalar. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else {
                    n.as_f64().map(DataValue::Float).unwrap_or(DataValue::Null)
                }
            }
            JsonValue::String(s) => {
                if TypeInference::looks_like_datetime(s) {
                    DataValue::DateTime(s.clone())
                } else {
                    DataValue::String(s.clone())
                }
            }
            other => DataValue::String(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Null or the empty string. Both read as "Not Set" to filters.
    pub fn is_blank(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion used by range filters. Non-finite results are `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let n = match self {
            DataValue::Integer(i) => *i as f64,
            DataValue::Float(f) => *f,
            DataValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// The text a global search matches against
    pub fn search_text(&self) -> Option<String> {
        match self {
            DataValue::Null => None,
            DataValue::Boolean(true) => Some("active".to_string()),
            DataValue::Boolean(false) => Some("inactive".to_string()),
            other => Some(other.to_string().to_lowercase()),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DataValue::String(_) => DataType::String,
            DataValue::Integer(_) => DataType::Integer,
            DataValue::Float(_) => DataType::Float,
            DataValue::Boolean(_) => DataType::Boolean,
            DataValue::DateTime(_) => DataType::DateTime,
            DataValue::Null => DataType::Null,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::DateTime(dt) => write!(f, "{}", dt),
            DataValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Integer(i)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Boolean(b)
    }
}

/// A record of arbitrary shape, addressed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
    pub fields: HashMap<String, DataValue>,
}

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used heavily by tests and loaders
    pub fn with(mut self, field: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Missing fields read as `Null`
    pub fn get(&self, field: &str) -> &DataValue {
        self.fields.get(field).unwrap_or(&NULL_VALUE)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: DataValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A loaded collection of rows plus the column metadata found in the source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTable {
    pub name: String,
    pub columns: Vec<DataColumn>,
    pub rows: Vec<DataRow>,
    pub metadata: HashMap<String, String>,
}

impl DataTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn add_column(&mut self, column: DataColumn) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn add_row(&mut self, row: DataRow) {
        self.rows.push(row);
    }

    pub fn get_column(&self, name: &str) -> Option<&DataColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Recompute column types and null statistics from the loaded rows
    pub fn infer_column_types(&mut self) {
        for column in self.columns.iter_mut() {
            let mut inferred_type = DataType::Null;
            let mut null_count = 0;

            for row in &self.rows {
                let value = row.get(&column.name);
                if value.is_null() {
                    null_count += 1;
                } else {
                    inferred_type = inferred_type.merge(&value.data_type());
                }
            }

            column.data_type = inferred_type;
            column.null_count = null_count;
            column.nullable = null_count > 0;
        }
    }

    /// Get table statistics
    pub fn get_stats(&self) -> DataTableStats {
        DataTableStats {
            row_count: self.row_count(),
            column_count: self.column_count(),
            null_count: self.columns.iter().map(|c| c.null_count).sum(),
        }
    }
}

/// Statistics about a DataTable
#[derive(Debug, Clone)]
pub struct DataTableStats {
    pub row_count: usize,
    pub column_count: usize,
    pub null_count: usize,
}

impl fmt::Display for DataTableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} columns, {} nulls",
            self.row_count, self.column_count, self.null_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_reads_null() {
        let row = DataRow::new().with("name", "Bob");
        assert_eq!(row.get("name"), &DataValue::String("Bob".to_string()));
        assert!(row.get("age").is_null());
    }

    #[test]
    fn test_float_display_matches_integral_form() {
        assert_eq!(DataValue::Float(25.0).to_string(), "25");
        assert_eq!(DataValue::Float(2.5).to_string(), "2.5");
        assert_eq!(DataValue::Null.to_string(), "");
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(DataValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(DataValue::String(" 4.5 ".to_string()).as_f64(), Some(4.5));
        assert_eq!(DataValue::String("abc".to_string()).as_f64(), None);
        assert_eq!(DataValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(DataValue::Boolean(true).as_f64(), None);
        assert_eq!(DataValue::Null.as_f64(), None);
    }

    #[test]
    fn test_blank_values() {
        assert!(DataValue::Null.is_blank());
        assert!(DataValue::String(String::new()).is_blank());
        assert!(!DataValue::Integer(0).is_blank());
    }

    #[test]
    fn test_null_word_only_blanks_typed_columns() {
        assert_eq!(
            DataValue::from_string("Null", &DataType::String),
            DataValue::String("Null".to_string())
        );
        assert!(DataValue::from_string("", &DataType::String).is_null());
        assert!(DataValue::from_string("null", &DataType::Integer).is_null());
        assert!(DataValue::from_string("NULL", &DataType::Float).is_null());
    }

    #[test]
    fn test_search_text_for_booleans() {
        assert_eq!(
            DataValue::Boolean(true).search_text().as_deref(),
            Some("active")
        );
        assert_eq!(
            DataValue::Boolean(false).search_text().as_deref(),
            Some("inactive")
        );
        assert_eq!(DataValue::Null.search_text(), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(DataValue::from_json(&serde_json::json!(30)), DataValue::Integer(30));
        assert_eq!(DataValue::from_json(&serde_json::json!(1.5)), DataValue::Float(1.5));
        assert_eq!(
            DataValue::from_json(&serde_json::json!("2024-01-15")),
            DataValue::DateTime("2024-01-15".to_string())
        );
        assert_eq!(DataValue::from_json(&serde_json::json!(null)), DataValue::Null);
    }

    #[test]
    fn test_type_merge() {
        assert_eq!(DataType::Integer.merge(&DataType::Float), DataType::Float);
        assert_eq!(DataType::Null.merge(&DataType::String), DataType::String);
        assert_eq!(DataType::Boolean.merge(&DataType::String), DataType::Mixed);
    }

    #[test]
    fn test_infer_column_types() {
        let mut table = DataTable::new("people");
        table.add_column(DataColumn::new("name"));
        table.add_column(DataColumn::new("age"));
        table.add_row(DataRow::new().with("name", "Bob").with("age", 30i64));
        table.add_row(DataRow::new().with("name", "Al"));
        table.infer_column_types();

        let age = table.get_column("age").unwrap();
        assert_eq!(age.data_type, DataType::Integer);
        assert_eq!(age.null_count, 1);
        assert!(age.nullable);
    }
}
