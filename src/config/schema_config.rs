//! Column schema files
//!
//! ```toml
//! [[columns]]
//! row_number = true
//! header = "No"
//!
//! [[columns]]
//! key = "amount"
//! header_parts = ["Amount", "(RM)"]
//! filterable = true
//! filter_type = "number"
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::data::column::{ColumnDef, FilterType, Header, Label};
use crate::data::datatable::DataTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSpec {
    /// Field read from each row. Omitted for row-number columns.
    pub key: Option<String>,

    /// Plain header text; defaults to the key
    pub header: Option<String>,

    /// Rich header built from separate parts, e.g. a label and a unit
    pub header_parts: Vec<String>,

    pub filterable: bool,

    /// Defaults to the type inferred for the loaded column
    pub filter_type: Option<FilterType>,

    pub visible: bool,

    /// Derived 1-based row counter instead of a field
    pub row_number: bool,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            key: None,
            header: None,
            header_parts: Vec::new(),
            filterable: false,
            filter_type: None,
            visible: true,
            row_number: false,
        }
    }
}

impl ColumnSpec {
    fn header(&self) -> Option<Header> {
        if !self.header_parts.is_empty() {
            return Some(Header::Rich(Label::node(
                self.header_parts.iter().map(|part| Label::text(part.clone())),
            )));
        }
        self.header.clone().map(Header::Text)
    }

    fn to_column(&self, position: usize, table: Option<&DataTable>) -> Result<ColumnDef> {
        if self.row_number {
            let header = self.header().unwrap_or_else(|| Header::from("No"));
            return Ok(ColumnDef::row_number(header).with_visible(self.visible));
        }

        let Some(key) = self.key.as_deref().filter(|key| !key.is_empty()) else {
            bail!("Column {} needs a key or row_number = true", position + 1);
        };

        let mut column = ColumnDef::field(key).with_visible(self.visible);
        if let Some(header) = self.header() {
            column = column.with_header(header);
        }
        if self.filterable {
            let filter_type = self.filter_type.unwrap_or_else(|| {
                table
                    .and_then(|t| t.get_column(key))
                    .map(|c| FilterType::from_data_type(c.data_type))
                    .unwrap_or_default()
            });
            column = column.with_filter(filter_type);
        } else if let Some(filter_type) = self.filter_type {
            column.filter_type = filter_type;
        }
        Ok(column)
    }
}

impl SchemaConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid schema file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let schema: SchemaConfig = toml::from_str(contents)?;
        if schema.columns.is_empty() {
            bail!("Schema defines no columns");
        }
        Ok(schema)
    }

    /// Build column definitions; `table` supplies filter types left unspecified
    pub fn to_columns(&self, table: Option<&DataTable>) -> Result<Vec<ColumnDef>> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(position, spec)| spec.to_column(position, table))
            .collect::<Result<Vec<_>>>()?;
        debug!("Schema with {} columns", columns.len());
        Ok(columns)
    }
}
