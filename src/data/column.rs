//! Column schema model
//!
//! A `ColumnDef` says how to read one dimension of a row (a named field or
//! a derived value), how it may be filtered and how it is labelled.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::data::datatable::{DataRow, DataTable, DataType, DataValue};

/// Computes a value from the row and its position in the collection being read
pub type DeriveFn = Arc<dyn Fn(&DataRow, usize) -> DataValue + Send + Sync>;

/// Display-only transform. Never consulted by filtering, sorting or export.
pub type RenderFn = Arc<dyn Fn(&DataValue, &DataRow, usize) -> String + Send + Sync>;

/// Headers a derived column may carry and still be exported
pub const NUMBERING_HEADERS: [&str; 3] = ["No", "#", "Number"];

#[derive(Clone)]
pub enum ColumnKey {
    Field(String),
    Derived(DeriveFn),
}

impl ColumnKey {
    pub fn field_name(&self) -> Option<&str> {
        match self {
            ColumnKey::Field(name) => Some(name),
            ColumnKey::Derived(_) => None,
        }
    }

    /// Read the cell for `row`. `index` only matters to derived keys.
    pub fn read<'a>(&self, row: &'a DataRow, index: usize) -> Cow<'a, DataValue> {
        match self {
            ColumnKey::Field(name) => Cow::Borrowed(row.get(name)),
            ColumnKey::Derived(derive) => Cow::Owned(derive(row, index)),
        }
    }
}

impl fmt::Debug for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            ColumnKey::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

/// A structured label, e.g. text with a styled unit suffix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Label {
    Text(String),
    /// Children may be absent (conditionally rendered parts)
    Node(Vec<Option<Label>>),
}

impl Label {
    pub fn text(text: impl Into<String>) -> Self {
        Label::Text(text.into())
    }

    pub fn node<I>(children: I) -> Self
    where
        I: IntoIterator<Item = Label>,
    {
        Label::Node(children.into_iter().map(Some).collect())
    }

    /// Depth-first concatenation of the text leaves, single-space separated.
    /// Empty when the tree carries no text at all.
    pub fn extract_text(&self) -> String {
        match self {
            Label::Text(text) => text.clone(),
            Label::Node(children) => children
                .iter()
                .flatten()
                .map(Label::extract_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Header {
    Text(String),
    Rich(Label),
}

impl Header {
    pub fn plain_text(&self) -> Option<&str> {
        match self {
            Header::Text(text) => Some(text),
            Header::Rich(_) => None,
        }
    }

    /// Text used when drawing the header row
    pub fn display_text(&self) -> String {
        match self {
            Header::Text(text) => text.clone(),
            Header::Rich(label) => label.extract_text(),
        }
    }
}

impl From<&str> for Header {
    fn from(text: &str) -> Self {
        Header::Text(text.to_string())
    }
}

impl From<String> for Header {
    fn from(text: String) -> Self {
        Header::Text(text)
    }
}

impl From<Label> for Header {
    fn from(label: Label) -> Self {
        Header::Rich(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
}

impl FilterType {
    /// Filter widget that suits a loaded column type
    pub fn from_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Integer | DataType::Float => FilterType::Number,
            DataType::DateTime => FilterType::Date,
            DataType::Boolean => FilterType::Boolean,
            _ => FilterType::String,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterType::String => "string",
            FilterType::Number => "number",
            FilterType::Date => "date",
            FilterType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct ColumnDef {
    pub key: ColumnKey,
    pub header: Header,
    pub filterable: bool,
    pub filter_type: FilterType,
    pub visible: bool,
    pub render: Option<RenderFn>,
}

impl ColumnDef {
    /// Column reading `row[name]`, headed by its own name
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            header: Header::Text(name.clone()),
            key: ColumnKey::Field(name),
            filterable: false,
            filter_type: FilterType::default(),
            visible: true,
            render: None,
        }
    }

    pub fn derived<F>(header: impl Into<Header>, derive: F) -> Self
    where
        F: Fn(&DataRow, usize) -> DataValue + Send + Sync + 'static,
    {
        Self {
            key: ColumnKey::Derived(Arc::new(derive)),
            header: header.into(),
            filterable: false,
            filter_type: FilterType::default(),
            visible: true,
            render: None,
        }
    }

    /// The conventional 1-based row numbering column
    pub fn row_number(header: impl Into<Header>) -> Self {
        Self::derived(header, |_, index| DataValue::Integer(index as i64 + 1))
    }

    pub fn with_header(mut self, header: impl Into<Header>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_filter(mut self, filter_type: FilterType) -> Self {
        self.filterable = true;
        self.filter_type = filter_type;
        self
    }

    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&DataValue, &DataRow, usize) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn field_name(&self) -> Option<&str> {
        self.key.field_name()
    }

    /// Derived columns are never filtered, whatever `filterable` says
    pub fn is_filterable(&self) -> bool {
        self.filterable && self.field_name().is_some()
    }

    pub fn is_sortable(&self) -> bool {
        self.field_name().is_some_and(|name| !name.is_empty())
    }

    /// True for a derived column labelled like a row counter
    pub fn is_numbering(&self, numbering_headers: &[String]) -> bool {
        matches!(self.key, ColumnKey::Derived(_))
            && self
                .header
                .plain_text()
                .is_some_and(|text| numbering_headers.iter().any(|h| h == text))
    }

    pub fn value<'a>(&self, row: &'a DataRow, index: usize) -> Cow<'a, DataValue> {
        self.key.read(row, index)
    }

    /// Text shown in a cell, after the optional render transform
    pub fn render_cell(&self, row: &DataRow, index: usize) -> String {
        let value = self.value(row, index);
        match &self.render {
            Some(render) => render(&value, row, index),
            None => value.to_string(),
        }
    }
}

impl fmt::Debug for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("filterable", &self.filterable)
            .field("filter_type", &self.filter_type)
            .field("visible", &self.visible)
            .field("render", &self.render.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Look up a column by its field name
pub fn find_column<'a>(columns: &'a [ColumnDef], name: &str) -> Option<&'a ColumnDef> {
    columns.iter().find(|c| c.field_name() == Some(name))
}

/// Default schema for a loaded table: one filterable, visible column per
/// source column, filter widget chosen from the inferred type.
pub fn infer_schema(table: &DataTable, row_numbers: bool) -> Vec<ColumnDef> {
    let mut columns = Vec::with_capacity(table.column_count() + 1);
    if row_numbers {
        columns.push(ColumnDef::row_number("No"));
    }
    for column in &table.columns {
        columns.push(
            ColumnDef::field(column.name.clone())
                .with_filter(FilterType::from_data_type(column.data_type)),
        );
    }
    columns
}
