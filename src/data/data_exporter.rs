use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::data::column::{ColumnDef, ColumnKey, Header, NUMBERING_HEADERS};
use crate::data::datatable::{DataRow, DataValue};

pub const EXPORT_FILENAME: &str = "data.csv";
pub const EXPORT_MIME_TYPE: &str = "text/csv";

/// Knobs for CSV export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub filename: String,
    /// Plain-text headers that make a derived column exportable
    pub numbering_headers: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: EXPORT_FILENAME.to_string(),
            numbering_headers: NUMBERING_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

/// A finished download: what a browser would save, or what the CLI writes
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
    pub row_count: usize,
}

impl ExportFile {
    /// Write the content to `path`, or to `filename` inside `path` when it is a directory
    pub fn write_to(&self, path: &Path) -> Result<std::path::PathBuf> {
        let target = if path.is_dir() {
            path.join(&self.filename)
        } else {
            path.to_path_buf()
        };
        fs::write(&target, &self.content)
            .with_context(|| format!("Failed to write export to {}", target.display()))?;
        info!(
            target: "export",
            "Exported {} rows to {}",
            self.row_count,
            target.display()
        );
        Ok(target)
    }
}

/// Serializes filtered rows to CSV text
pub struct DataExporter;

impl DataExporter {
    /// Field columns always export; derived columns only when they are row counters
    pub fn exportable_columns<'a>(
        columns: &'a [ColumnDef],
        options: &ExportOptions,
    ) -> Vec<&'a ColumnDef> {
        columns
            .iter()
            .filter(|column| match column.key {
                ColumnKey::Field(_) => true,
                ColumnKey::Derived(_) => column.is_numbering(&options.numbering_headers),
            })
            .collect()
    }

    /// Header cell text before escaping. `position` is 0-based among exportable columns.
    pub fn header_text(column: &ColumnDef, position: usize) -> String {
        match &column.header {
            Header::Text(text) => text.clone(),
            Header::Rich(label) => {
                let text = label.extract_text();
                if !text.is_empty() {
                    return text;
                }
                match column.field_name() {
                    Some(name) => name.to_string(),
                    None => format!("Column {}", position + 1),
                }
            }
        }
    }

    /// Header line, then one line per row. Cells carry raw values, never rendered text.
    pub fn to_csv(rows: &[DataRow], columns: &[ColumnDef], options: &ExportOptions) -> String {
        let exportable = Self::exportable_columns(columns, options);

        let header = exportable
            .iter()
            .enumerate()
            .map(|(position, column)| Self::escape_csv_field(&Self::header_text(column, position)))
            .collect::<Vec<_>>()
            .join(",");

        let body = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                exportable
                    .iter()
                    .map(|column| Self::escape_value(&column.value(row, index)))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join("\n");

        debug!(
            target: "export",
            "csv: {} columns x {} rows",
            exportable.len(),
            rows.len()
        );
        format!("{}\n{}", header, body)
    }

    pub fn export(rows: &[DataRow], columns: &[ColumnDef], options: &ExportOptions) -> ExportFile {
        ExportFile {
            filename: options.filename.clone(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            content: Self::to_csv(rows, columns, options),
            row_count: rows.len(),
        }
    }

    fn escape_value(value: &DataValue) -> String {
        match value {
            DataValue::Null => String::new(),
            other => Self::escape_csv_field(&other.to_string()),
        }
    }

    /// Quote fields holding a comma, quote or newline, doubling inner quotes
    pub fn escape_csv_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::Label;

    #[test]
    fn test_escaping() {
        assert_eq!(DataExporter::escape_csv_field("plain"), "plain");
        assert_eq!(
            DataExporter::escape_csv_field("O'Brien, Jr."),
            "\"O'Brien, Jr.\""
        );
        assert_eq!(
            DataExporter::escape_csv_field("say \"hi\""),
            "\"say \"\"hi\"\"\""
        );
        assert_eq!(DataExporter::escape_csv_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn test_rich_header_and_quoted_value() {
        let columns = vec![
            ColumnDef::field("name"),
            ColumnDef::field("amount").with_header(Label::node([
                Label::text("Amount"),
                Label::node([Label::text("(RM)")]),
            ])),
        ];
        let rows = vec![DataRow::new().with("name", "O'Brien, Jr.").with("amount", 12i64)];
        let csv = DataExporter::to_csv(&rows, &columns, &ExportOptions::default());
        assert_eq!(csv, "name,Amount (RM)\n\"O'Brien, Jr.\",12");
    }

    #[test]
    fn test_numbering_column_exported_others_dropped() {
        let columns = vec![
            ColumnDef::row_number("No"),
            ColumnDef::derived("Full", |row, _| {
                DataValue::String(format!("{}!", row.get("name")))
            }),
            ColumnDef::field("name"),
        ];
        let rows = vec![
            DataRow::new().with("name", "Al"),
            DataRow::new().with("name", "Cy"),
        ];
        let csv = DataExporter::to_csv(&rows, &columns, &ExportOptions::default());
        assert_eq!(csv, "No,name\n1,Al\n2,Cy");
    }

    #[test]
    fn test_header_fallbacks() {
        let empty = Label::Node(vec![None]);
        let field = ColumnDef::field("amount").with_header(empty.clone());
        let counter = ColumnDef::row_number(empty);
        assert_eq!(DataExporter::header_text(&field, 0), "amount");
        assert_eq!(DataExporter::header_text(&counter, 2), "Column 3");
    }

    #[test]
    fn test_null_and_render_are_not_exported() {
        let columns = vec![
            ColumnDef::field("note"),
            ColumnDef::field("price").with_render(|v, _, _| format!("RM {}", v)),
        ];
        let rows = vec![DataRow::new().with("note", DataValue::Null).with("price", 2.5)];
        let csv = DataExporter::to_csv(&rows, &columns, &ExportOptions::default());
        assert_eq!(csv, "note,price\n,2.5");
    }

    #[test]
    fn test_empty_rows_still_emit_header() {
        let columns = vec![ColumnDef::field("name")];
        let file = DataExporter::export(&[], &columns, &ExportOptions::default());
        assert_eq!(file.content, "name\n");
        assert_eq!(file.filename, "data.csv");
        assert_eq!(file.mime_type, "text/csv");
        assert_eq!(file.row_count, 0);
    }

    #[test]
    fn test_custom_numbering_headers() {
        let options = ExportOptions {
            numbering_headers: vec!["Index".to_string()],
            ..ExportOptions::default()
        };
        let columns = vec![ColumnDef::row_number("Index"), ColumnDef::row_number("No")];
        let rows = vec![DataRow::new()];
        assert_eq!(DataExporter::to_csv(&rows, &columns, &options), "Index\n1");
    }
}
