//! Shell commands and their translation into table events
//!
//! The same parsing backs the interactive prompt and the one-shot
//! command-line flags (`--filter name=bob`, `--range age=25..30`).

use anyhow::{anyhow, bail, Result};

use crate::data::column::{find_column, ColumnDef, FilterType};
use crate::data::filter::{BoolTerm, FilterTerm};
use crate::state::{NumberBound, TableEvent};

/// Literal standing for the "Not Set" choice of a filter
pub const NOT_SET: &str = ":notset";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Filter { column: String, value: String },
    Range { column: String, min: String, max: String },
    Dates { column: String, from: String, to: String },
    Clear(String),
    Sort(String),
    Page(usize),
    Next,
    Prev,
    Facets(String),
    Export(Option<String>),
    Reset,
    Show,
    History,
    Logs(usize),
    Help,
    Quit,
}

/// Split `a..b` into its bounds; either side may be empty
pub fn split_range(text: &str) -> Result<(String, String)> {
    let (low, high) = text
        .split_once("..")
        .ok_or_else(|| anyhow!("Expected a range like MIN..MAX, got {:?}", text))?;
    Ok((low.trim().to_string(), high.trim().to_string()))
}

/// Split `COLUMN=VALUE`
pub fn split_assignment(text: &str) -> Result<(String, String)> {
    let (column, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected COLUMN=VALUE, got {:?}", text))?;
    let column = column.trim();
    if column.is_empty() {
        bail!("Missing column name in {:?}", text);
    }
    Ok((column.to_string(), value.to_string()))
}

fn bool_term(value: &str) -> Result<BoolTerm> {
    match value.trim().to_lowercase().as_str() {
        "active" | "true" | "yes" => Ok(BoolTerm::Active),
        "inactive" | "false" | "no" => Ok(BoolTerm::Inactive),
        "notset" | "not set" | NOT_SET => Ok(BoolTerm::NotSet),
        other => bail!("Expected active, inactive or notset, got {:?}", other),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "search" | "/" => Command::Search(rest.to_string()),
            "filter" | "f" => {
                let (column, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("Usage: filter <column> <value|{}>", NOT_SET))?;
                Command::Filter {
                    column: column.to_string(),
                    value: value.trim().to_string(),
                }
            }
            "range" => {
                let (column, range) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("Usage: range <column> <min>..<max>"))?;
                let (min, max) = split_range(range)?;
                Command::Range {
                    column: column.to_string(),
                    min,
                    max,
                }
            }
            "dates" => {
                let (column, range) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| anyhow!("Usage: dates <column> <from>..<to>"))?;
                let (from, to) = split_range(range)?;
                Command::Dates {
                    column: column.to_string(),
                    from,
                    to,
                }
            }
            "clear" => {
                if rest.is_empty() {
                    bail!("Usage: clear <column> (use `reset` to clear everything)");
                }
                Command::Clear(rest.to_string())
            }
            "sort" | "s" => {
                if rest.is_empty() {
                    bail!("Usage: sort <column>");
                }
                Command::Sort(rest.to_string())
            }
            "page" | "p" => {
                let page = rest
                    .parse::<usize>()
                    .map_err(|_| anyhow!("Usage: page <number>"))?;
                Command::Page(page)
            }
            "next" | "n" => Command::Next,
            "prev" | "b" => Command::Prev,
            "facets" => {
                if rest.is_empty() {
                    bail!("Usage: facets <column>");
                }
                Command::Facets(rest.to_string())
            }
            "export" => Command::Export((!rest.is_empty()).then(|| rest.to_string())),
            "reset" => Command::Reset,
            "show" | "ls" => Command::Show,
            "history" => Command::History,
            "logs" => {
                let count = if rest.is_empty() {
                    20
                } else {
                    rest.parse::<usize>()
                        .map_err(|_| anyhow!("Usage: logs [count]"))?
                };
                Command::Logs(count)
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => bail!("Empty command"),
            other => bail!("Unknown command {:?}; type `help` for the list", other),
        };
        Ok(command)
    }

    /// Events this command dispatches. Commands that only display
    /// something produce none.
    pub fn to_events(&self, columns: &[ColumnDef]) -> Result<Vec<TableEvent>> {
        let events = match self {
            Command::Search(text) => vec![TableEvent::SetSearch(text.clone())],
            Command::Filter { column, value } => vec![filter_event(columns, column, value)?],
            Command::Range { column, min, max } => vec![
                TableEvent::SetNumberBound {
                    column: column.clone(),
                    bound: NumberBound::Min,
                    input: min.clone(),
                },
                TableEvent::SetNumberBound {
                    column: column.clone(),
                    bound: NumberBound::Max,
                    input: max.clone(),
                },
            ],
            Command::Dates { column, from, to } => vec![TableEvent::SetDateRange {
                column: column.clone(),
                from: from.clone(),
                to: to.clone(),
            }],
            Command::Clear(column) => vec![TableEvent::ClearColumnFilter(column.clone())],
            Command::Sort(column) => vec![TableEvent::ToggleSort(column.clone())],
            Command::Page(page) => vec![TableEvent::GoToPage(*page)],
            Command::Next => vec![TableEvent::NextPage],
            Command::Prev => vec![TableEvent::PrevPage],
            Command::Reset => vec![TableEvent::ClearAll],
            Command::Export(_) => vec![TableEvent::Export],
            Command::Facets(_)
            | Command::Show
            | Command::History
            | Command::Logs(_)
            | Command::Help
            | Command::Quit => Vec::new(),
        };
        Ok(events)
    }
}

/// Text and boolean columns take different toggle events
fn filter_event(columns: &[ColumnDef], column: &str, value: &str) -> Result<TableEvent> {
    let definition =
        find_column(columns, column).ok_or_else(|| anyhow!("Unknown column {:?}", column))?;

    let event = match definition.filter_type {
        FilterType::Boolean => TableEvent::ToggleBooleanValue {
            column: column.to_string(),
            term: bool_term(value)?,
        },
        _ => TableEvent::ToggleFilterValue {
            column: column.to_string(),
            term: if value == NOT_SET {
                FilterTerm::NotSet
            } else {
                FilterTerm::value(value)
            },
        },
    };
    Ok(event)
}

pub const HELP: &[(&str, &str)] = &[
    ("search <text>", "Search visible columns (empty text clears)"),
    ("filter <col> <value>", "Toggle a filter value; `:notset` selects blanks"),
    ("range <col> <min>..<max>", "Numeric range, either side may be empty"),
    ("dates <col> <from>..<to>", "Date range in whole days"),
    ("clear <col>", "Remove one column's filter"),
    ("sort <col>", "Cycle ascending, descending, off"),
    ("page <n> | next | prev", "Move between pages"),
    ("facets <col>", "Distinct values with counts"),
    ("export [path]", "Write the filtered rows as CSV"),
    ("reset", "Clear filters, search and sort"),
    ("show", "Print the current page"),
    ("history", "Recent events"),
    ("logs [n]", "Recent log lines"),
    ("help", "This list"),
    ("quit", "Leave"),
];
