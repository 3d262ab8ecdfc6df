//! Filter, sort, page and export tabular records.
//!
//! The engine in [`data`] is a set of pure functions over shared rows.
//! [`state`] drives it through events, and the binary wraps both in a
//! command-line front end and an interactive shell.

pub mod commands;
pub mod completer;
pub mod config;
pub mod data;
pub mod logging;
pub mod repl;
pub mod state;
pub mod table_display;
pub mod utils;

pub use data::column::{ColumnDef, FilterType};
pub use data::datatable::{DataRow, DataTable, DataValue};
pub use data::filter::{ColumnFilter, FilterState};
pub use data::sort::{SortDirection, SortKey};
pub use state::{StateDispatcher, TableEvent, TableState};
