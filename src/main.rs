use anyhow::{Context, Result};
use clap::Parser;
use crossterm::style::Stylize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use datagrid::commands::{split_assignment, split_range, Command};
use datagrid::config::{Config, SchemaConfig};
use datagrid::data::column::infer_schema;
use datagrid::data::datatable_loaders::load_file;
use datagrid::logging::init_tracing;
use datagrid::repl::Shell;
use datagrid::state::{NoticeLevel, StateDispatcher, TableEvent};

#[derive(Parser, Debug)]
#[command(name = "datagrid")]
#[command(version)]
#[command(about = "Filter, sort, page and export tabular data from the terminal")]
#[command(long_about = "datagrid loads a CSV file or a JSON array of objects and shows it
as a paged table. Flags apply filters, search and sorting once and print the
resulting page; --interactive opens a shell with the same commands.

EXAMPLES:
  datagrid people.csv --search bob
  datagrid people.csv --range age=25..40 --sort age --sort name
  datagrid people.json --filter role=Admin --export admins.csv
  datagrid people.csv --schema columns.toml -i")]
struct Args {
    /// CSV or JSON file to load
    #[arg(value_name = "FILE", required_unless_present = "init_config")]
    file: Option<PathBuf>,

    /// Column definitions (TOML); inferred from the data when omitted
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Prepend a row-number column when inferring columns
    #[arg(long)]
    row_numbers: bool,

    /// Rows per page (overrides the config file)
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Page to show
    #[arg(long, value_name = "N")]
    page: Option<usize>,

    /// Global search text
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Toggle sorting on a column; repeat for more keys or to flip direction
    #[arg(long, value_name = "COLUMN")]
    sort: Vec<String>,

    /// Toggle a filter value, e.g. --filter role=Admin (`:notset` for blanks)
    #[arg(long, value_name = "COLUMN=VALUE")]
    filter: Vec<String>,

    /// Numeric range, e.g. --range age=25..40
    #[arg(long, value_name = "COLUMN=MIN..MAX")]
    range: Vec<String>,

    /// Date range in whole days, e.g. --dates joined=2024-01-01..2024-03-31
    #[arg(long, value_name = "COLUMN=FROM..TO")]
    dates: Vec<String>,

    /// Write the filtered rows as CSV to this file or directory
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Open the interactive shell after applying flags
    #[arg(short, long)]
    interactive: bool,

    /// Echo log output to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    init_config: bool,
}

impl Args {
    /// Flags as shell commands, in the order they are applied
    fn commands(&self) -> Result<Vec<Command>> {
        let mut commands = Vec::new();

        for assignment in &self.filter {
            let (column, value) = split_assignment(assignment)?;
            commands.push(Command::Filter { column, value });
        }
        for assignment in &self.range {
            let (column, range) = split_assignment(assignment)?;
            let (min, max) = split_range(&range)?;
            commands.push(Command::Range { column, min, max });
        }
        for assignment in &self.dates {
            let (column, range) = split_assignment(assignment)?;
            let (from, to) = split_range(&range)?;
            commands.push(Command::Dates { column, from, to });
        }
        if let Some(text) = &self.search {
            commands.push(Command::Search(text.clone()));
        }
        for column in &self.sort {
            commands.push(Command::Sort(column.clone()));
        }
        // Any query change resets to page 1, so the page goes last
        if let Some(page) = self.page {
            commands.push(Command::Page(page));
        }
        Ok(commands)
    }
}

fn init_config(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => Config::get_config_path()?,
    };
    let (path, written) = Config::init_default_file(&path)?;
    if written {
        println!("Wrote default configuration to {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.init_config {
        return init_config(args.config);
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: could not load config ({:#}), using defaults", e);
            Config::default()
        }),
    };

    let logs = init_tracing(
        &config.logging.default_filter,
        config.logging.ring_buffer,
        args.verbose,
    );

    let file = args.file.as_ref().context("No input file given")?;
    let table = load_file(file)?;
    info!(target: "loader", "Loaded {} rows from {}", table.row_count(), file.display());

    let columns = match &args.schema {
        Some(path) => SchemaConfig::load(path)?.to_columns(Some(&table))?,
        None => infer_schema(&table, args.row_numbers || config.display.show_row_numbers),
    };

    let page_size = args.page_size.unwrap_or(config.display.page_size);
    let mut dispatcher = StateDispatcher::new(
        Arc::new(table.rows),
        Arc::new(columns),
        page_size,
    )
    .with_export_options(config.export.to_options());

    for command in args.commands()? {
        let events = command.to_events(dispatcher.view().columns())?;
        if let Some(notice) = dispatcher.dispatch_all(events).notice {
            match notice.level {
                NoticeLevel::Warning => {
                    warn!(target: "state", "{}", notice.message);
                    eprintln!("{}", notice.message.yellow());
                }
                NoticeLevel::Info => eprintln!("{}", notice.message),
            }
        }
    }

    if let Some(path) = &args.export {
        let export = dispatcher
            .dispatch(TableEvent::Export)
            .export
            .context("Export produced no file")?;
        let written = export.write_to(path)?;
        eprintln!(
            "{}",
            format!("Exported {} rows to {}", export.row_count, written.display()).green()
        );
    }

    let mut shell = Shell::new(dispatcher, config, Some(logs));
    if args.interactive {
        shell.run()
    } else {
        println!("{}", shell.render());
        Ok(())
    }
}
