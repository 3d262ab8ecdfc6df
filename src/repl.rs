//! Interactive shell over one loaded table

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Emacs, FileBackedHistory, KeyCode, KeyModifiers,
    MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline,
    ReedlineEvent, ReedlineMenu, Signal,
};
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::commands::{Command, HELP};
use crate::completer::CommandCompleter;
use crate::config::Config;
use crate::data::column::FilterType;
use crate::data::sort::describe;
use crate::logging::LogRingBuffer;
use crate::state::{NoticeLevel, StateDispatcher, TableEvent};
use crate::table_display::{render_boolean_facets, render_page, render_text_facets};
use crate::utils::app_paths::AppPaths;

const HISTORY_SIZE: usize = 500;

struct GridPrompt {
    label: String,
}

impl Prompt for GridPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.label)
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "> ".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                reedline::PromptViMode::Normal => "N> ".into(),
                reedline::PromptViMode::Insert => "I> ".into(),
            },
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

pub struct Shell {
    dispatcher: StateDispatcher,
    config: Config,
    logs: Option<LogRingBuffer>,
}

impl Shell {
    pub fn new(dispatcher: StateDispatcher, config: Config, logs: Option<LogRingBuffer>) -> Self {
        Self {
            dispatcher,
            config,
            logs,
        }
    }

    pub fn dispatcher(&self) -> &StateDispatcher {
        &self.dispatcher
    }

    fn prompt_label(&self) -> String {
        let page = self.dispatcher.current_page();
        format!(
            "datagrid [{} rows, page {}/{}]",
            self.dispatcher.view().filtered_count(),
            page.page,
            page.total_pages
        )
    }

    fn max_column_width(&self) -> usize {
        self.config.display.max_column_width as usize
    }

    pub fn render(&self) -> String {
        render_page(&self.dispatcher, self.max_column_width())
    }

    /// Run one command line. `Ok(None)` means the user asked to quit.
    pub fn execute(&mut self, line: &str) -> Result<Option<String>> {
        let command = Command::parse(line)?;
        debug!(target: "state", "shell command {:?}", command);

        let events = command.to_events(self.dispatcher.view().columns())?;
        let changes_query = events.iter().any(TableEvent::changes_query);
        let before = self.dispatcher.state().clone();
        let outcome = self.dispatcher.dispatch_all(events);

        let mut out = Vec::new();
        if let Some(notice) = &outcome.notice {
            out.push(match notice.level {
                NoticeLevel::Warning => notice.message.clone().yellow().to_string(),
                NoticeLevel::Info => notice.message.clone(),
            });
        }

        match &command {
            Command::Quit => return Ok(None),
            Command::Help => out.push(help_text()),
            Command::Show => out.push(self.render()),
            Command::History => {
                for (index, event) in self.dispatcher.get_event_history().enumerate() {
                    out.push(format!("{:>3}  {:?}", index + 1, event));
                }
                if out.is_empty() {
                    out.push("No events yet".to_string());
                }
            }
            Command::Logs(count) => match &self.logs {
                Some(buffer) => out.extend(
                    buffer
                        .get_recent(*count)
                        .iter()
                        .map(|entry| entry.format_for_display()),
                ),
                None => out.push("Logging is not initialized".to_string()),
            },
            Command::Facets(field) => out.push(self.facets(field)?),
            Command::Export(path) => {
                let file = outcome
                    .export
                    .context("Export produced no file")?;
                let target = path
                    .as_ref()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(&file.filename));
                let written = file.write_to(&target)?;
                out.push(
                    format!("Exported {} rows to {}", file.row_count, written.display())
                        .green()
                        .to_string(),
                );
            }
            _ => {
                if changes_query && self.dispatcher.state() == &before {
                    warn!(target: "state", "command had no effect: {}", line.trim());
                    out.push("No change (see `logs` for details)".yellow().to_string());
                }
                out.push(self.render());
                let sort = &self.dispatcher.state().sort;
                if !sort.is_empty() {
                    out.push(format!("sorted by {}", describe(sort)));
                }
            }
        }

        Ok(Some(out.join("\n")))
    }

    fn facets(&self, field: &str) -> Result<String> {
        let view = self.dispatcher.view();
        let column = view
            .column(field)
            .with_context(|| format!("Unknown column {:?}", field))?;
        let rendered = match column.filter_type {
            FilterType::Boolean => render_boolean_facets(field, &view.boolean_facets(field)),
            _ => render_text_facets(field, &view.text_facets(field)),
        };
        Ok(rendered)
    }

    /// Read-eval-print loop on the terminal
    pub fn run(&mut self) -> Result<()> {
        let columns: Vec<String> = self
            .dispatcher
            .view()
            .columns()
            .iter()
            .filter_map(|c| c.field_name().map(str::to_string))
            .collect();

        let mut line_editor = Reedline::create()
            .with_completer(Box::new(CommandCompleter::new(columns)))
            .with_menu(ReedlineMenu::EngineCompleter(Box::new(
                ColumnarMenu::default()
                    .with_name("command_completion")
                    .with_columns(1)
                    .with_column_padding(2),
            )))
            .with_edit_mode(Box::new(Emacs::new({
                let mut keybindings = default_emacs_keybindings();
                keybindings.add_binding(
                    KeyModifiers::NONE,
                    KeyCode::Tab,
                    ReedlineEvent::Menu("command_completion".to_string()),
                );
                keybindings
            })));

        match AppPaths::history_file() {
            Ok(path) => match FileBackedHistory::with_file(HISTORY_SIZE, path) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => warn!("Command history disabled: {}", e),
            },
            Err(e) => warn!("Command history disabled: {}", e),
        }

        println!("{}", "datagrid - type `help` for commands".blue().bold());
        println!("{}", self.render());

        loop {
            let prompt = GridPrompt {
                label: self.prompt_label(),
            };
            match line_editor.read_line(&prompt).context("Failed to read input")? {
                Signal::Success(buffer) => {
                    if buffer.trim().is_empty() {
                        continue;
                    }
                    match self.execute(&buffer) {
                        Ok(Some(output)) => {
                            if !output.is_empty() {
                                println!("{}", output);
                            }
                        }
                        Ok(None) => break,
                        Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
                    }
                }
                Signal::CtrlD | Signal::CtrlC => break,
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }
}

pub fn help_text() -> String {
    let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    HELP.iter()
        .map(|(usage, text)| format!("  {:<width$}  {}", usage, text, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::ColumnDef;
    use crate::data::datatable::DataRow;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn shell() -> Shell {
        let rows = vec![
            DataRow::new().with("name", "Bob").with("age", 30i64).with("ok", true),
            DataRow::new().with("name", "Al").with("age", 25i64).with("ok", false),
            DataRow::new().with("name", "Cy").with("age", 25i64),
        ];
        let columns = vec![
            ColumnDef::field("name").with_filter(FilterType::String),
            ColumnDef::field("age").with_filter(FilterType::Number),
            ColumnDef::field("ok").with_filter(FilterType::Boolean),
        ];
        let dispatcher = StateDispatcher::new(Arc::new(rows), Arc::new(columns), 10);
        Shell::new(dispatcher, Config::default(), None)
    }

    #[test]
    fn test_commands_drive_state() -> Result<()> {
        let mut shell = shell();
        shell.execute("range age 25..25")?;
        shell.execute("sort name")?;
        shell.execute("sort name")?;
        let state = shell.dispatcher().state();
        assert_eq!(describe(&state.sort), "name desc");
        assert_eq!(shell.dispatcher().view().filtered_count(), 2);
        Ok(())
    }

    #[test]
    fn test_quit_and_errors() {
        let mut shell = shell();
        assert!(shell.execute("quit").unwrap().is_none());
        assert!(shell.execute("bogus").is_err());
        assert!(shell.execute("facets missing").is_err());
    }

    #[test]
    fn test_inverted_range_prints_warning() -> Result<()> {
        let mut shell = shell();
        let output = shell.execute("range age 30..20")?.unwrap_or_default();
        assert!(output.contains("Max value should not be less than Min value"));
        Ok(())
    }

    #[test]
    fn test_out_of_range_page_prints_notice() -> Result<()> {
        let mut shell = shell();
        let output = shell.execute("page 9")?.unwrap_or_default();
        assert!(output.starts_with("Page 9 is out of range, showing page 1 of 1"));
        assert_eq!(shell.dispatcher().state().current_page, 1);
        Ok(())
    }

    #[test]
    fn test_boolean_facets_command() -> Result<()> {
        let mut shell = shell();
        let output = shell.execute("facets ok")?.unwrap_or_default();
        assert!(output.contains("Active"));
        assert!(output.contains("Not Set"));
        Ok(())
    }

    #[test]
    fn test_export_command_writes_file() -> Result<()> {
        let dir = TempDir::new()?;
        let mut shell = shell();
        shell.execute("search o")?;
        let target = dir.path().join("out.csv");
        shell.execute(&format!("export {}", target.display()))?;
        let written = std::fs::read_to_string(&target)?;
        assert_eq!(written, "name,age,ok\nBob,30,true");
        Ok(())
    }
}
