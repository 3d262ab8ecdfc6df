//! State dispatcher: owns one table's state and view and applies events

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::data::column::ColumnDef;
use crate::data::data_exporter::{ExportFile, ExportOptions};
use crate::data::data_view::DataView;
use crate::data::datatable::DataRow;
use crate::data::pager::Page;
use crate::state::events::{Notice, NoticeLevel, TableEvent};
use crate::state::table_state::{reduce, ReduceContext, TableState};

const DEFAULT_MAX_HISTORY: usize = 100;

/// Everything a caller gets back from one dispatch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    pub notice: Option<Notice>,
    /// Set for `TableEvent::Export`
    pub export: Option<ExportFile>,
}

/// Coordinates a table's state with its memoized view
#[derive(Clone)]
pub struct StateDispatcher {
    state: TableState,

    view: DataView,

    page_size: usize,

    export_options: ExportOptions,

    /// Event history for debugging
    event_history: VecDeque<TableEvent>,

    /// Maximum event history size
    max_history: usize,
}

impl StateDispatcher {
    pub fn new(rows: Arc<Vec<DataRow>>, columns: Arc<Vec<ColumnDef>>, page_size: usize) -> Self {
        Self {
            state: TableState::default(),
            view: DataView::new(rows, columns),
            page_size: page_size.max(1),
            export_options: ExportOptions::default(),
            event_history: VecDeque::new(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn view(&self) -> &DataView {
        &self.view
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the rows, keeping filters, search and sort
    pub fn set_rows(&mut self, rows: Arc<Vec<DataRow>>) {
        self.view.set_rows(rows);
        self.state.current_page = 1;
        self.refresh();
    }

    /// Apply one event
    pub fn dispatch(&mut self, event: TableEvent) -> DispatchOutcome {
        debug!(target: "state", "dispatching {:?}", event);

        self.event_history.push_back(event.clone());
        while self.event_history.len() > self.max_history {
            self.event_history.pop_front();
        }

        let total_pages = self.view.total_pages(self.page_size);
        let transition = {
            let ctx = ReduceContext {
                columns: self.view.columns(),
                total_pages,
            };
            reduce(&self.state, &event, &ctx)
        };

        if transition.state != self.state {
            self.state = transition.state;
            self.refresh();
        }

        if let Some(notice) = &transition.notice {
            match notice.level {
                NoticeLevel::Warning => warn!(target: "state", "{}", notice),
                NoticeLevel::Info => info!(target: "state", "{}", notice),
            }
        }

        let export = matches!(event, TableEvent::Export).then(|| {
            let file = self.view.export(&self.export_options);
            info!(
                target: "export",
                "prepared {} ({} rows)",
                file.filename,
                file.row_count
            );
            file
        });

        DispatchOutcome {
            notice: transition.notice,
            export,
        }
    }

    /// Apply several events in order, keeping the last notice
    pub fn dispatch_all<I>(&mut self, events: I) -> DispatchOutcome
    where
        I: IntoIterator<Item = TableEvent>,
    {
        let mut outcome = DispatchOutcome::default();
        for event in events {
            let next = self.dispatch(event);
            if next.notice.is_some() {
                outcome.notice = next.notice;
            }
            if next.export.is_some() {
                outcome.export = next.export;
            }
        }
        outcome
    }

    /// The page currently shown, as source row positions
    pub fn current_page(&self) -> Page<usize> {
        self.view.page(self.state.current_page, self.page_size)
    }

    /// Get event history for debugging
    pub fn get_event_history(&self) -> impl Iterator<Item = &TableEvent> {
        self.event_history.iter()
    }

    fn refresh(&mut self) {
        let TableState {
            filters,
            search,
            sort,
            ..
        } = &self.state;
        self.view.refresh(filters, search, sort);
    }
}
