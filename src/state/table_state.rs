//! Table state and its reducer
//!
//! `reduce` is a pure function `(state, event) -> state`. It never touches
//! rows; the caller passes the schema and the current page count.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::data::column::{find_column, ColumnDef, FilterType};
use crate::data::filter::{BoolTerm, ColumnFilter, FilterState, FilterTerm};
use crate::data::sort::{self, SortKey};
use crate::state::events::{Notice, NumberBound, TableEvent};

/// Accepts partial numbers as they are typed: `-`, `.`, `-1.` and so on
static NUMBER_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d*\.?\d*$").expect("number input pattern is valid")
});

pub const MIN_ABOVE_MAX: &str = "Min value should not be greater than Max value";
pub const MAX_BELOW_MIN: &str = "Max value should not be less than Min value";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub filters: FilterState,
    pub search: String,
    pub sort: Vec<SortKey>,
    /// 1-based
    pub current_page: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            filters: FilterState::new(),
            search: String::new(),
            sort: Vec::new(),
            current_page: 1,
        }
    }
}

impl TableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pristine(&self) -> bool {
        !self.filters.has_active() && self.search.is_empty() && self.sort.is_empty()
    }
}

/// What the reducer needs to know about the table besides its state
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub columns: &'a [ColumnDef],
    pub total_pages: usize,
}

/// Result of applying one event
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: TableState,
    pub notice: Option<Notice>,
}

impl Transition {
    fn unchanged(state: &TableState) -> Self {
        Self {
            state: state.clone(),
            notice: None,
        }
    }

    fn to(state: TableState) -> Self {
        Self { state, notice: None }
    }
}

pub fn reduce(state: &TableState, event: &TableEvent, ctx: &ReduceContext<'_>) -> Transition {
    let total_pages = ctx.total_pages.max(1);

    match event {
        TableEvent::SetSearch(text) => {
            let mut next = state.clone();
            next.search = text.clone();
            next.current_page = 1;
            Transition::to(next)
        }

        TableEvent::ToggleFilterValue { column, term } => {
            if !accepts(ctx.columns, column, FilterType::String) {
                return Transition::unchanged(state);
            }
            let mut terms = match state.filters.get(column) {
                Some(ColumnFilter::Text(terms)) => terms.clone(),
                _ => Vec::new(),
            };
            toggle_text_term(&mut terms, term);
            Transition::to(with_filter(state, column, ColumnFilter::Text(terms)))
        }

        TableEvent::ToggleBooleanValue { column, term } => {
            if !accepts(ctx.columns, column, FilterType::Boolean) {
                return Transition::unchanged(state);
            }
            let mut terms = match state.filters.get(column) {
                Some(ColumnFilter::Boolean(terms)) => terms.clone(),
                _ => Vec::new(),
            };
            toggle_bool_term(&mut terms, *term);
            Transition::to(with_filter(state, column, ColumnFilter::Boolean(terms)))
        }

        TableEvent::SetNumberBound { column, bound, input } => {
            if !accepts(ctx.columns, column, FilterType::Number) {
                return Transition::unchanged(state);
            }
            if !NUMBER_INPUT.is_match(input) {
                debug!(target: "state", "rejected {} input {:?} for {}", bound, input, column);
                return Transition::unchanged(state);
            }

            let (mut min, mut max) = match state.filters.get(column) {
                Some(ColumnFilter::Number { min, max }) => (min.clone(), max.clone()),
                _ => (String::new(), String::new()),
            };
            match bound {
                NumberBound::Min => min = input.clone(),
                NumberBound::Max => max = input.clone(),
            }

            let notice = inverted_range_notice(&min, &max, *bound);
            if let Some(notice) = &notice {
                warn!(target: "state", "{}: {}", column, notice.message);
            }

            Transition {
                state: with_filter(state, column, ColumnFilter::Number { min, max }),
                notice,
            }
        }

        TableEvent::SetDateRange { column, from, to } => {
            if !accepts(ctx.columns, column, FilterType::Date) {
                return Transition::unchanged(state);
            }
            Transition::to(with_filter(
                state,
                column,
                ColumnFilter::date(from.trim(), to.trim()),
            ))
        }

        TableEvent::ClearColumnFilter(column) => {
            let mut next = state.clone();
            next.filters.remove(column);
            next.current_page = 1;
            Transition::to(next)
        }

        TableEvent::ToggleSort(column) => {
            let sortable = find_column(ctx.columns, column).is_some_and(ColumnDef::is_sortable);
            if !sortable {
                debug!(target: "state", "ignoring sort on {:?}", column);
                return Transition::unchanged(state);
            }
            let mut next = state.clone();
            next.sort = sort::toggle(&state.sort, column);
            next.current_page = 1;
            Transition::to(next)
        }

        TableEvent::GoToPage(page) => {
            let mut next = state.clone();
            next.current_page = (*page).clamp(1, total_pages);
            let notice = (next.current_page != *page).then(|| {
                Notice::info(format!(
                    "Page {} is out of range, showing page {} of {}",
                    page, next.current_page, total_pages
                ))
            });
            Transition {
                state: next,
                notice,
            }
        }

        TableEvent::NextPage => {
            let mut next = state.clone();
            next.current_page = (state.current_page + 1).min(total_pages);
            Transition::to(next)
        }

        TableEvent::PrevPage => {
            let mut next = state.clone();
            next.current_page = state.current_page.saturating_sub(1).max(1);
            Transition::to(next)
        }

        TableEvent::ClearAll => Transition::to(TableState::default()),

        TableEvent::Export => Transition::unchanged(state),
    }
}

/// Filter events only apply to filterable field columns of the matching type
fn accepts(columns: &[ColumnDef], name: &str, expected: FilterType) -> bool {
    match find_column(columns, name) {
        Some(column) if column.is_filterable() && column.filter_type == expected => true,
        Some(column) => {
            warn!(
                target: "state",
                "ignoring {} filter on {:?} (filterable: {}, type: {})",
                expected,
                name,
                column.is_filterable(),
                column.filter_type
            );
            false
        }
        None => {
            warn!(target: "state", "ignoring {} filter on unknown column {:?}", expected, name);
            false
        }
    }
}

/// Store the entry, dropping it when it no longer constrains anything
fn with_filter(state: &TableState, column: &str, filter: ColumnFilter) -> TableState {
    let mut next = state.clone();
    if filter.is_empty() {
        next.filters.remove(column);
    } else {
        next.filters.set(column, filter);
    }
    next.current_page = 1;
    next
}

fn toggle_text_term(terms: &mut Vec<FilterTerm>, term: &FilterTerm) {
    if let Some(position) = terms.iter().position(|t| t == term) {
        terms.remove(position);
        return;
    }
    if *term == FilterTerm::NotSet {
        terms.retain(|t| !matches!(t, FilterTerm::Value(text) if text.is_empty()));
    }
    terms.push(term.clone());
}

fn toggle_bool_term(terms: &mut Vec<BoolTerm>, term: BoolTerm) {
    match terms.iter().position(|t| *t == term) {
        Some(position) => {
            terms.remove(position);
        }
        None => terms.push(term),
    }
}

/// Warn when both bounds are numbers and min exceeds max. The message
/// depends on which bound was just edited.
fn inverted_range_notice(min: &str, max: &str, edited: NumberBound) -> Option<Notice> {
    let (Ok(low), Ok(high)) = (min.parse::<f64>(), max.parse::<f64>()) else {
        return None;
    };
    if low <= high {
        return None;
    }
    let message = match edited {
        NumberBound::Min => MIN_ABOVE_MAX,
        NumberBound::Max => MAX_BELOW_MIN,
    };
    Some(Notice::warning(message))
}
