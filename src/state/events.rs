//! Table events and the notices they can raise

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::filter::{BoolTerm, FilterTerm};

/// Which end of a numeric range an input edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberBound {
    Min,
    Max,
}

impl fmt::Display for NumberBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberBound::Min => f.write_str("min"),
            NumberBound::Max => f.write_str("max"),
        }
    }
}

/// Events a table UI emits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableEvent {
    /// Global search text changed
    SetSearch(String),

    /// Select or deselect one term of a text filter
    ToggleFilterValue { column: String, term: FilterTerm },

    /// Select or deselect one term of a boolean filter
    ToggleBooleanValue { column: String, term: BoolTerm },

    /// Raw keystroke-level input for one bound of a number filter
    SetNumberBound {
        column: String,
        bound: NumberBound,
        input: String,
    },

    SetDateRange {
        column: String,
        from: String,
        to: String,
    },

    ClearColumnFilter(String),

    /// Header click
    ToggleSort(String),

    GoToPage(usize),
    NextPage,
    PrevPage,

    /// Drop filters, search and sort
    ClearAll,

    /// Produce the CSV download of the filtered rows
    Export,
}

impl TableEvent {
    /// True for events that change which rows match or their order
    pub fn changes_query(&self) -> bool {
        !matches!(
            self,
            TableEvent::GoToPage(_) | TableEvent::NextPage | TableEvent::PrevPage | TableEvent::Export
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Non-blocking message for the user, e.g. a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Warning => write!(f, "warning: {}", self.message),
        }
    }
}
