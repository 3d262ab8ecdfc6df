//! Table state management
//!
//! `TableState` is an immutable value threaded through `reduce`; the
//! `StateDispatcher` owns one table's state together with its view.

pub mod dispatcher;
pub mod events;
pub mod table_state;

pub use dispatcher::{DispatchOutcome, StateDispatcher};
pub use events::{Notice, NoticeLevel, NumberBound, TableEvent};
pub use table_state::{reduce, ReduceContext, TableState, Transition};
