//! Plan state ownership
//!
//! [`PlanStore`] owns the canonical semesters collection and applies
//! mutations atomically; [`UndoLog`] keeps bounded pre-mutation snapshots.

mod plan_store;
mod undo;

pub use plan_store::PlanStore;
pub use undo::{UndoEntry, UndoLog, DEFAULT_UNDO_CAPACITY};
