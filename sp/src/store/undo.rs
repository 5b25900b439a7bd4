//! Undo log - bounded stack of pre-mutation snapshots
//!
//! Process-lifetime only; never persisted. The log does no restoration
//! itself - applying a popped snapshot back onto the plan store is the
//! caller's responsibility, as a full-state replace.

use std::collections::VecDeque;
use tracing::debug;

use crate::domain::Semester;

/// Default number of retained snapshots
pub const DEFAULT_UNDO_CAPACITY: usize = 10;

/// One recorded snapshot with its human-readable description
#[derive(Debug, Clone)]
pub struct UndoEntry {
    /// What the mutation about to happen was (e.g., "Move CS-101 to Spring Y1")
    pub description: String,
    /// Deep copy of the semester sequence before the mutation
    pub semesters: Vec<Semester>,
}

/// Bounded snapshot stack, oldest entries evicted on overflow
pub struct UndoLog {
    entries: VecDeque<UndoEntry>,
    capacity: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoLog {
    /// Create a log retaining at most `capacity` snapshots
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Push a snapshot, evicting the oldest entry if at capacity
    pub fn record(&mut self, description: impl Into<String>, semesters: Vec<Semester>) {
        let description = description.into();
        debug!(%description, depth = self.entries.len(), "UndoLog::record");
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(UndoEntry { description, semesters });
    }

    /// Remove and return the most recent snapshot
    pub fn pop(&mut self) -> Option<UndoEntry> {
        let entry = self.entries.pop_back();
        debug!(found = entry.is_some(), "UndoLog::pop");
        entry
    }

    /// Number of retained snapshots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log has no snapshots
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all snapshots (plan replaced wholesale)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
