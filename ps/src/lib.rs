//! planfile - durable key/value storage for the semester planner
//!
//! A small file-backed store holding string payloads under string keys.
//! Used by the planner's autosave pipeline to keep the not-yet-confirmed
//! plan payload across process restarts (offline edits, crash recovery).
//!
//! All writes go through an advisory file lock so a CLI invocation and a
//! long-running session can't corrupt each other's pending payloads.

mod store;

pub use store::KvStore;

/// Name of the backing JSON file inside the store directory
pub const STORE_FILE: &str = "planfile.json";
