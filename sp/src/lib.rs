//! SemPlan - Semester Plan State & Validation Engine
//!
//! SemPlan owns the canonical in-memory representation of a multi-semester
//! academic plan, validates proposed mutations against degree-planning
//! constraints, applies accepted mutations atomically, keeps a bounded undo
//! history, and persists state through a debounced, offline-tolerant
//! autosave pipeline.
//!
//! # Core Concepts
//!
//! - **Validate, then commit**: the constraint validator is a pure function;
//!   the plan store trusts its caller, so a caller can surface warnings and
//!   still commit
//! - **One relocate primitive**: every placement path funnels through a
//!   single detach/attach pair, keeping course back-references in lock-step
//!   with semester membership
//! - **Eventual persistence**: edits collapse into a single trailing-edge
//!   debounced save; offline edits queue durably and replay on reconnect
//!
//! # Modules
//!
//! - [`domain`] - Course, semester, plan, and violation types
//! - [`validation`] - Constraint validator (prerequisites, terms, credits)
//! - [`store`] - Plan store mutations and the undo log
//! - [`autosave`] - Debounced autosave controller and its collaborator seams
//! - [`session`] - The root state container wiring it all together
//! - [`export`] - iCalendar export of a plan
//! - [`catalog`] - Built-in sample course catalog and default plan

pub mod autosave;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod export;
pub mod persist;
pub mod session;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use autosave::{AutosaveConfig, AutosaveController, AutosaveHandle, AutosaveStatus, PendingStore, SaveSink, SinkError, PENDING_KEY};
pub use config::Config;
pub use domain::{ConstraintViolation, Course, CourseStatus, CourseType, Major, OnboardingData, Plan, PlannedCourse, Semester, Severity, StudentProfile, Term};
pub use session::{MutationOutcome, PlannerSession};
pub use store::{PlanStore, UndoEntry, UndoLog};
pub use validation::{validate, ValidationResult};
