//! Constraint validation
//!
//! Pure functions deciding whether a course may legally occupy a target
//! semester. Nothing here mutates state; the plan store applies mutations
//! only after the caller has consulted [`validate`].

mod rules;

pub use rules::{validate, ValidationResult};
