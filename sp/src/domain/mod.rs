//! Domain types for the semester planner
//!
//! Catalog facts ([`Course`]) are immutable once loaded; planning state
//! ([`PlannedCourse`]) is created copy-on-place and lives inside exactly one
//! [`Semester`] at a time. The [`Plan`] is the unit of persistence.

mod course;
mod plan;
mod semester;
mod violation;

pub use course::{grade_points, Course, CourseStatus, CourseType, PlannedCourse, Term};
pub use plan::{Major, OnboardingData, Plan, StudentProfile};
pub use semester::Semester;
pub use violation::{ConstraintViolation, Severity};
