//! Calendar export

mod ics;

pub use ics::{export_plan, CourseSection, IcsEvent};
