//! Semester domain type

use serde::{Deserialize, Serialize};

use super::course::{PlannedCourse, Term};

/// One planning period with a credit cap and an insertion-ordered course list
///
/// A course appears in at most one semester at any time; the plan store's
/// move operation is a single atomic detach+attach, never two independent
/// calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    /// Unique identifier (e.g., "fall-2024")
    pub id: String,

    /// Term type
    #[serde(rename = "type")]
    pub term: Term,

    /// Calendar year the term falls in
    pub year: i32,

    /// Display label (e.g., "Fall Y1")
    pub label: String,

    /// Maximum credits before the cap warning fires
    pub max_credits: u32,

    /// Courses placed in this semester, in insertion order
    #[serde(default)]
    pub courses: Vec<PlannedCourse>,
}

impl Semester {
    /// Create an empty semester
    pub fn new(term: Term, year: i32, label: impl Into<String>, max_credits: u32) -> Self {
        Self {
            id: format!("{}-{}", term, year),
            term,
            year,
            label: label.into(),
            max_credits,
            courses: Vec::new(),
        }
    }

    /// Total credits currently placed, regardless of status
    pub fn planned_credits(&self) -> u32 {
        self.courses.iter().map(|c| c.course.credits).sum()
    }

    /// Whether a course with this id is placed here
    pub fn contains(&self, course_id: &str) -> bool {
        self.courses.iter().any(|c| c.course.id == course_id)
    }

    /// Look up a placed course by id
    pub fn find(&self, course_id: &str) -> Option<&PlannedCourse> {
        self.courses.iter().find(|c| c.course.id == course_id)
    }

    /// Chronological key: calendar year first, then term rank within it
    pub fn chron_key(&self) -> (i32, Term) {
        (self.year, self.term)
    }
}
