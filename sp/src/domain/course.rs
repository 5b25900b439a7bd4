//! Course catalog and placement types

use serde::{Deserialize, Serialize};

/// Academic term
///
/// Variant order is chronological within a calendar year (winter
/// intersession in January first), so the derived `Ord` gives the term rank
/// used by prerequisite ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "winter"),
            Self::Spring => write!(f, "spring"),
            Self::Summer => write!(f, "summer"),
            Self::Fall => write!(f, "fall"),
        }
    }
}

impl std::str::FromStr for Term {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            _ => Err(format!("Unknown term: {}. Use: fall, spring, summer, or winter", s)),
        }
    }
}

/// Planning status of a placed course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Failed,
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Degree-requirement category of a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    #[default]
    Core,
    Elective,
    General,
}

/// A catalog course - immutable fact, never mutated by planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier (e.g., "cs-101")
    pub id: String,

    /// Display code (e.g., "CS-101")
    pub code: String,

    /// Course title
    pub title: String,

    /// Credit weight (positive)
    pub credits: u32,

    /// Catalog description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Prerequisite course codes
    #[serde(default)]
    pub prerequisites: Vec<String>,

    /// Compound prerequisite expression (informational only, not evaluated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prereq_expression: Option<String>,

    /// Terms the course is typically offered in
    pub offered_terms: Vec<Term>,

    /// Requirement category
    #[serde(rename = "type", default)]
    pub course_type: CourseType,

    /// Requirement bucket label (e.g., "Core", "Math")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_bucket: Option<String>,
}

/// Grade-point value for a letter grade
///
/// Unrecognized grade strings map to 0.0 rather than failing.
pub fn grade_points(grade: &str) -> f64 {
    match grade {
        "A+" | "A" => 4.0,
        "A-" => 3.7,
        "B+" => 3.3,
        "B" => 3.0,
        "B-" => 2.7,
        "C+" => 2.3,
        "C" => 2.0,
        "C-" => 1.7,
        "D+" => 1.3,
        "D" => 1.0,
        "D-" => 0.7,
        _ => 0.0,
    }
}

/// A course placed into a semester: catalog fact plus planning state
///
/// The `semester_id` back-reference must always match the semester whose
/// course collection contains it; all mutation paths keep the two in
/// lock-step via the plan store's relocate primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCourse {
    #[serde(flatten)]
    pub course: Course,

    /// Planning status
    #[serde(default)]
    pub status: CourseStatus,

    /// Letter grade, present iff completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,

    /// Grade-point value derived from the letter grade
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_points: Option<f64>,

    /// Identifier of the semester currently holding this course
    pub semester_id: String,
}

impl PlannedCourse {
    /// Place a catalog course into a semester (copy-on-place)
    pub fn place(course: Course, semester_id: impl Into<String>) -> Self {
        Self {
            course,
            status: CourseStatus::Planned,
            grade: None,
            grade_points: None,
            semester_id: semester_id.into(),
        }
    }

    /// Mark this course completed with a letter grade
    pub fn complete(&mut self, grade: &str) {
        self.status = CourseStatus::Completed;
        self.grade = Some(grade.to_string());
        self.grade_points = Some(grade_points(grade));
    }

    /// Whether the course has been completed
    pub fn is_completed(&self) -> bool {
        self.status == CourseStatus::Completed
    }
}
