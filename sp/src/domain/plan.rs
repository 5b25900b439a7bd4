//! Plan, profile, and onboarding types
//!
//! The Plan is the unit of persistence: the autosave pipeline serializes the
//! whole plan, never a diff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::semester::Semester;

/// The full multi-semester course arrangement for one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Owning major
    pub major_id: String,

    /// Ordered sequence of semesters
    pub semesters: Vec<Semester>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Whether this is the student's active plan
    pub is_active: bool,
}

impl Plan {
    /// Create a new plan from generated semesters
    pub fn new(name: impl Into<String>, major_id: impl Into<String>, semesters: Vec<Semester>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            major_id: major_id.into(),
            semesters,
            created_at: now,
            updated_at: now,
            is_active: true,
        }
    }

    /// An empty, inactive plan - the pre-onboarding state
    pub fn empty() -> Self {
        let mut plan = Self::new("Unnamed Plan", "", Vec::new());
        plan.is_active = false;
        plan
    }
}

/// Degree program metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Major {
    pub id: String,
    pub name: String,
    pub catalog_year: String,
    pub required_credits: u32,
    pub core_credits: u32,
    pub elective_credits: u32,
}

/// The student owning a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub major_id: String,
    pub catalog_year: String,
    pub admitted_year: i32,
    pub target_graduation: String,
    pub current_gpa: f64,
    pub total_credits: u32,
    pub earned_credits: u32,
}

/// Input collected during onboarding, used to seed the default plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingData {
    pub major_id: String,
    pub catalog_year: String,
    pub admitted_year: i32,
    pub target_graduation: String,
    #[serde(default)]
    pub completed_courses: Vec<String>,
    #[serde(default)]
    pub existing_gpa: Option<f64>,
}
