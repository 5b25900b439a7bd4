//! PlanStore - owns the canonical plan and applies mutations
//!
//! All operations are synchronous and atomic with respect to the in-memory
//! model: no operation observes a partially-applied mutation. Unknown ids
//! produce no-ops, never faults. The store does not validate; callers run
//! the validator first and decide whether to proceed (so a caller can show
//! warnings yet still commit).

use chrono::Utc;
use tracing::debug;

use crate::domain::{Plan, PlannedCourse, Semester};

/// Owner of the canonical semester collection
pub struct PlanStore {
    plan: Plan,
    revision: u64,
}

impl PlanStore {
    /// Wrap a plan for mutation
    pub fn new(plan: Plan) -> Self {
        debug!(plan_id = %plan.id, semester_count = plan.semesters.len(), "PlanStore::new: called");
        Self { plan, revision: 0 }
    }

    /// The current plan state
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The semesters, in plan order
    pub fn semesters(&self) -> &[Semester] {
        &self.plan.semesters
    }

    /// Monotonic counter bumped on every applied mutation
    ///
    /// Observers (the autosave controller) compare revisions to detect
    /// change without diffing plan contents.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a semester by id
    pub fn semester(&self, semester_id: &str) -> Option<&Semester> {
        self.plan.semesters.iter().find(|s| s.id == semester_id)
    }

    /// Move a course between semesters as a single atomic detach+attach
    ///
    /// No-op returning false if either semester is unknown or the course is
    /// not in the source. Does not consult the validator.
    pub fn move_course(&mut self, course_id: &str, from_id: &str, to_id: &str) -> bool {
        debug!(%course_id, %from_id, %to_id, "PlanStore::move_course: called");

        // Verify the target exists before detaching, so a failed move never
        // drops the course
        if !self.plan.semesters.iter().any(|s| s.id == to_id) {
            debug!(%to_id, "PlanStore::move_course: unknown target, no-op");
            return false;
        }

        let Some(course) = self.detach(course_id, from_id) else {
            debug!(%course_id, %from_id, "PlanStore::move_course: not in source, no-op");
            return false;
        };

        self.attach(course, to_id);
        self.touch();
        debug!(%course_id, %to_id, "PlanStore::move_course: applied");
        true
    }

    /// Remove a course from a semester; removing an absent course is a no-op
    pub fn remove_course(&mut self, course_id: &str, semester_id: &str) -> bool {
        debug!(%course_id, %semester_id, "PlanStore::remove_course: called");
        if self.detach(course_id, semester_id).is_some() {
            self.touch();
            debug!(%course_id, "PlanStore::remove_course: removed");
            true
        } else {
            debug!(%course_id, "PlanStore::remove_course: absent, no-op");
            false
        }
    }

    /// Append a course to a semester unless the same id is already there
    /// (duplicates are silently ignored, not a fault)
    pub fn add_course(&mut self, course: PlannedCourse, semester_id: &str) -> bool {
        debug!(course_id = %course.course.id, %semester_id, "PlanStore::add_course: called");
        let Some(target) = self.plan.semesters.iter().find(|s| s.id == semester_id) else {
            debug!(%semester_id, "PlanStore::add_course: unknown semester, no-op");
            return false;
        };
        if target.contains(&course.course.id) {
            debug!(course_id = %course.course.id, "PlanStore::add_course: duplicate, ignored");
            return false;
        }

        self.attach(course, semester_id);
        self.touch();
        true
    }

    /// Mark a course completed with a letter grade, wherever it is placed
    pub fn mark_completed(&mut self, course_id: &str, grade: &str) -> bool {
        debug!(%course_id, %grade, "PlanStore::mark_completed: called");
        for semester in &mut self.plan.semesters {
            if let Some(course) = semester.courses.iter_mut().find(|c| c.course.id == course_id) {
                course.complete(grade);
                self.touch();
                debug!(%course_id, "PlanStore::mark_completed: applied");
                return true;
            }
        }
        debug!(%course_id, "PlanStore::mark_completed: not found, no-op");
        false
    }

    /// Sum of credits over completed courses, recomputed on every read
    pub fn earned_credits(&self) -> u32 {
        self.completed().map(|c| c.course.credits).sum()
    }

    /// Credit-weighted mean of grade points over completed courses
    ///
    /// Defined as 0.0 when no course is completed.
    pub fn gpa(&self) -> f64 {
        let (points, credits) = self.completed().fold((0.0_f64, 0u32), |(p, cr), c| {
            (p + c.grade_points.unwrap_or(0.0) * c.course.credits as f64, cr + c.course.credits)
        });
        if credits == 0 { 0.0 } else { points / credits as f64 }
    }

    /// Total placed courses across all semesters
    pub fn total_courses(&self) -> usize {
        self.plan.semesters.iter().map(|s| s.courses.len()).sum()
    }

    /// Deep copy of the semester sequence, for undo snapshots
    pub fn snapshot(&self) -> Vec<Semester> {
        self.plan.semesters.clone()
    }

    /// Replace the semester sequence wholesale (undo restore)
    pub fn restore(&mut self, semesters: Vec<Semester>) {
        debug!(semester_count = semesters.len(), "PlanStore::restore: called");
        self.plan.semesters = semesters;
        self.touch();
    }

    /// Replace the whole plan (regenerate/reset)
    pub fn replace_plan(&mut self, plan: Plan) {
        debug!(plan_id = %plan.id, "PlanStore::replace_plan: called");
        self.plan = plan;
        self.revision += 1;
    }

    fn completed(&self) -> impl Iterator<Item = &PlannedCourse> {
        self.plan
            .semesters
            .iter()
            .flat_map(|s| s.courses.iter())
            .filter(|c| c.is_completed())
    }

    /// Lone removal primitive: pull a course out of a semester
    fn detach(&mut self, course_id: &str, semester_id: &str) -> Option<PlannedCourse> {
        let semester = self.plan.semesters.iter_mut().find(|s| s.id == semester_id)?;
        let ix = semester.courses.iter().position(|c| c.course.id == course_id)?;
        Some(semester.courses.remove(ix))
    }

    /// Lone insertion primitive: append a course and fix its back-reference
    ///
    /// Every placement path funnels through here so `semester_id` can never
    /// drift from the collection holding the course.
    fn attach(&mut self, mut course: PlannedCourse, semester_id: &str) {
        course.semester_id = semester_id.to_string();
        if let Some(semester) = self.plan.semesters.iter_mut().find(|s| s.id == semester_id) {
            semester.courses.push(course);
        }
    }

    fn touch(&mut self) {
        self.plan.updated_at = Utc::now();
        self.revision += 1;
    }
}
