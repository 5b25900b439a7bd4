//! PlannerSession - the root state container
//!
//! The session owns the plan store, the undo log, and the autosave handle,
//! and funnels every mutation through one place: a caller proposes a
//! mutation, the session consults the validator, and on acceptance records
//! a pre-mutation snapshot, applies the change atomically, and notifies the
//! autosave controller. Consumers hold a reference to the session; there is
//! no ambient global state.

use tracing::{debug, warn};

use crate::autosave::AutosaveHandle;
use crate::catalog;
use crate::domain::{Course, OnboardingData, Plan, PlannedCourse, StudentProfile};
use crate::store::{PlanStore, UndoLog};
use crate::validation::{validate, ValidationResult};

/// Result of a proposed mutation: whether it was applied, plus all findings
#[derive(Debug)]
pub struct MutationOutcome {
    pub applied: bool,
    pub validation: ValidationResult,
}

/// Root owner of planner state for one student session
pub struct PlannerSession {
    store: PlanStore,
    undo: UndoLog,
    autosave: Option<AutosaveHandle>,
    profile: Option<StudentProfile>,
    onboarded: bool,
    max_credits: u32,
}

impl PlannerSession {
    /// Create a session with an empty, pre-onboarding plan
    pub fn new(undo_capacity: usize) -> Self {
        Self {
            store: PlanStore::new(Plan::empty()),
            undo: UndoLog::new(undo_capacity),
            autosave: None,
            profile: None,
            onboarded: false,
            max_credits: 18,
        }
    }

    /// Resume a session from a previously persisted plan
    pub fn from_plan(plan: Plan, undo_capacity: usize) -> Self {
        let onboarded = plan.is_active;
        Self {
            store: PlanStore::new(plan),
            undo: UndoLog::new(undo_capacity),
            autosave: None,
            profile: None,
            onboarded,
            max_credits: 18,
        }
    }

    /// Attach an autosave controller; subsequent mutations notify it
    pub fn with_autosave(mut self, handle: AutosaveHandle) -> Self {
        self.autosave = Some(handle);
        self
    }

    /// Override the per-semester credit cap used for generated plans
    pub fn with_max_credits(mut self, max_credits: u32) -> Self {
        self.max_credits = max_credits;
        self
    }

    /// The canonical plan state
    pub fn plan(&self) -> &Plan {
        self.store.plan()
    }

    /// Read access to the plan store's derived values
    pub fn store(&self) -> &PlanStore {
        &self.store
    }

    /// The student profile, once onboarded
    pub fn profile(&self) -> Option<&StudentProfile> {
        self.profile.as_ref()
    }

    /// Whether onboarding has completed
    pub fn is_onboarded(&self) -> bool {
        self.onboarded
    }

    /// Undo entries currently retained
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Build the student profile and the default plan from the catalog
    pub fn complete_onboarding(&mut self, data: OnboardingData) -> &Plan {
        debug!(major_id = %data.major_id, admitted_year = data.admitted_year, "complete_onboarding: called");
        let major = catalog::cs_major();

        self.profile = Some(StudentProfile {
            id: "student-1".to_string(),
            name: "Student".to_string(),
            email: "student@university.edu".to_string(),
            major_id: data.major_id.clone(),
            catalog_year: data.catalog_year.clone(),
            admitted_year: data.admitted_year,
            target_graduation: data.target_graduation.clone(),
            current_gpa: data.existing_gpa.unwrap_or(0.0),
            total_credits: major.required_credits,
            earned_credits: 0,
        });

        let semesters = catalog::generate_default_plan(data.admitted_year, self.max_credits);
        let plan = Plan::new("My 4-Year Plan", data.major_id, semesters);
        self.store.replace_plan(plan);
        self.undo.clear();
        self.onboarded = true;
        self.notify_autosave();
        self.store.plan()
    }

    /// Validate a move without applying it
    pub fn check_move(&self, course_id: &str, from_id: &str, to_id: &str) -> Option<ValidationResult> {
        let course = self.store.semester(from_id)?.find(course_id)?.clone();
        let target = self.store.semester(to_id)?;
        Some(validate(&course, target, self.store.semesters()))
    }

    /// Propose moving a course; applies only when no blocking violation
    ///
    /// Warnings are returned alongside `applied: true` - the engine never
    /// rejects on warnings, the caller may.
    pub fn propose_move(&mut self, course_id: &str, from_id: &str, to_id: &str) -> MutationOutcome {
        debug!(%course_id, %from_id, %to_id, "propose_move: called");
        let Some(validation) = self.check_move(course_id, from_id, to_id) else {
            // Unknown ids: the store would no-op, report an unapplied
            // mutation with no findings
            debug!("propose_move: unknown course or semester");
            return MutationOutcome {
                applied: false,
                validation: ValidationResult {
                    permitted: false,
                    violations: Vec::new(),
                },
            };
        };

        if !validation.permitted {
            debug!(%course_id, "propose_move: rejected by validator");
            return MutationOutcome {
                applied: false,
                validation,
            };
        }

        let code = self
            .store
            .semester(from_id)
            .and_then(|s| s.find(course_id))
            .map(|c| c.course.code.clone())
            .unwrap_or_else(|| course_id.to_string());
        let target_label = self
            .store
            .semester(to_id)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| to_id.to_string());

        self.undo.record(format!("Move {} to {}", code, target_label), self.store.snapshot());
        let applied = self.store.move_course(course_id, from_id, to_id);
        if applied {
            self.notify_autosave();
        } else {
            // Store no-oped after validation passed; drop the stale snapshot
            let _ = self.undo.pop();
        }

        MutationOutcome { applied, validation }
    }

    /// Propose placing a catalog course into a semester
    pub fn propose_add(&mut self, course: Course, semester_id: &str) -> MutationOutcome {
        debug!(course_id = %course.id, %semester_id, "propose_add: called");
        let Some(target) = self.store.semester(semester_id) else {
            debug!(%semester_id, "propose_add: unknown semester");
            return MutationOutcome {
                applied: false,
                validation: ValidationResult {
                    permitted: false,
                    violations: Vec::new(),
                },
            };
        };

        let placed = PlannedCourse::place(course, semester_id);
        let validation = validate(&placed, target, self.store.semesters());
        if !validation.permitted {
            debug!(course_id = %placed.course.id, "propose_add: rejected by validator");
            return MutationOutcome {
                applied: false,
                validation,
            };
        }

        let label = target.label.clone();
        self.undo
            .record(format!("Add {} to {}", placed.course.code, label), self.store.snapshot());
        let applied = self.store.add_course(placed, semester_id);
        if applied {
            self.notify_autosave();
        } else {
            let _ = self.undo.pop();
        }

        MutationOutcome { applied, validation }
    }

    /// Remove a course from a semester; absent course is a no-op
    pub fn remove_course(&mut self, course_id: &str, semester_id: &str) -> bool {
        debug!(%course_id, %semester_id, "remove_course: called");
        let Some(code) = self
            .store
            .semester(semester_id)
            .and_then(|s| s.find(course_id))
            .map(|c| c.course.code.clone())
        else {
            return false;
        };

        self.undo.record(format!("Remove {}", code), self.store.snapshot());
        let removed = self.store.remove_course(course_id, semester_id);
        if removed {
            self.notify_autosave();
        }
        removed
    }

    /// Mark a course completed with a letter grade
    pub fn mark_completed(&mut self, course_id: &str, grade: &str) -> bool {
        debug!(%course_id, %grade, "mark_completed: called");
        let found = self
            .store
            .semesters()
            .iter()
            .flat_map(|s| s.courses.iter())
            .any(|c| c.course.id == course_id);
        if !found {
            return false;
        }

        self.undo.record(format!("Complete {} ({})", course_id, grade), self.store.snapshot());
        let applied = self.store.mark_completed(course_id, grade);
        if applied {
            self.notify_autosave();
        }
        applied
    }

    /// Restore the most recent snapshot; returns its description
    pub fn undo(&mut self) -> Option<String> {
        let entry = self.undo.pop()?;
        debug!(description = %entry.description, "undo: restoring");
        self.store.restore(entry.semesters);
        self.notify_autosave();
        Some(entry.description)
    }

    /// Replace the plan wholesale with a freshly generated one
    pub fn regenerate_plan(&mut self) {
        let admitted_year = self
            .profile
            .as_ref()
            .map(|p| p.admitted_year)
            .unwrap_or_else(|| chrono::Utc::now().format("%Y").to_string().parse().unwrap_or(2024));
        debug!(admitted_year, "regenerate_plan: called");

        self.undo.record("Regenerate plan", self.store.snapshot());
        let major_id = self.store.plan().major_id.clone();
        let semesters = catalog::generate_default_plan(admitted_year, self.max_credits);
        self.store.replace_plan(Plan::new("My 4-Year Plan", major_id, semesters));
        self.notify_autosave();
    }

    /// Clear everything back to the pre-onboarding state
    pub fn reset_plan(&mut self) {
        debug!("reset_plan: called");
        self.store.replace_plan(Plan::empty());
        self.undo.clear();
        self.profile = None;
        self.onboarded = false;
        self.notify_autosave();
    }

    /// Force an immediate save, bypassing the debounce window
    pub async fn flush(&self) -> Option<crate::autosave::AutosaveStatus> {
        match &self.autosave {
            Some(handle) => Some(handle.force_save().await),
            None => None,
        }
    }

    fn notify_autosave(&self) {
        let Some(handle) = &self.autosave else { return };
        match serde_json::to_string(self.store.plan()) {
            Ok(payload) => handle.notify_change(payload),
            Err(e) => warn!(error = %e, "Failed to serialize plan for autosave"),
        }
    }
}
