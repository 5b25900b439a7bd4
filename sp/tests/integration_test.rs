//! Integration tests for SemPlan
//!
//! These tests verify end-to-end behavior across the session, validator,
//! undo log, and autosave pipeline using the real file-backed adapters.

use std::sync::Arc;
use std::time::Duration;

use semplan::persist::{load_plan, FilePendingStore, FilePlanSink, PLAN_FILE};
use semplan::{catalog, AutosaveConfig, AutosaveController, AutosaveStatus, OnboardingData, Plan, PlannerSession};
use tempfile::TempDir;

fn onboarding() -> OnboardingData {
    OnboardingData {
        major_id: "cs".to_string(),
        catalog_year: "2024-2025".to_string(),
        admitted_year: 2024,
        target_graduation: "Spring 2028".to_string(),
        completed_courses: Vec::new(),
        existing_gpa: None,
    }
}

fn fast_autosave() -> AutosaveConfig {
    AutosaveConfig {
        debounce_ms: 50,
        saved_display_ms: 50,
    }
}

// =============================================================================
// Session + Validator Tests
// =============================================================================

#[test]
fn test_default_plan_validates_end_to_end() {
    let mut session = PlannerSession::new(10);
    session.complete_onboarding(onboarding());

    assert_eq!(session.plan().semesters.len(), 8);
    assert_eq!(session.store().total_courses(), 20);

    // A chain of legal mutations
    let outcome = session.propose_move("comm-101", "spring-2025", "fall-2024");
    assert!(outcome.applied, "general course with no prereqs should move freely");

    // Moving a dependent before its prerequisite is rejected
    let outcome = session.propose_move("cs-202", "spring-2026", "fall-2024");
    assert!(!outcome.applied);
    let error = outcome.validation.errors().next().expect("missing-prereq error");
    assert!(error.message.contains("Missing prerequisites"));
}

#[test]
fn test_full_undo_chain_restores_original_layout() {
    let mut session = PlannerSession::new(10);
    session.complete_onboarding(onboarding());
    let original = session.plan().semesters.clone();

    session.propose_move("eng-101", "fall-2024", "spring-2025");
    session.propose_move("comm-101", "spring-2025", "fall-2024");
    session.remove_course("cs-390", "fall-2027");
    assert_eq!(session.undo_depth(), 3);

    while session.undo().is_some() {}

    assert_eq!(session.plan().semesters, original);
}

#[test]
fn test_undo_capacity_evicts_oldest() {
    let mut session = PlannerSession::new(2);
    session.complete_onboarding(onboarding());

    session.propose_move("eng-101", "fall-2024", "spring-2025");
    session.propose_move("eng-101", "spring-2025", "fall-2025");
    session.propose_move("eng-101", "fall-2025", "spring-2026");

    // Capacity 2: only the two newest snapshots survive
    assert_eq!(session.undo_depth(), 2);
    session.undo();
    session.undo();
    assert!(session.undo().is_none());

    // The oldest snapshot was evicted, so undo stops at the state after
    // the first move
    assert!(session.store().semester("spring-2025").unwrap().contains("eng-101"));
}

#[test]
fn test_grades_roll_up_into_gpa() {
    let mut session = PlannerSession::new(10);
    session.complete_onboarding(onboarding());

    // A in CS-101 (3 cr) and B+ in MATH-101 (4 cr)
    session.mark_completed("cs-101", "A");
    session.mark_completed("math-101", "B+");

    let expected = (4.0 * 3.0 + 3.3 * 4.0) / 7.0;
    assert!((session.store().gpa() - expected).abs() < 1e-9);
    assert_eq!(session.store().earned_credits(), 7);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[tokio::test]
async fn test_mutations_autosave_to_disk() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let sink = Arc::new(FilePlanSink::new(dir.path()));
    let pending = Arc::new(FilePendingStore::open(dir.path()).unwrap());
    let handle = AutosaveController::spawn(fast_autosave(), sink, pending);

    let mut session = PlannerSession::new(10).with_autosave(handle);
    session.complete_onboarding(onboarding());
    session.propose_move("eng-101", "fall-2024", "spring-2025");

    // Wait out the debounce window
    tokio::time::sleep(Duration::from_millis(200)).await;

    let saved = load_plan(dir.path()).unwrap().expect("plan file written");
    assert!(saved.semesters.iter().any(|s| s.id == "spring-2025" && s.contains("eng-101")));
}

#[tokio::test]
async fn test_session_resumes_from_saved_plan() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    {
        let sink = Arc::new(FilePlanSink::new(dir.path()));
        let pending = Arc::new(FilePendingStore::open(dir.path()).unwrap());
        let handle = AutosaveController::spawn(fast_autosave(), sink, pending);

        let mut session = PlannerSession::new(10).with_autosave(handle);
        session.complete_onboarding(onboarding());
        session.mark_completed("cs-101", "A");
        let status = session.flush().await;
        assert_eq!(status, Some(AutosaveStatus::Saved));
    }

    // A fresh session picks up the persisted state, onboarded and graded
    let plan = load_plan(dir.path()).unwrap().expect("plan persisted");
    let session = PlannerSession::from_plan(plan, 10);
    assert!(session.is_onboarded());
    assert!((session.store().gpa() - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_offline_edit_replays_after_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let payload;

    {
        let sink = Arc::new(FilePlanSink::new(dir.path()));
        let pending = Arc::new(FilePendingStore::open(dir.path()).unwrap());
        let handle = AutosaveController::spawn(fast_autosave(), sink, pending);

        handle.set_online(false);
        let mut session = PlannerSession::new(10).with_autosave(handle.clone());
        session.complete_onboarding(onboarding());
        payload = serde_json::to_string(session.plan()).unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(handle.status(), AutosaveStatus::Offline);
        assert!(!dir.path().join(PLAN_FILE).exists());
        handle.shutdown();
    }

    // Second controller recovers the queued payload and writes it out
    {
        let sink = Arc::new(FilePlanSink::new(dir.path()));
        let pending = Arc::new(FilePendingStore::open(dir.path()).unwrap());
        let handle = AutosaveController::spawn(fast_autosave(), sink, pending);

        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown();
    }

    let saved: Plan = serde_json::from_str(&payload).unwrap();
    let loaded = load_plan(dir.path()).unwrap().expect("recovered plan on disk");
    assert_eq!(loaded.id, saved.id);
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_default_plan_exports_every_course() {
    let mut session = PlannerSession::new(10);
    session.complete_onboarding(onboarding());

    let ics = semplan::export::export_plan(session.store().semesters(), &[], &[]);

    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 20);
    for course in catalog::course_catalog() {
        let placed = session
            .store()
            .semesters()
            .iter()
            .any(|s| s.contains(&course.id));
        if placed {
            assert!(ics.contains(&format!("{} - {}", course.code, course.title)));
        }
    }
}

#[test]
fn test_registered_sections_export_recurring_events() {
    let mut session = PlannerSession::new(10);
    session.complete_onboarding(onboarding());

    let sections = catalog::sample_sections();
    let ics = semplan::export::export_plan(session.store().semesters(), &sections, &[]);

    // CS-201 sits in fall-2025, whose window opens Tue Aug 26; the first MWF
    // meeting of section 001 is the following Monday
    assert!(ics.contains("DTSTART:20250901T090000"));
    assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;UNTIL=20251213T235959Z"));
    assert!(ics.contains("Professor: Dr. Sarah Chen"));

    // Courses without a registered section keep the all-day fallback
    assert!(ics.contains("DTSTART;VALUE=DATE:20240826"));
}
