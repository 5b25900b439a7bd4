//! Placement rules
//!
//! Rules run in a fixed presentation order: duplicate, prerequisites, term
//! offering, credit cap. Only `error`-severity findings affect the permit
//! decision; warnings are surfaced for the caller to weigh.

use tracing::debug;

use crate::domain::{ConstraintViolation, PlannedCourse, Semester};

/// Outcome of validating a proposed placement
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// True iff no error-severity violation is present
    pub permitted: bool,
    /// All findings, in rule order
    pub violations: Vec<ConstraintViolation>,
}

impl ValidationResult {
    /// Findings that block the mutation
    pub fn errors(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter().filter(|v| v.is_blocking())
    }

    /// Findings that inform but never block
    pub fn warnings(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter().filter(|v| !v.is_blocking())
    }
}

/// Validate placing `course` into `target`, given the whole plan
pub fn validate(course: &PlannedCourse, target: &Semester, all: &[Semester]) -> ValidationResult {
    debug!(course = %course.course.code, target = %target.id, "validate: called");
    let mut violations = Vec::new();

    if let Some(v) = check_duplicate(course, target) {
        violations.push(v);
    }
    if let Some(v) = check_prerequisites(course, target, all) {
        violations.push(v);
    }
    if let Some(v) = check_offering_term(course, target) {
        violations.push(v);
    }
    if let Some(v) = check_credit_limit(course, target) {
        violations.push(v);
    }

    let permitted = !violations.iter().any(|v| v.is_blocking());
    debug!(
        course = %course.course.code,
        permitted,
        violation_count = violations.len(),
        "validate: decided"
    );

    ValidationResult { permitted, violations }
}

/// A course id may appear at most once per semester
fn check_duplicate(course: &PlannedCourse, target: &Semester) -> Option<ConstraintViolation> {
    if target.contains(&course.course.id) {
        debug!(course = %course.course.code, "check_duplicate: already placed");
        return Some(ConstraintViolation::error(
            &course.course.id,
            format!("{} is already in this semester", course.course.code),
        ));
    }
    None
}

/// Every prerequisite code must appear among courses placed in semesters
/// chronologically before the target
///
/// "Before" is keyed off (year, term rank), falling back to array position
/// between semesters with an equal key. A prerequisite placed in the same
/// semester never satisfies the check, and completion status is ignored: a
/// planned-but-not-yet-taken prerequisite counts.
fn check_prerequisites(course: &PlannedCourse, target: &Semester, all: &[Semester]) -> Option<ConstraintViolation> {
    if course.course.prerequisites.is_empty() {
        return None;
    }

    let target_ix = all.iter().position(|s| s.id == target.id);
    let prior_codes: Vec<&str> = all
        .iter()
        .enumerate()
        .filter(|(ix, s)| is_strictly_before(s, *ix, target, target_ix))
        .flat_map(|(_, s)| s.courses.iter().map(|c| c.course.code.as_str()))
        .collect();

    let missing: Vec<&str> = course
        .course
        .prerequisites
        .iter()
        .map(String::as_str)
        .filter(|p| !prior_codes.contains(p))
        .collect();

    if missing.is_empty() {
        return None;
    }

    debug!(course = %course.course.code, ?missing, "check_prerequisites: missing");
    let joined = missing.join(", ");
    Some(
        ConstraintViolation::error(&course.course.id, format!("Missing prerequisites: {}", joined))
            .with_suggestion(format!("Complete {} in an earlier semester", joined)),
    )
}

/// Chronological "strictly before", with array order as the tie-breaker
fn is_strictly_before(semester: &Semester, ix: usize, target: &Semester, target_ix: Option<usize>) -> bool {
    if semester.id == target.id {
        return false;
    }
    match semester.chron_key().cmp(&target.chron_key()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => target_ix.is_some_and(|t| ix < t),
        std::cmp::Ordering::Greater => false,
    }
}

/// Placing a course outside its typical terms is allowed but flagged
fn check_offering_term(course: &PlannedCourse, target: &Semester) -> Option<ConstraintViolation> {
    if course.course.offered_terms.contains(&target.term) {
        return None;
    }

    debug!(course = %course.course.code, term = %target.term, "check_offering_term: off-term");
    let terms = course
        .course
        .offered_terms
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join("/");

    let mut v = ConstraintViolation::warning(
        &course.course.id,
        format!("{} is typically offered in {} only", course.course.code, terms),
    );
    if let Some(first) = course.course.offered_terms.first() {
        v = v.with_suggestion(format!("Move to a {} semester", first));
    }
    Some(v)
}

/// Exceeding the semester credit cap is allowed but flagged
fn check_credit_limit(course: &PlannedCourse, target: &Semester) -> Option<ConstraintViolation> {
    let projected = target.planned_credits() + course.course.credits;
    if projected <= target.max_credits {
        return None;
    }

    debug!(course = %course.course.code, projected, cap = target.max_credits, "check_credit_limit: over cap");
    Some(
        ConstraintViolation::warning(
            &course.course.id,
            format!(
                "Adding {} would exceed credit limit ({}/{})",
                course.course.code, projected, target.max_credits
            ),
        )
        .with_suggestion("Consider reducing course load or moving another course"),
    )
}
